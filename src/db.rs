//! Database connection and schema bootstrap.

use crate::app_config::DatabaseConfig;
use crate::orm::{board_moderators, boards, moderators, posts, reports, threads};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};

/// Opens a connection pool for the configured database.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.to_owned());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(options).await?;
    log::info!("Connected to {:?} database", db.get_database_backend());

    if config.create_schema {
        create_schema(&db).await?;
    }

    Ok(db)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

/// Creates any missing tables. Parents are created before the tables
/// holding foreign keys to them.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, boards::Entity).await?;
    create_table(db, &schema, threads::Entity).await?;
    create_table(db, &schema, posts::Entity).await?;
    create_table(db, &schema, moderators::Entity).await?;
    create_table(db, &schema, board_moderators::Entity).await?;
    create_table(db, &schema, reports::Entity).await?;

    log::info!("Database schema ready");
    Ok(())
}

//! Test database setup
#![allow(dead_code)]

use boardmod::app_config::DatabaseConfig;
use sea_orm::{DatabaseConnection, DbErr};
use tempfile::TempDir;

/// A schema-initialised SQLite database private to one test.
///
/// The file lives in a temporary directory that is removed on drop, so keep
/// this value alive for as long as the connection is used.
pub struct TestDatabase {
    pub db: DatabaseConnection,
    _dir: TempDir,
}

/// Creates a fresh database with every table in place.
///
/// A single pooled connection serialises transactions, which keeps SQLite
/// from failing concurrent writers with `SQLITE_BUSY`.
pub async fn setup_test_database() -> Result<TestDatabase, DbErr> {
    let dir = tempfile::tempdir().map_err(|e| DbErr::Custom(e.to_string()))?;
    let path = dir.path().join("boardmod.db");

    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 1,
        create_schema: true,
    };
    let db = boardmod::db::connect(&config).await?;

    Ok(TestDatabase { db, _dir: dir })
}

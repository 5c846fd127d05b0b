//! SeaORM Entity for moderators

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "moderators")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string. Never the plaintext.
    pub password: String,
    /// Comma joined role tags, see `crate::role::encode_roles`.
    pub roles: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::board_moderators::Entity")]
    BoardModerators,
}

impl Related<super::board_moderators::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BoardModerators.def()
    }
}

impl Related<super::boards::Entity> for Entity {
    fn to() -> RelationDef {
        super::board_moderators::Relation::Board.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::board_moderators::Relation::Moderator.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! SeaORM Entity for boards

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "boards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::threads::Entity")]
    Threads,
    #[sea_orm(has_many = "super::board_moderators::Entity")]
    BoardModerators,
}

impl Related<super::threads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Threads.def()
    }
}

impl Related<super::moderators::Entity> for Entity {
    fn to() -> RelationDef {
        super::board_moderators::Relation::Moderator.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::board_moderators::Relation::Board.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

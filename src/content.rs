//! Navigation over the board/thread/post read model.
//!
//! Boards, threads and posts are owned by the rest of the board software.
//! Moderation only needs to know which board a post lives on.

use crate::orm::{boards, posts, threads};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, FromQueryResult};

/// A post together with the thread and board that own it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromQueryResult)]
pub struct PostPath {
    pub post_id: i32,
    pub thread_id: i32,
    pub board_id: i32,
}

/// Resolves post -> thread -> board. None when the post does not exist.
pub async fn locate_post<C>(db: &C, post_id: i32) -> Result<Option<PostPath>, DbErr>
where
    C: ConnectionTrait,
{
    posts::Entity::find_by_id(post_id)
        .select_only()
        .column_as(posts::Column::Id, "post_id")
        .column_as(posts::Column::ThreadId, "thread_id")
        .column_as(threads::Column::BoardId, "board_id")
        .join(JoinType::InnerJoin, posts::Relation::Thread.def())
        .into_model::<PostPath>()
        .one(db)
        .await
}

pub async fn find_board_by_name<C>(db: &C, name: &str) -> Result<Option<boards::Model>, DbErr>
where
    C: ConnectionTrait,
{
    boards::Entity::find()
        .filter(boards::Column::Name.eq(name))
        .one(db)
        .await
}

pub async fn create_board<C>(db: &C, name: &str) -> Result<boards::Model, DbErr>
where
    C: ConnectionTrait,
{
    boards::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_thread<C>(db: &C, board_id: i32) -> Result<threads::Model, DbErr>
where
    C: ConnectionTrait,
{
    threads::ActiveModel {
        board_id: Set(board_id),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_post<C>(db: &C, thread_id: i32) -> Result<posts::Model, DbErr>
where
    C: ConnectionTrait,
{
    posts::ActiveModel {
        thread_id: Set(thread_id),
        ..Default::default()
    }
    .insert(db)
    .await
}

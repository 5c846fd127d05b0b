//! Report aggregation and the moderator report queue.

use crate::clock::{Clock, SystemClock};
use crate::content::locate_post;
use crate::error::{Error, Result};
use crate::moderator::Moderator;
use crate::orm::{board_moderators, posts, reports, threads};
use crate::permission;
use crate::role::Role;
use sea_orm::{
    entity::*,
    query::*,
    sea_query::{Expr, OnConflict, Query},
    DatabaseConnection, TransactionTrait,
};
use std::sync::Arc;

pub type Report = reports::Model;

#[derive(Clone)]
pub struct ReportAggregator {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl ReportAggregator {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Records one report of `post_id` and returns the aggregated row.
    ///
    /// The first report inserts a row with count 1; later ones increment the
    /// count and refresh the date. Both happen in a single upsert keyed on the
    /// unique `post_id`, so concurrent reports of one post are all counted.
    pub async fn submit_report(&self, post_id: i32) -> Result<Report> {
        let txn = self.db.begin().await?;

        if locate_post(&txn, post_id).await?.is_none() {
            txn.rollback().await?;
            return Err(Error::InvalidInput("Post not found".to_owned()));
        }

        let report = reports::ActiveModel {
            post_id: Set(post_id),
            count: Set(1),
            date: Set(self.clock.now()),
            ..Default::default()
        };

        reports::Entity::insert(report)
            .on_conflict(
                OnConflict::column(reports::Column::PostId)
                    .value(
                        reports::Column::Count,
                        Expr::col((reports::Entity, reports::Column::Count)).add(1),
                    )
                    .update_column(reports::Column::Date)
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        let aggregated = reports::Entity::find()
            .filter(reports::Column::PostId.eq(post_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                sea_orm::DbErr::RecordNotFound(format!("report for post {}", post_id))
            })?;

        txn.commit().await?;

        log::debug!(
            "Report on post_id {} now counted {} time(s)",
            post_id,
            aggregated.count
        );
        Ok(aggregated)
    }

    /// Reports visible to `moderator`, most recently reported first.
    ///
    /// Admins see every report. Everyone else sees reports whose post sits in
    /// a thread on a board they moderate, as recorded in `board_moderators`.
    pub async fn list_reports(&self, moderator: &Moderator) -> Result<Vec<Report>> {
        let mut query = reports::Entity::find();

        if !permission::has_role(moderator, Role::Admin) {
            let moderated_boards = Query::select()
                .column(board_moderators::Column::BoardId)
                .from(board_moderators::Entity)
                .and_where(Expr::col(board_moderators::Column::ModeratorId).eq(moderator.id))
                .to_owned();

            query = query
                .join(JoinType::InnerJoin, reports::Relation::Post.def())
                .join(JoinType::InnerJoin, posts::Relation::Thread.def())
                .filter(threads::Column::BoardId.in_subquery(moderated_boards));
        }

        let reports = query
            .order_by_desc(reports::Column::Date)
            .order_by_desc(reports::Column::Id)
            .all(&self.db)
            .await?;

        Ok(reports)
    }

    pub async fn find_report(&self, id: i32) -> Result<Option<Report>> {
        Ok(reports::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Clears a report once a moderator has dealt with it.
    ///
    /// Returns false if the report no longer exists. Moderators may only
    /// resolve reports on posts they could delete.
    pub async fn resolve_report(&self, moderator: &Moderator, report_id: i32) -> Result<bool> {
        let txn = self.db.begin().await?;

        let report = match reports::Entity::find_by_id(report_id).one(&txn).await? {
            Some(report) => report,
            None => {
                txn.rollback().await?;
                return Ok(false);
            }
        };

        let allowed = match locate_post(&txn, report.post_id).await? {
            Some(path) => permission::can_delete(moderator, &path),
            None => permission::has_role(moderator, Role::Admin),
        };
        if !allowed {
            txn.rollback().await?;
            return Err(Error::PermissionDenied(
                "Report is outside the moderated boards".to_owned(),
            ));
        }

        reports::Entity::delete_by_id(report.id).exec(&txn).await?;
        txn.commit().await?;

        log::info!(
            "Moderator_id {} resolved report_id {} on post_id {}",
            moderator.id,
            report.id,
            report.post_id
        );
        Ok(true)
    }
}

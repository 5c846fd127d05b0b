//! Integration tests for report aggregation and the moderator report queue

mod common;

use boardmod::content::{create_board, locate_post};
use boardmod::orm::reports;
use boardmod::{ReportAggregator, Role};
use chrono::Duration;
use common::{database::*, fixtures::*};
use sea_orm::{EntityTrait, PaginatorTrait};
use std::sync::Arc;

#[actix_rt::test]
async fn test_repeat_reports_aggregate_into_one_row() {
    let test_db = setup_test_database().await.expect("Failed to set up database");
    let clock = Arc::new(ManualClock::new());
    let aggregator = ReportAggregator::with_clock(test_db.db.clone(), clock.clone());
    let post = create_test_post(&test_db.db, "b").await.unwrap();

    let first = aggregator.submit_report(post.post_id).await.unwrap();
    assert_eq!(first.count, 1);
    assert_eq!(first.post_id, post.post_id);
    let (first_id, first_date) = (first.id, first.date);

    let mut latest = first;
    for _ in 0..4 {
        clock.advance(Duration::minutes(5));
        latest = aggregator.submit_report(post.post_id).await.unwrap();
    }

    assert_eq!(latest.id, first_id);
    assert_eq!(latest.count, 5);
    assert_eq!(latest.date, first_date + Duration::minutes(20));

    let rows = reports::Entity::find().count(&test_db.db).await.unwrap();
    assert_eq!(rows, 1);
}

/// Runs on a single pooled connection. Covers the single-statement upsert
/// between interleaved tasks, not parallel database writers.
#[actix_rt::test]
async fn test_concurrent_reports_are_all_counted() {
    let test_db = setup_test_database().await.unwrap();
    let aggregator = ReportAggregator::new(test_db.db.clone());
    let post = create_test_post(&test_db.db, "b").await.unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let aggregator = aggregator.clone();
            actix_rt::spawn(async move { aggregator.submit_report(post.post_id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let all = reports::Entity::find().all(&test_db.db).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].count, 10);
}

#[actix_rt::test]
async fn test_report_on_missing_post_rejected() {
    let test_db = setup_test_database().await.unwrap();
    let aggregator = ReportAggregator::new(test_db.db.clone());

    let err = aggregator.submit_report(404).await.unwrap_err();
    assert!(err.is_invalid_input());

    let rows = reports::Entity::find().count(&test_db.db).await.unwrap();
    assert_eq!(rows, 0);
}

#[actix_rt::test]
async fn test_locate_post_walks_to_board() {
    let test_db = setup_test_database().await.unwrap();
    let post = create_test_post(&test_db.db, "g").await.unwrap();

    let located = locate_post(&test_db.db, post.post_id).await.unwrap();
    assert_eq!(located, Some(post));
    assert_eq!(locate_post(&test_db.db, post.post_id + 100).await.unwrap(), None);
}

#[actix_rt::test]
async fn test_report_list_scoped_to_moderated_boards() {
    let test_db = setup_test_database().await.unwrap();
    let directory = test_directory(&test_db.db);
    let clock = Arc::new(ManualClock::new());
    let aggregator = ReportAggregator::with_clock(test_db.db.clone(), clock.clone());

    let on_a = create_test_post(&test_db.db, "a").await.unwrap();
    let on_b = create_test_post(&test_db.db, "b").await.unwrap();
    let also_on_a = create_test_post_on(&test_db.db, on_a.board_id).await.unwrap();

    let report_a = aggregator.submit_report(on_a.post_id).await.unwrap();
    clock.advance(Duration::seconds(1));
    let report_b = aggregator.submit_report(on_b.post_id).await.unwrap();
    clock.advance(Duration::seconds(1));
    let report_a2 = aggregator.submit_report(also_on_a.post_id).await.unwrap();

    let mut board_a_mod = create_test_moderator(&directory, "amod", &[Role::Moderator]).await;
    directory.assign_board(&mut board_a_mod, on_a.board_id).await.unwrap();
    let admin = create_test_moderator(&directory, "admin", &[Role::Admin]).await;
    let unassigned = create_test_moderator(&directory, "idle", &[Role::Janitor]).await;

    let visible: Vec<i32> = aggregator
        .list_reports(&board_a_mod)
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(visible, vec![report_a2.id, report_a.id]);

    let visible: Vec<i32> = aggregator
        .list_reports(&admin)
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(visible, vec![report_a2.id, report_b.id, report_a.id]);

    assert!(aggregator.list_reports(&unassigned).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_newer_report_moves_to_front() {
    let test_db = setup_test_database().await.unwrap();
    let directory = test_directory(&test_db.db);
    let clock = Arc::new(ManualClock::new());
    let aggregator = ReportAggregator::with_clock(test_db.db.clone(), clock.clone());
    let admin = create_test_moderator(&directory, "admin", &[Role::Admin]).await;

    let first = create_test_post(&test_db.db, "a").await.unwrap();
    let second = create_test_post_on(&test_db.db, first.board_id).await.unwrap();

    aggregator.submit_report(first.post_id).await.unwrap();
    clock.advance(Duration::seconds(1));
    aggregator.submit_report(second.post_id).await.unwrap();
    clock.advance(Duration::seconds(1));
    aggregator.submit_report(first.post_id).await.unwrap();

    let order: Vec<i32> = aggregator
        .list_reports(&admin)
        .await
        .unwrap()
        .iter()
        .map(|r| r.post_id)
        .collect();
    assert_eq!(order, vec![first.post_id, second.post_id]);
}

#[actix_rt::test]
async fn test_can_delete_matches_report_visibility() {
    let test_db = setup_test_database().await.unwrap();
    let directory = test_directory(&test_db.db);
    let aggregator = ReportAggregator::new(test_db.db.clone());

    let on_a = create_test_post(&test_db.db, "a").await.unwrap();
    let on_b = create_test_post(&test_db.db, "b").await.unwrap();
    let mut moderator = create_test_moderator(&directory, "amod", &[Role::Moderator]).await;
    directory.assign_board(&mut moderator, on_a.board_id).await.unwrap();
    let admin = create_test_moderator(&directory, "admin", &[Role::Admin]).await;

    assert!(directory.can_delete(&moderator, &on_a));
    assert!(!directory.can_delete(&moderator, &on_b));
    assert!(directory.can_delete(&admin, &on_a));
    assert!(directory.can_delete(&admin, &on_b));

    aggregator.submit_report(on_a.post_id).await.unwrap();
    aggregator.submit_report(on_b.post_id).await.unwrap();
    for report in aggregator.list_reports(&moderator).await.unwrap() {
        let path = locate_post(&test_db.db, report.post_id).await.unwrap().unwrap();
        assert!(directory.can_delete(&moderator, &path));
    }
}

#[actix_rt::test]
async fn test_resolve_report() {
    let test_db = setup_test_database().await.unwrap();
    let directory = test_directory(&test_db.db);
    let aggregator = ReportAggregator::new(test_db.db.clone());

    let on_a = create_test_post(&test_db.db, "a").await.unwrap();
    let on_b = create_test_post(&test_db.db, "b").await.unwrap();
    let report_a = aggregator.submit_report(on_a.post_id).await.unwrap();
    let report_b = aggregator.submit_report(on_b.post_id).await.unwrap();

    let mut moderator = create_test_moderator(&directory, "amod", &[Role::Moderator]).await;
    directory.assign_board(&mut moderator, on_a.board_id).await.unwrap();
    let admin = create_test_moderator(&directory, "admin", &[Role::Admin]).await;

    let err = aggregator.resolve_report(&moderator, report_b.id).await.unwrap_err();
    assert!(err.is_permission_denied());
    assert!(aggregator.find_report(report_b.id).await.unwrap().is_some());

    assert!(aggregator.resolve_report(&moderator, report_a.id).await.unwrap());
    assert!(aggregator.find_report(report_a.id).await.unwrap().is_none());
    assert!(!aggregator.resolve_report(&moderator, report_a.id).await.unwrap());

    assert!(aggregator.resolve_report(&admin, report_b.id).await.unwrap());
    assert!(aggregator.list_reports(&admin).await.unwrap().is_empty());

    // A post reported after resolution starts a fresh count.
    let again = aggregator.submit_report(on_a.post_id).await.unwrap();
    assert_eq!(again.count, 1);
}

#[actix_rt::test]
async fn test_report_removed_with_its_board() {
    let test_db = setup_test_database().await.unwrap();
    let aggregator = ReportAggregator::new(test_db.db.clone());
    let board = create_board(&test_db.db, "tmp").await.unwrap();
    let post = create_test_post_on(&test_db.db, board.id).await.unwrap();
    aggregator.submit_report(post.post_id).await.unwrap();

    boardmod::orm::boards::Entity::delete_by_id(board.id)
        .exec(&test_db.db)
        .await
        .unwrap();

    let rows = reports::Entity::find().count(&test_db.db).await.unwrap();
    assert_eq!(rows, 0);
}

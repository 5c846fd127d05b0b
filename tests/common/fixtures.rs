//! Test fixtures for creating test data
#![allow(dead_code)]

use boardmod::app_config::HashingConfig;
use boardmod::clock::Clock;
use boardmod::content::{create_board, create_post, create_thread, PostPath};
use boardmod::password::CredentialHasher;
use boardmod::{Moderator, ModeratorDirectory, Role};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Mutex;

pub const TEST_PASSWORD: &str = "hunter22";

/// Argon2 parameters at their minimum so tests hash quickly.
pub fn test_hashing_config() -> HashingConfig {
    HashingConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
        secret: "test-pepper".to_owned(),
    }
}

pub fn test_directory(db: &DatabaseConnection) -> ModeratorDirectory {
    let hasher = CredentialHasher::new(&test_hashing_config()).expect("Valid test hashing params");
    ModeratorDirectory::new(db.clone(), hasher)
}

/// Create a moderator with [`TEST_PASSWORD`] and the given roles
pub async fn create_test_moderator(
    directory: &ModeratorDirectory,
    username: &str,
    roles: &[Role],
) -> Moderator {
    directory
        .create_with_roles(username, TEST_PASSWORD, roles)
        .await
        .expect("Failed to create test moderator")
}

/// Create a board with one thread holding one post
pub async fn create_test_post(db: &DatabaseConnection, board_name: &str) -> Result<PostPath, DbErr> {
    let board = create_board(db, board_name).await?;
    create_test_post_on(db, board.id).await
}

/// Create a new thread with one post on an existing board
pub async fn create_test_post_on(db: &DatabaseConnection, board_id: i32) -> Result<PostPath, DbErr> {
    let thread = create_thread(db, board_id).await?;
    let post = create_post(db, thread.id).await?;

    Ok(PostPath {
        post_id: post.id,
        thread_id: thread.id,
        board_id,
    })
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new() -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|day| day.and_hms_opt(12, 0, 0))
            .expect("Valid start time");
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("Clock lock poisoned");
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().expect("Clock lock poisoned")
    }
}

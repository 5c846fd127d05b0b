//! Time source for report timestamps.

use chrono::{NaiveDateTime, Utc};

pub trait Clock: Send + Sync {
    /// Current UTC time without offset, as stored in the database.
    fn now(&self) -> NaiveDateTime;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

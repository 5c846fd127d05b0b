//! SeaORM entities.
//!
//! `boards`, `threads` and `posts` are the read model owned by the rest of
//! the board software; this crate only navigates them.

pub mod board_moderators;
pub mod boards;
pub mod moderators;
pub mod posts;
pub mod reports;
pub mod threads;

//! Moderator accounts, role checks and content reports for an imageboard.
//!
//! Services are constructed with their collaborators and handed to request
//! handlers explicitly; nothing in this crate is process-global.

pub mod app_config;
pub mod clock;
pub mod constants;
pub mod content;
pub mod credentials;
pub mod db;
pub mod error;
pub mod moderator;
pub mod orm;
pub mod password;
pub mod permission;
pub mod report;
pub mod role;
pub mod session;

pub use error::{Error, Result};
pub use moderator::{Moderator, ModeratorDirectory};
pub use report::ReportAggregator;
pub use role::Role;
pub use session::{IdentitySession, RequestContext};

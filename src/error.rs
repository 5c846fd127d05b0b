//! Error kinds surfaced to request handlers.
//!
//! Rejections of a precondition (bad input, duplicate name, wrong password)
//! are returned as-is and never logged by the services. Handlers decide how
//! to phrase them for the user.

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Username/password format rules, unknown role, role not held.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Username collision on creation.
    #[error("duplicate identity: {0}")]
    DuplicateIdentity(String),

    /// Password mismatch, or no usable identity bound to the session.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The moderator lacks authority over the content involved.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("password hashing error: {0}")]
    Hashing(String),

    #[error("session error: {0}")]
    Session(String),
}

impl Error {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }

    pub fn is_duplicate_identity(&self) -> bool {
        matches!(self, Error::DuplicateIdentity(_))
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication(_))
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Error::PermissionDenied(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

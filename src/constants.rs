//! Application-wide constants
//!
//! Session keys and retry limits shared by the services. Credential length
//! limits live on the validator derives in `credentials`.

/// Session key holding the authenticated moderator id.
pub const SESSION_IDENTITY_KEY: &str = "mod_auth_id";

/// Number of compare-and-swap attempts for a role list update before giving up.
pub const ROLE_UPDATE_ATTEMPTS: usize = 5;

//! Closed set of moderator role tags.
//!
//! Roles are stored on the moderator row as a comma joined list of their
//! string values, in the order they were granted.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Global authority over every board and report.
    Admin,
    /// Full moderation of the boards the moderator is assigned to.
    Moderator,
    /// Cleanup duties on assigned boards.
    Janitor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Moderator, Role::Janitor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Janitor => "janitor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == tag)
            .ok_or_else(|| Error::InvalidInput("Invalid role".to_owned()))
    }
}

/// Returns true if `tag` names a recognized role.
pub fn role_exists(tag: &str) -> bool {
    tag.parse::<Role>().is_ok()
}

/// Serializes a role list for the `moderators.roles` column.
pub fn encode_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses the `moderators.roles` column. Unknown tags are skipped.
pub fn decode_roles(column: &str) -> Vec<Role> {
    column
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .filter_map(|tag| match tag.parse::<Role>() {
            Ok(role) => Some(role),
            Err(_) => {
                log::warn!("Ignoring unrecognized role tag '{}' in storage", tag);
                None
            }
        })
        .collect()
}

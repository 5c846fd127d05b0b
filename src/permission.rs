//! Role and board authority predicates.
//!
//! Pure checks over already-loaded moderators and post paths. Callers load
//! the data, these functions only answer yes or no.

use crate::content::PostPath;
use crate::moderator::Moderator;
use crate::role::Role;

/// True iff the moderator holds `role`.
pub fn has_role(moderator: &Moderator, role: Role) -> bool {
    moderator.roles.contains(&role)
}

/// Like [`has_role`] for an untyped tag. Unknown or empty tags are never held.
pub fn has_role_tag(moderator: &Moderator, tag: Option<&str>) -> bool {
    match tag.map(str::parse::<Role>) {
        Some(Ok(role)) => has_role(moderator, role),
        _ => false,
    }
}

/// True iff `board_id` is in the moderator's board assignments.
pub fn moderates_board(moderator: &Moderator, board_id: i32) -> bool {
    moderator.boards.contains(&board_id)
}

/// Admins may delete anything; everyone else only on boards they moderate.
pub fn can_delete(moderator: &Moderator, post: &PostPath) -> bool {
    if has_role(moderator, Role::Admin) {
        return true;
    }

    moderates_board(moderator, post.board_id)
}

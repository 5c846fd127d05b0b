//! Binding of an authenticated moderator to the client's session.
//!
//! The session only ever stores the moderator id. [`RequestContext`] resolves
//! it to a [`Moderator`] at most once per request and keeps the result for
//! the rest of that request.

use crate::constants::SESSION_IDENTITY_KEY;
use crate::error::{Error, Result};
use crate::moderator::{Moderator, ModeratorDirectory};
use crate::permission;
use crate::role::Role;
use once_cell::unsync::OnceCell;

/// Typed access to the identity stored in a server-side session.
pub trait IdentitySession {
    fn get_identity(&self) -> Result<Option<i32>>;
    fn set_identity(&self, moderator_id: i32) -> Result<()>;
    fn clear_identity(&self) -> Result<()>;
}

impl<T: IdentitySession + ?Sized> IdentitySession for &T {
    fn get_identity(&self) -> Result<Option<i32>> {
        (**self).get_identity()
    }

    fn set_identity(&self, moderator_id: i32) -> Result<()> {
        (**self).set_identity(moderator_id)
    }

    fn clear_identity(&self) -> Result<()> {
        (**self).clear_identity()
    }
}

impl IdentitySession for actix_session::Session {
    fn get_identity(&self) -> Result<Option<i32>> {
        self.get::<i32>(SESSION_IDENTITY_KEY)
            .map_err(|e| Error::Session(e.to_string()))
    }

    fn set_identity(&self, moderator_id: i32) -> Result<()> {
        // New session key on privilege change.
        self.renew();
        self.insert(SESSION_IDENTITY_KEY, moderator_id)
            .map_err(|e| Error::Session(e.to_string()))
    }

    fn clear_identity(&self) -> Result<()> {
        self.remove(SESSION_IDENTITY_KEY);
        Ok(())
    }
}

/// Per-request moderator context. Build one per request; never share it
/// between requests.
pub struct RequestContext<'a, S> {
    directory: &'a ModeratorDirectory,
    session: S,
    moderator: OnceCell<Moderator>,
}

impl<'a, S: IdentitySession> RequestContext<'a, S> {
    pub fn new(directory: &'a ModeratorDirectory, session: S) -> Self {
        Self {
            directory,
            session,
            moderator: OnceCell::new(),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// True when the session carries a moderator id. The id may be stale.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.session.get_identity()?.is_some())
    }

    /// The moderator bound to this session.
    ///
    /// Fails with `Authentication` when the session has no id, or when the id
    /// no longer resolves to an account.
    pub async fn current_moderator(&self) -> Result<&Moderator> {
        if let Some(moderator) = self.moderator.get() {
            return Ok(moderator);
        }

        let moderator_id = self
            .session
            .get_identity()?
            .ok_or_else(|| Error::Authentication("Not authenticated".to_owned()))?;

        let moderator = self
            .directory
            .find_by_id(moderator_id)
            .await?
            .ok_or_else(|| Error::Authentication("Moderator not found".to_owned()))?;

        Ok(self.moderator.get_or_init(|| moderator))
    }

    /// Whether the current moderator holds `role`. Being logged out is `false`,
    /// not an error; store failures still propagate.
    pub async fn has_role_current(&self, role: Role) -> Result<bool> {
        match self.current_moderator().await {
            Ok(moderator) => Ok(permission::has_role(moderator, role)),
            Err(Error::Authentication(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn mark_authenticated(&mut self, moderator: &Moderator) -> Result<()> {
        self.session.set_identity(moderator.id)?;
        self.moderator = OnceCell::from(moderator.clone());

        log::debug!("Session bound to moderator_id {}", moderator.id);
        Ok(())
    }

    pub fn clear_authenticated(&mut self) -> Result<()> {
        self.session.clear_identity()?;
        self.moderator = OnceCell::new();
        Ok(())
    }

    /// Checks credentials and binds the moderator to the session.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<&Moderator> {
        let moderator = self.directory.authenticate(username, password).await?;
        self.mark_authenticated(&moderator)?;

        Ok(self.moderator.get_or_init(|| moderator))
    }
}

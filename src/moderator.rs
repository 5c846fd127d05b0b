//! Moderator accounts: creation, lookup, roles, boards and passwords.

use crate::constants::ROLE_UPDATE_ATTEMPTS;
use crate::content::PostPath;
use crate::credentials::{require_valid_password, require_valid_username};
use crate::error::{Error, Result};
use crate::orm::{board_moderators, boards, moderators};
use crate::password::CredentialHasher;
use crate::permission;
use crate::role::{decode_roles, encode_roles, Role};
use sea_orm::{
    entity::*, query::*, sea_query::Expr, DatabaseConnection, DbErr, SqlErr, TransactionTrait,
};
use std::collections::HashMap;

/// A moderator account with its roles and board assignments loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Moderator {
    pub id: i32,
    pub username: String,
    /// Argon2 PHC string produced by [`CredentialHasher::hash`].
    pub password_hash: String,
    /// Granted roles in grant order, without duplicates.
    pub roles: Vec<Role>,
    /// Ids of the boards this moderator moderates, ascending.
    pub boards: Vec<i32>,
}

impl Moderator {
    fn from_model(model: moderators::Model, boards: Vec<i32>) -> Self {
        Self {
            id: model.id,
            roles: decode_roles(&model.roles),
            username: model.username,
            password_hash: model.password,
            boards,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        permission::has_role(self, role)
    }

    pub fn moderates_board(&self, board_id: i32) -> bool {
        permission::moderates_board(self, board_id)
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Account store for moderators.
///
/// Each public operation runs as one unit against the database: it either
/// applies fully or, on any error, leaves the stored state untouched.
#[derive(Clone, Debug)]
pub struct ModeratorDirectory {
    db: DatabaseConnection,
    hasher: CredentialHasher,
}

impl ModeratorDirectory {
    pub fn new(db: DatabaseConnection, hasher: CredentialHasher) -> Self {
        Self { db, hasher }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    /// Creates a moderator without roles or boards.
    pub async fn create(&self, username: &str, password: &str) -> Result<Moderator> {
        self.create_with_roles(username, password, &[]).await
    }

    /// Creates a moderator holding `roles`.
    ///
    /// Username uniqueness is left to the table's unique constraint so that
    /// two racing creations end with exactly one row.
    pub async fn create_with_roles(
        &self,
        username: &str,
        password: &str,
        roles: &[Role],
    ) -> Result<Moderator> {
        require_valid_username(username)?;
        require_valid_password(password, "Invalid password")?;

        let mut granted: Vec<Role> = Vec::with_capacity(roles.len());
        for role in roles {
            if !granted.contains(role) {
                granted.push(*role);
            }
        }

        let password_hash = self.hasher.hash(password)?;

        let duplicate = || Error::DuplicateIdentity("Duplicate username".to_owned());
        let txn = self.db.begin().await?;
        let inserted = moderators::ActiveModel {
            username: Set(username.to_owned()),
            password: Set(password_hash),
            roles: Set(encode_roles(&granted)),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        let model = match inserted {
            Ok(model) => model,
            Err(e) => {
                txn.rollback().await?;
                return Err(if is_unique_violation(&e) {
                    duplicate()
                } else {
                    e.into()
                });
            }
        };

        txn.commit()
            .await
            .map_err(|e| if is_unique_violation(&e) { duplicate() } else { e.into() })?;

        log::info!(
            "Created moderator '{}' (moderator_id: {})",
            model.username,
            model.id
        );

        Ok(Moderator::from_model(model, Vec::new()))
    }

    /// Removes the moderator and its board assignments.
    pub async fn delete(&self, moderator: &Moderator) -> Result<()> {
        let txn = self.db.begin().await?;

        board_moderators::Entity::delete_many()
            .filter(board_moderators::Column::ModeratorId.eq(moderator.id))
            .exec(&txn)
            .await?;
        moderators::Entity::delete_by_id(moderator.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        log::info!(
            "Deleted moderator '{}' (moderator_id: {})",
            moderator.username,
            moderator.id
        );
        Ok(())
    }

    async fn load_boards(&self, moderator_id: i32) -> Result<Vec<i32>> {
        let rows = board_moderators::Entity::find()
            .filter(board_moderators::Column::ModeratorId.eq(moderator_id))
            .order_by_asc(board_moderators::Column::BoardId)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|row| row.board_id).collect())
    }

    async fn hydrate(&self, model: Option<moderators::Model>) -> Result<Option<Moderator>> {
        match model {
            Some(model) => {
                let boards = self.load_boards(model.id).await?;
                Ok(Some(Moderator::from_model(model, boards)))
            }
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Moderator>> {
        let model = moderators::Entity::find_by_id(id).one(&self.db).await?;
        self.hydrate(model).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Moderator>> {
        let model = moderators::Entity::find()
            .filter(moderators::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        self.hydrate(model).await
    }

    /// Every moderator, ordered by id.
    pub async fn list_all(&self) -> Result<Vec<Moderator>> {
        let models = moderators::Entity::find()
            .order_by_asc(moderators::Column::Id)
            .all(&self.db)
            .await?;

        let mut boards_by_moderator: HashMap<i32, Vec<i32>> = HashMap::new();
        for row in board_moderators::Entity::find()
            .order_by_asc(board_moderators::Column::BoardId)
            .all(&self.db)
            .await?
        {
            boards_by_moderator
                .entry(row.moderator_id)
                .or_default()
                .push(row.board_id);
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let boards = boards_by_moderator.remove(&model.id).unwrap_or_default();
                Moderator::from_model(model, boards)
            })
            .collect())
    }

    /// Applies `mutate` to the stored role list with compare-and-swap.
    ///
    /// `mutate` returns whether it changed the list. The write only lands if
    /// the stored list is still the one that was read, otherwise the read is
    /// repeated so a concurrent change is never overwritten.
    async fn update_roles<F>(&self, moderator: &mut Moderator, mutate: F) -> Result<()>
    where
        F: Fn(&mut Vec<Role>) -> Result<bool>,
    {
        for attempt in 1..=ROLE_UPDATE_ATTEMPTS {
            let stored = moderators::Entity::find_by_id(moderator.id)
                .one(&self.db)
                .await?
                .ok_or_else(|| {
                    DbErr::RecordNotFound(format!("moderator {}", moderator.id))
                })?;

            let mut roles = decode_roles(&stored.roles);
            let changed = match mutate(&mut roles) {
                Ok(changed) => changed,
                Err(e) => {
                    moderator.roles = decode_roles(&stored.roles);
                    return Err(e);
                }
            };
            if !changed {
                moderator.roles = roles;
                return Ok(());
            }

            let result = moderators::Entity::update_many()
                .col_expr(moderators::Column::Roles, Expr::value(encode_roles(&roles)))
                .filter(moderators::Column::Id.eq(moderator.id))
                .filter(moderators::Column::Roles.eq(stored.roles))
                .exec(&self.db)
                .await?;

            if result.rows_affected == 1 {
                moderator.roles = roles;
                return Ok(());
            }

            log::warn!(
                "Role list of moderator_id {} changed concurrently (attempt {}/{})",
                moderator.id,
                attempt,
                ROLE_UPDATE_ATTEMPTS
            );
        }

        Err(DbErr::Custom(format!(
            "role update for moderator {} kept conflicting",
            moderator.id
        ))
        .into())
    }

    /// Grants `role`. Granting a role already held changes nothing.
    pub async fn add_role(&self, moderator: &mut Moderator, role: Role) -> Result<()> {
        self.update_roles(moderator, |roles| {
            if roles.contains(&role) {
                return Ok(false);
            }
            roles.push(role);
            Ok(true)
        })
        .await?;

        log::info!("Granted role {} to moderator_id {}", role, moderator.id);
        Ok(())
    }

    /// Grants a role given by tag; unknown tags are `InvalidInput`.
    pub async fn add_role_tag(&self, moderator: &mut Moderator, tag: &str) -> Result<()> {
        let role = tag.parse::<Role>()?;
        self.add_role(moderator, role).await
    }

    /// Revokes `role`. Fails with `InvalidInput` if the stored account does
    /// not hold it, whatever the in-memory copy says.
    pub async fn remove_role(&self, moderator: &mut Moderator, role: Role) -> Result<()> {
        let not_held = || Error::InvalidInput("Role not on moderator".to_owned());

        self.update_roles(moderator, |roles| {
            let before = roles.len();
            roles.retain(|held| *held != role);
            if roles.len() == before {
                return Err(not_held());
            }
            Ok(true)
        })
        .await?;

        log::info!("Revoked role {} from moderator_id {}", role, moderator.id);
        Ok(())
    }

    /// Revokes a role given by tag; empty or unknown tags are `InvalidInput`.
    pub async fn remove_role_tag(&self, moderator: &mut Moderator, tag: &str) -> Result<()> {
        let role = tag.parse::<Role>()?;
        self.remove_role(moderator, role).await
    }

    /// Makes the moderator a moderator of `board_id`. Already assigned is fine.
    pub async fn assign_board(&self, moderator: &mut Moderator, board_id: i32) -> Result<()> {
        if boards::Entity::find_by_id(board_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(Error::InvalidInput("Board not found".to_owned()));
        }

        let assigned = board_moderators::Entity::find_by_id((board_id, moderator.id))
            .one(&self.db)
            .await?
            .is_some();

        if !assigned {
            let inserted = board_moderators::ActiveModel {
                board_id: Set(board_id),
                moderator_id: Set(moderator.id),
            }
            .insert(&self.db)
            .await;

            match inserted {
                Ok(_) => {}
                // Assigned concurrently; the row we wanted exists.
                Err(e) if is_unique_violation(&e) => {}
                Err(e) => return Err(e.into()),
            }
        }

        if !moderator.moderates_board(board_id) {
            moderator.boards.push(board_id);
            moderator.boards.sort_unstable();
        }
        log::info!(
            "Assigned board_id {} to moderator_id {}",
            board_id,
            moderator.id
        );
        Ok(())
    }

    /// Removes `board_id` from the moderator's boards. `InvalidInput` if the
    /// stored account is not assigned to it.
    pub async fn unassign_board(&self, moderator: &mut Moderator, board_id: i32) -> Result<()> {
        let result = board_moderators::Entity::delete_many()
            .filter(board_moderators::Column::ModeratorId.eq(moderator.id))
            .filter(board_moderators::Column::BoardId.eq(board_id))
            .exec(&self.db)
            .await?;

        moderator.boards.retain(|id| *id != board_id);
        if result.rows_affected == 0 {
            return Err(Error::InvalidInput("Board not on moderator".to_owned()));
        }

        log::info!(
            "Unassigned board_id {} from moderator_id {}",
            board_id,
            moderator.id
        );
        Ok(())
    }

    /// `Authentication` error unless `password` matches the stored hash.
    pub fn check_password(&self, moderator: &Moderator, password: &str) -> Result<()> {
        if self.hasher.verify(password, &moderator.password_hash) {
            Ok(())
        } else {
            Err(Error::Authentication("Password does not match".to_owned()))
        }
    }

    /// Login check. Unknown usernames and wrong passwords are indistinguishable.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Moderator> {
        let rejected = || Error::Authentication("Invalid username or password".to_owned());

        let moderator = self.find_by_username(username).await?.ok_or_else(rejected)?;
        self.check_password(&moderator, password)
            .map_err(|_| rejected())?;

        Ok(moderator)
    }

    /// Replaces the password after verifying the current one.
    pub async fn change_password(
        &self,
        moderator: &mut Moderator,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        require_valid_password(old_password, "Invalid password")?;
        self.check_password(moderator, old_password)?;

        self.update_password(moderator, new_password).await
    }

    /// Replaces the password without knowing the current one.
    pub async fn change_password_admin(
        &self,
        moderator: &mut Moderator,
        new_password: &str,
    ) -> Result<()> {
        self.update_password(moderator, new_password).await
    }

    async fn update_password(&self, moderator: &mut Moderator, new_password: &str) -> Result<()> {
        require_valid_password(new_password, "Invalid new password")?;

        let password_hash = self.hasher.hash(new_password)?;
        let result = moderators::Entity::update_many()
            .col_expr(moderators::Column::Password, Expr::value(password_hash.clone()))
            .filter(moderators::Column::Id.eq(moderator.id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("moderator {}", moderator.id)).into());
        }

        moderator.password_hash = password_hash;
        log::info!("Changed password of moderator_id {}", moderator.id);
        Ok(())
    }

    pub fn has_role(&self, moderator: &Moderator, role: Role) -> bool {
        permission::has_role(moderator, role)
    }

    pub fn moderates_board(&self, moderator: &Moderator, board_id: i32) -> bool {
        permission::moderates_board(moderator, board_id)
    }

    pub fn can_delete(&self, moderator: &Moderator, post: &PostPath) -> bool {
        permission::can_delete(moderator, post)
    }
}

use std::sync::Arc;

use crate::auth::Admin;
use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User, UserPayload};
use crate::repository::UserRepository;

/// User administration. Every operation requires an [`Admin`].
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

/// Anything other than an unsigned decimal is an invalid id. Numbers past
/// the `i32` column range are well formed but can never match a record.
fn parse_id(raw: &str) -> UserResult<i32> {
    let invalid = || UserError::InvalidId(raw.to_string());
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let wide: u64 = raw.parse().map_err(|_| invalid())?;
    i32::try_from(wide).map_err(|_| UserError::NotFound(raw.to_string()))
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Validate, hash and insert. A taken username surfaces from the store.
    pub async fn create_user(&self, admin: &Admin, payload: UserPayload) -> UserResult<User> {
        let user = NewUser::from_payload(payload)?;
        tracing::debug!(admin = admin.subject(), username = %user.username, "Creating user");

        self.repository.create(user).await
    }

    pub async fn list_users(&self, admin: &Admin) -> UserResult<Vec<User>> {
        tracing::debug!(admin = admin.subject(), "Listing users");
        self.repository.list().await
    }

    /// A non-numeric id can never match a record, so it reads as not found.
    pub async fn get_user(&self, admin: &Admin, raw_id: &str) -> UserResult<User> {
        tracing::debug!(admin = admin.subject(), id = raw_id, "Fetching user");
        let not_found = || UserError::NotFound(raw_id.to_string());

        let id = parse_id(raw_id).map_err(|_| not_found())?;
        self.repository.get_by_id(id).await?.ok_or_else(not_found)
    }

    /// Id, then existence, then the body; the password hash is always recomputed.
    ///
    /// `payload` arrives already extracted so a malformed body is only
    /// reported once the target is known to exist.
    pub async fn update_user(
        &self,
        admin: &Admin,
        raw_id: &str,
        payload: UserResult<UserPayload>,
    ) -> UserResult<User> {
        let id = parse_id(raw_id)?;
        self.ensure_exists(id).await?;

        let user = NewUser::from_payload(payload?)?;
        tracing::debug!(admin = admin.subject(), user_id = id, "Updating user");

        self.repository.update(id, user).await
    }

    pub async fn delete_user(&self, admin: &Admin, raw_id: &str) -> UserResult<i32> {
        let id = parse_id(raw_id)?;
        self.ensure_exists(id).await?;
        tracing::debug!(admin = admin.subject(), user_id = id, "Deleting user");

        if self.repository.delete(id).await? {
            Ok(id)
        } else {
            Err(UserError::NotFound(id.to_string()))
        }
    }

    async fn ensure_exists(&self, id: i32) -> UserResult<()> {
        match self.repository.get_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(UserError::NotFound(id.to_string())),
        }
    }
}

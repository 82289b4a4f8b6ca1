use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};

/// Repository trait for User persistence.
///
/// Username uniqueness is the store's job: `create` and `update` report a
/// taken username as [`UserError::DuplicateUsername`] atomically with the write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert and return the stored record with its assigned id
    async fn create(&self, user: NewUser) -> UserResult<User>;

    async fn get_by_id(&self, id: i32) -> UserResult<Option<User>>;

    /// All users ordered by id ascending
    async fn list(&self) -> UserResult<Vec<User>>;

    /// Overwrite every mutable field of `id`
    async fn update(&self, id: i32, user: NewUser) -> UserResult<User>;

    /// `false` when nothing was deleted
    async fn delete(&self, id: i32) -> UserResult<bool>;
}

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<i32, User>,
    last_id: i32,
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn record(id: i32, user: NewUser) -> User {
    User {
        id,
        nama_user: user.nama_user,
        role: user.role,
        username: user.username,
        password: user.password_hash,
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> UserResult<User> {
        let mut store = self.store.write().await;

        if store.users.values().any(|u| u.username == user.username) {
            return Err(UserError::DuplicateUsername(user.username));
        }

        store.last_id += 1;
        let created = record(store.last_id, user);
        store.users.insert(created.id, created.clone());

        tracing::info!(user_id = created.id, username = %created.username, "Created user");
        Ok(created)
    }

    async fn get_by_id(&self, id: i32) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.get(&id).cloned())
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        let store = self.store.read().await;
        Ok(store.users.values().cloned().collect())
    }

    async fn update(&self, id: i32, user: NewUser) -> UserResult<User> {
        let mut store = self.store.write().await;

        if !store.users.contains_key(&id) {
            return Err(UserError::NotFound(id.to_string()));
        }

        let taken = store
            .users
            .values()
            .any(|u| u.id != id && u.username == user.username);
        if taken {
            return Err(UserError::DuplicateUsername(user.username));
        }

        let updated = record(id, user);
        store.users.insert(id, updated.clone());

        tracing::info!(user_id = id, "Updated user");
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> UserResult<bool> {
        let mut store = self.store.write().await;

        if store.users.remove(&id).is_some() {
            tracing::info!(user_id = id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

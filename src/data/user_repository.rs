use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace, warn};

struct UserTable {
    users: HashMap<u32, User>,
    next_id: u32,
}

/// Users keyed by id, ids assigned sequentially starting at 1. The email
/// uniqueness check and the insert happen under the same write lock, so two
/// concurrent registrations of one email cannot both land.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(UserTable {
                users: HashMap::new(),
                next_id: 1,
            })),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, password_hash), fields(email = %email))]
    async fn create_user(&self, email: String, password_hash: String) -> Result<User> {
        trace!("Acquiring write lock for user storage");
        let mut table = self.storage.write().await;

        if table.users.values().any(|u| u.email == email) {
            warn!(email = %email, "Email already registered");
            return Err(DomainError::EmailTaken.into());
        }

        let id = table.next_id;
        table.next_id += 1;
        let user = User {
            id,
            email,
            password_hash,
        };
        table.users.insert(id, user.clone());
        debug!(
            user_id = user.id,
            email = %user.email,
            "User saved to memory storage"
        );
        Ok(user)
    }

    #[instrument(skip(self), fields(email = email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        trace!("Acquiring read lock for user storage");
        let table = self.storage.read().await;
        let user = table.users.values().find(|u| u.email == email).cloned();
        match &user {
            Some(u) => debug!(user_id = u.id, email = %u.email, "User found in storage"),
            None => trace!(email = email, "User not found in storage"),
        }
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = id))]
    async fn find_by_id(&self, id: u32) -> Result<Option<User>> {
        trace!("Acquiring read lock for user storage");
        let table = self.storage.read().await;
        let user = table.users.get(&id).cloned();
        match &user {
            Some(u) => debug!(user_id = u.id, email = %u.email, "User found in storage"),
            None => trace!(user_id = id, "User not found in storage"),
        }
        Ok(user)
    }
}

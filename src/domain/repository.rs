use crate::domain::session::Session;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Assigns an id and inserts the user. The duplicate-email check and the
    /// insert must be atomic; fails with `DomainError::EmailTaken` if the
    /// email is already registered.
    async fn create_user(&self, email: String, password_hash: String) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: u32) -> Result<Option<User>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, token: String, session: Session) -> Result<()>;
    async fn get(&self, token: &str) -> Result<Option<Session>>;
    /// Removing an absent token is not an error.
    async fn remove(&self, token: &str) -> Result<()>;
}

use crate::domain::error::DomainError;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::session::Session;
use crate::domain::user::{LoginRequest, RegisterRequest, UserPublic};
use crate::infrastructure::security::{generate_session_token, hash_password, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

/// Register / login / current-user / logout over an injected user
/// repository and session store. Per session the state machine is
/// Anonymous -> Authenticated -> Anonymous, nothing else.
pub struct AuthService<R: UserRepository, S: SessionStore> {
    user_repository: Arc<R>,
    session_store: Arc<S>,
}

impl<R: UserRepository, S: SessionStore> AuthService<R, S> {
    pub fn new(user_repository: Arc<R>, session_store: Arc<S>) -> Self {
        Self {
            user_repository,
            session_store,
        }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> Result<(UserPublic, String)> {
        trace!("Starting user registration");

        if req.email.is_empty() || req.password.is_empty() {
            warn!("Registration rejected: missing email or password");
            return Err(
                DomainError::Validation("Email and password are required".to_string()).into(),
            );
        }

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        // Duplicate check and insert are atomic inside the repository
        let user = self
            .user_repository
            .create_user(req.email, password_hash)
            .await?;

        let token = self.open_session(user.id).await?;

        info!(
            user_id = user.id,
            email = %user.email,
            "User registered successfully"
        );

        Ok((user.into(), token))
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<(UserPublic, String)> {
        trace!("Starting login");

        // Unknown email and wrong password yield the same error so callers
        // cannot enumerate registered addresses
        let user = self
            .user_repository
            .find_by_email(&req.email)
            .await?
            .ok_or_else(|| {
                warn!(email = %req.email, "User not found during login");
                DomainError::InvalidCredentials
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;

        if !is_valid {
            warn!(user_id = user.id, email = %user.email, "Invalid password during login");
            return Err(DomainError::InvalidCredentials.into());
        }

        let token = self.open_session(user.id).await?;

        info!(
            user_id = user.id,
            email = %user.email,
            "Login successful"
        );

        Ok((user.into(), token))
    }

    #[instrument(skip(self, token))]
    pub async fn current_user(&self, token: Option<&str>) -> Result<UserPublic> {
        trace!("Resolving current user from session");

        let token = token.ok_or_else(|| {
            trace!("No session token presented");
            DomainError::InvalidCredentials
        })?;

        let session = self.session_store.get(token).await?.ok_or_else(|| {
            warn!("Unknown session token presented");
            DomainError::InvalidCredentials
        })?;

        let user = self
            .user_repository
            .find_by_id(session.user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = session.user_id, "Session references missing user");
                DomainError::UserNotFound
            })?;

        debug!(user_id = user.id, email = %user.email, "Current user resolved");
        Ok(user.into())
    }

    /// Idempotent: an absent or unknown token is not an error.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: Option<&str>) -> Result<()> {
        trace!("Starting logout");

        if let Some(token) = token {
            self.session_store.remove(token).await?;
        }

        info!("Logout completed");
        Ok(())
    }

    async fn open_session(&self, user_id: u32) -> Result<String> {
        // Always a fresh token, never reuse of a presented cookie
        let token = generate_session_token();
        self.session_store
            .insert(token.clone(), Session::new(user_id))
            .await?;
        debug!(user_id = user_id, "Session established");
        Ok(token)
    }
}

use crate::application::auth_service::AuthService;
use crate::data::session_store::InMemorySessionStore;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest};
use crate::infrastructure::config::AppConfig;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub const SESSION_COOKIE: &str = "session_id";

// AppState holding the service and startup config
pub struct AppState {
    pub auth_service: Arc<AuthService<InMemoryUserRepository, InMemorySessionStore>>,
    pub config: AppConfig,
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            ApiError::Validation(_) => actix_web::http::StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => actix_web::http::StatusCode::CONFLICT,
            ApiError::Unauthorized => actix_web::http::StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            ApiError::Internal(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        // Internal detail stays in the log, never in the response body
        let details = match self {
            ApiError::Validation(msg) => serde_json::json!({ "message": msg }),
            ApiError::Conflict(msg) => serde_json::json!({ "message": msg }),
            ApiError::Unauthorized => serde_json::json!({ "message": "Unauthorized" }),
            ApiError::NotFound(msg) => serde_json::json!({ "message": msg }),
            ApiError::Internal(_) => serde_json::json!({ "message": "Internal server error" }),
        };

        match self {
            ApiError::Validation(_) => {
                warn!(error = %error_msg, status = %status, "Validation error")
            }
            ApiError::Conflict(_) => {
                warn!(error = %error_msg, status = %status, "Conflict")
            }
            ApiError::Unauthorized => {
                warn!(error = %error_msg, status = %status, "Unauthorized")
            }
            ApiError::NotFound(_) => {
                warn!(error = %error_msg, status = %status, "Resource not found")
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, status = %status, "Internal error")
            }
        }

        let error_response = ErrorResponse {
            error: error_msg,
            details,
        };

        HttpResponse::build(status).json(error_response)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(DomainError::EmailTaken) => {
                ApiError::Conflict("Email already registered".to_string())
            }
            Some(DomainError::InvalidCredentials) => ApiError::Unauthorized,
            Some(DomainError::UserNotFound) => ApiError::NotFound("User not found".to_string()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Internal(err.to_string()),
        }
    }
}

fn session_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .finish()
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

fn session_token(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE).map(|c| c.value().to_string())
}

// Handlers

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[instrument]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Auth backend is running")
}

#[instrument(skip(state, req), fields(email = %req.email, user_id))]
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(email = %req.email, "Registration request received");

    let (user, token) = state
        .auth_service
        .register(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to register user");
            ApiError::from(e)
        })?;

    tracing::Span::current().record("user_id", user.id);
    info!(user_id = user.id, email = %user.email, "User registered successfully");
    Ok(HttpResponse::Created()
        .cookie(session_cookie(token, &state.config))
        .json(user))
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(email = %req.email, "Login request received");

    let (user, token) = state
        .auth_service
        .login(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to login");
            ApiError::from(e)
        })?;

    info!(user_id = user.id, "Login successful");
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token, &state.config))
        .json(user))
}

#[instrument(skip(state, req))]
pub async fn current_user(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let token = session_token(&req);

    let user = state
        .auth_service
        .current_user(token.as_deref())
        .await
        .map_err(ApiError::from)?;

    info!(user_id = user.id, "Current user resolved");
    Ok(HttpResponse::Ok().json(user))
}

#[instrument(skip(state, req))]
pub async fn logout(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let token = session_token(&req);

    state
        .auth_service
        .logout(token.as_deref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to logout");
            ApiError::from(e)
        })?;

    info!("Logout successful");
    Ok(HttpResponse::Ok().cookie(removal_cookie()).json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

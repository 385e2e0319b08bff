use poem_openapi::{payload::Json, ApiResponse, Object};

use crate::errors::InternalError;

/// Standardized error response for authentication endpoints
#[derive(Object, Debug)]
pub struct AuthErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Invalid username or password
    #[oai(status = 401)]
    InvalidCredentials(Json<AuthErrorResponse>),

    /// Account temporarily locked after repeated failed logins
    #[oai(status = 423)]
    AccountLocked(Json<AuthErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<AuthErrorResponse>),
}

impl AuthError {
    /// Create an InvalidCredentials error
    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(Json(AuthErrorResponse {
            error: "invalid_credentials".to_string(),
            message: "Invalid username or password".to_string(),
            status_code: 401,
        }))
    }

    /// Create an AccountLocked error
    pub fn account_locked() -> Self {
        AuthError::AccountLocked(Json(AuthErrorResponse {
            error: "account_locked".to_string(),
            message: "Account is temporarily locked; try again later".to_string(),
            status_code: 423,
        }))
    }

    /// Create an InternalError
    pub fn internal_error(message: String) -> Self {
        AuthError::InternalError(Json(AuthErrorResponse {
            error: "internal_error".to_string(),
            message,
            status_code: 500,
        }))
    }
}

impl From<InternalError> for AuthError {
    fn from(err: InternalError) -> Self {
        tracing::error!("Internal error in authentication endpoint: {:?}", err);
        // Details stay in the server log
        AuthError::internal_error("Internal server error".to_string())
    }
}

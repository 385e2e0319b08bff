use poem_openapi::{payload::Json, ApiResponse, Object};

use crate::errors::internal::{AccessError, CredentialError, InternalError};

/// Standardized error response for administrative endpoints
#[derive(Object, Debug)]
pub struct AdminErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Administrative endpoint error types.
///
/// Authorization failures are surfaced as a redirect to the login entry
/// point; "forbidden" and "not logged in" are deliberately indistinguishable
/// to the client and only differ in the activity log.
#[derive(ApiResponse, Debug)]
pub enum AdminError {
    /// Authorization failed; clients follow Location to the login page
    #[oai(status = 303)]
    RedirectToLogin(#[oai(header = "Location")] String),

    /// Malformed or invalid request payload
    #[oai(status = 400)]
    BadRequest(Json<AdminErrorResponse>),

    /// Referenced record does not exist
    #[oai(status = 404)]
    NotFound(Json<AdminErrorResponse>),

    /// Unique-name or assignment conflict
    #[oai(status = 409)]
    Conflict(Json<AdminErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<AdminErrorResponse>),
}

impl AdminError {
    pub fn redirect_to_login(location: impl Into<String>) -> Self {
        AdminError::RedirectToLogin(location.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AdminError::BadRequest(Json(AdminErrorResponse {
            error: "bad_request".to_string(),
            message: message.into(),
            status_code: 400,
        }))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AdminError::NotFound(Json(AdminErrorResponse {
            error: "not_found".to_string(),
            message: message.into(),
            status_code: 404,
        }))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AdminError::Conflict(Json(AdminErrorResponse {
            error: "conflict".to_string(),
            message: message.into(),
            status_code: 409,
        }))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        AdminError::InternalError(Json(AdminErrorResponse {
            error: "internal_error".to_string(),
            message: message.into(),
            status_code: 500,
        }))
    }
}

impl From<InternalError> for AdminError {
    fn from(err: InternalError) -> Self {
        match err {
            InternalError::Access(AccessError::DuplicateName { .. })
            | InternalError::Credential(CredentialError::DuplicateUsername(_))
            | InternalError::Credential(CredentialError::DuplicateEmail(_)) => {
                AdminError::conflict(err.to_string())
            }
            InternalError::Access(AccessError::NotFound { .. }) => {
                AdminError::not_found(err.to_string())
            }
            other => {
                tracing::error!("Internal error in admin endpoint: {:?}", other);
                AdminError::internal_error("Internal server error")
            }
        }
    }
}

use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for user login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username for authentication
    pub username: String,

    /// Password for authentication
    pub password: String,

    /// Extend credential lifetime to 7 days instead of 2 hours
    pub remember_me: Option<bool>,
}

/// Response model for a successful login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub username: String,

    /// Primary role recorded in the session and token
    pub role: String,

    pub member_id: i64,

    /// Number of seconds until the issued credential expires
    pub expires_in: i64,
}

/// Response model for the whoami endpoint
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub logged_in: bool,
    pub username: Option<String>,
    pub role: Option<String>,
    pub member_id: Option<i64>,
    pub company_id: Option<i64>,
}

/// Response model for logout
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Success message
    pub message: String,
}

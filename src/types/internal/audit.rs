use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

/// Action types recorded in the activity log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    LoginSuccess,
    LoginFailure,
    AccountLocked,
    LockoutReset,
    Logout,
    TokenIssued,
    TokenValidationFailure,
    SessionHydrated,
    AccessDenied,
    RoleAssignmentChanged,
    PermissionAssignmentChanged,
    CapabilityAssignmentChanged,
    Custom(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::LoginSuccess => "login_success",
            Self::LoginFailure => "login_failure",
            Self::AccountLocked => "account_locked",
            Self::LockoutReset => "lockout_reset",
            Self::Logout => "logout",
            Self::TokenIssued => "token_issued",
            Self::TokenValidationFailure => "token_validation_failure",
            Self::SessionHydrated => "session_hydrated",
            Self::AccessDenied => "access_denied",
            Self::RoleAssignmentChanged => "role_assignment_changed",
            Self::PermissionAssignmentChanged => "permission_assignment_changed",
            Self::CapabilityAssignmentChanged => "capability_assignment_changed",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Category column for the activity log
    pub fn category(&self) -> &'static str {
        match self {
            Self::AccessDenied => "authorization",
            Self::RoleAssignmentChanged
            | Self::PermissionAssignmentChanged
            | Self::CapabilityAssignmentChanged
            | Self::LockoutReset => "administration",
            _ => "authentication",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<T: Into<String>> From<T> for EventType {
    fn from(s: T) -> Self {
        EventType::Custom(s.into())
    }
}

/// Outcome column for the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Denied,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Activity log entry prior to persistence
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: EventType,
    pub outcome: Outcome,
    pub actor_user_id: Option<i64>,
    pub actor_company_id: Option<i64>,
    pub actor_label: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub correlation_id: String,
    pub data: HashMap<String, serde_json::Value>,
}

impl AuditEvent {
    pub fn new(action: EventType, outcome: Outcome) -> Self {
        Self {
            action,
            outcome,
            actor_user_id: None,
            actor_company_id: None,
            actor_label: "unknown".to_string(),
            ip_address: None,
            user_agent: None,
            correlation_id: Uuid::new_v4().to_string(),
            data: HashMap::new(),
        }
    }
}

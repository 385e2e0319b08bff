use thiserror::Error;

pub mod access;
pub mod audit;
pub mod credential;
pub mod database;
pub mod token;

pub use access::AccessError;
pub use audit::AuditError;
pub use credential::CredentialError;
pub use database::DatabaseError;
pub use token::TokenError;

/// Internal error type for store and service operations
///
/// Hybrid design separates infrastructure errors (shared) from domain errors
/// (store-specific). Not exposed via API - endpoints must convert to
/// AuthError or AdminError.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse { value_type: String, message: String },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Access(#[from] AccessError),
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn parse(value_type: &str, message: impl Into<String>) -> InternalError {
        InternalError::Parse {
            value_type: value_type.to_string(),
            message: message.into(),
        }
    }
}

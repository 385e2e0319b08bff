use thiserror::Error;

/// Domain errors for credential management
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Stored password hash for user {0} is unreadable")]
    CorruptHash(i64),
}

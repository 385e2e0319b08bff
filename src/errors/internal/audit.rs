use thiserror::Error;

/// Errors raised while writing to the activity log
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to serialize activity details: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to append activity log entry: {0}")]
    WriteFailed(String),
}

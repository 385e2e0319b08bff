use thiserror::Error;

/// Verification and signing errors for the AuthToken credential.
///
/// In the authorization path these are recovered locally (the token is
/// treated as absent); they never reach an end user.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Token rejected: {reason}")]
    Invalid { reason: String },

    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl TokenError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

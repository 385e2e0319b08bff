use std::fmt;

/// Custom error type for secret-related failures
#[derive(Debug)]
pub enum SecretError {
    Missing { secret_name: String },
    TooShort { secret_name: String, minimum: usize, actual: usize },
}

impl SecretError {
    pub fn missing(secret_name: &str) -> Self {
        Self::Missing {
            secret_name: secret_name.to_string(),
        }
    }

    pub fn too_short(secret_name: &str, minimum: usize, actual: usize) -> Self {
        Self::TooShort {
            secret_name: secret_name.to_string(),
            minimum,
            actual,
        }
    }
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { secret_name } => {
                write!(f, "Required secret '{}' is missing", secret_name)
            }
            Self::TooShort {
                secret_name,
                minimum,
                actual,
            } => {
                write!(
                    f,
                    "Secret '{}' must be at least {} characters, got {}",
                    secret_name, minimum, actual
                )
            }
        }
    }
}

impl std::error::Error for SecretError {}

/// Centralized manager for application secrets and token identity settings.
///
/// Constructed once at startup and injected into the components that need it;
/// no process-wide mutable state.
pub struct SecretManager {
    token_secret: String,
    token_issuer: String,
    token_audience: String,
    password_pepper: String,
}

impl SecretManager {
    /// Initialize the SecretManager by loading and validating all secrets
    ///
    /// # Errors
    /// Returns `SecretError` if any required secret is missing or too short
    pub fn init() -> Result<Self, SecretError> {
        let token_secret = Self::load_required("TOKEN_SECRET", 32)?;
        let password_pepper = Self::load_required("PASSWORD_PEPPER", 16)?;
        let token_issuer = Self::load_or_default("TOKEN_ISSUER", "carbonledger");
        let token_audience = Self::load_or_default("TOKEN_AUDIENCE", "carbonledger-web");

        Ok(Self {
            token_secret,
            token_issuer,
            token_audience,
            password_pepper,
        })
    }

    /// Symmetric signing key for the AuthToken credential
    pub fn token_secret(&self) -> &str {
        &self.token_secret
    }

    pub fn token_issuer(&self) -> &str {
        &self.token_issuer
    }

    pub fn token_audience(&self) -> &str {
        &self.token_audience
    }

    /// Secret key mixed into password hashing
    pub fn password_pepper(&self) -> &str {
        &self.password_pepper
    }

    fn load_required(name: &str, min_length: usize) -> Result<String, SecretError> {
        let value = std::env::var(name).map_err(|_| SecretError::missing(name))?;
        if value.len() < min_length {
            return Err(SecretError::too_short(name, min_length, value.len()));
        }
        Ok(value)
    }

    fn load_or_default(name: &str, default: &str) -> String {
        std::env::var(name).unwrap_or_else(|_| default.to_string())
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("token_secret", &"<redacted>")
            .field("token_issuer", &self.token_issuer)
            .field("token_audience", &self.token_audience)
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_expose_secrets() {
        let manager = SecretManager {
            token_secret: "super-secret-token-key-with-32-chars!".to_string(),
            token_issuer: "carbonledger".to_string(),
            token_audience: "carbonledger-web".to_string(),
            password_pepper: "super-secret-pepper".to_string(),
        };

        let debug_output = format!("{:?}", manager);

        assert!(!debug_output.contains("super-secret"));
        assert!(debug_output.contains("<redacted>"));
    }
}

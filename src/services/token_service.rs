use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

use crate::config::SecretManager;
use crate::errors::internal::TokenError;
use crate::errors::InternalError;
use crate::types::internal::claims::AuthClaims;

/// Credential lifetime without remember-me: 2 hours
pub const NORMAL_TTL_SECS: i64 = 2 * 60 * 60;

/// Credential lifetime with remember-me: 7 days
pub const REMEMBER_ME_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Issues and validates the signed AuthToken credential.
///
/// Issuing is a pure computation; validation verifies signature, issuer,
/// audience and expiry with zero clock-skew tolerance and reports failures as
/// values rather than panicking.
pub struct TokenService {
    secret: String,
    issuer: String,
    audience: String,
}

impl TokenService {
    pub fn new(secret: String, issuer: String, audience: String) -> Self {
        Self {
            secret,
            issuer,
            audience,
        }
    }

    pub fn from_secret_manager(secrets: &Arc<SecretManager>) -> Self {
        Self::new(
            secrets.token_secret().to_string(),
            secrets.token_issuer().to_string(),
            secrets.token_audience().to_string(),
        )
    }

    /// Credential lifetime in seconds for the given remember-me choice
    pub fn ttl_seconds(remember_me: bool) -> i64 {
        if remember_me {
            REMEMBER_ME_TTL_SECS
        } else {
            NORMAL_TTL_SECS
        }
    }

    /// Issue a signed credential for the given identity.
    ///
    /// # Returns
    /// The encoded token and its unique token id
    pub fn issue(
        &self,
        username: &str,
        role: &str,
        member_id: i64,
        remember_me: bool,
    ) -> Result<(String, String), InternalError> {
        let now = Utc::now().timestamp();
        let jti = Uuid::new_v4().to_string();

        let claims = AuthClaims {
            sub: username.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: jti.clone(),
            iat: now,
            exp: now + Self::ttl_seconds(remember_me),
            username: username.to_string(),
            role: role.to_string(),
            member_id: member_id.to_string(),
            remember_me: remember_me.to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok((token, jti))
    }

    /// Validate a credential and return its claims.
    ///
    /// Any failure - malformed input, bad signature, wrong issuer or
    /// audience, expiry - comes back as a `TokenError`; callers on the
    /// authorization path degrade to "no identity" instead of surfacing it.
    pub fn validate(&self, token: &str) -> Result<AuthClaims, InternalError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<AuthClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidIssuer => TokenError::invalid("wrong issuer"),
            ErrorKind::InvalidAudience => TokenError::invalid("wrong audience"),
            _ => TokenError::invalid("invalid signature or malformed"),
        })?;

        Ok(token_data.claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> TokenService {
        TokenService::new(
            "test-secret-key-minimum-32-characters-long".to_string(),
            "carbonledger".to_string(),
            "carbonledger-web".to_string(),
        )
    }

    #[test]
    fn issued_token_validates_immediately() {
        let service = test_service();
        let (token, jti) = service.issue("alice", "Manager", 42, false).unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "Manager");
        assert_eq!(claims.member_id(), 42);
        assert!(!claims.remember_me());
        assert_eq!(claims.jti, jti);
    }

    #[test]
    fn normal_token_expires_in_two_hours() {
        let service = test_service();
        let (token, _) = service.issue("alice", "Member", 1, false).unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, NORMAL_TTL_SECS);
    }

    #[test]
    fn remember_me_token_expires_in_seven_days() {
        let service = test_service();
        let (token, _) = service.issue("alice", "Member", 1, true).unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, REMEMBER_ME_TTL_SECS);
        assert!(claims.remember_me());
    }

    #[test]
    fn expired_token_fails_validation() {
        let service = test_service();

        // Hand-craft claims already past expiry, signed with the right key
        let now = Utc::now().timestamp();
        let claims = AuthClaims {
            sub: "alice".to_string(),
            iss: "carbonledger".to_string(),
            aud: "carbonledger-web".to_string(),
            jti: "expired-jti".to_string(),
            iat: now - NORMAL_TTL_SECS - 60,
            exp: now - 60,
            username: "alice".to_string(),
            role: "Member".to_string(),
            member_id: "1".to_string(),
            remember_me: "false".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-secret-key-minimum-32-characters-long".as_bytes()),
        )
        .unwrap();

        let result = service.validate(&token);
        assert!(matches!(
            result,
            Err(InternalError::Token(TokenError::Expired))
        ));
    }

    #[test]
    fn token_signed_with_different_secret_is_rejected() {
        let service = test_service();
        let foreign = TokenService::new(
            "a-completely-different-signing-secret-key".to_string(),
            "carbonledger".to_string(),
            "carbonledger-web".to_string(),
        );

        let (token, _) = foreign.issue("alice", "Admin", 1, false).unwrap();

        assert!(matches!(
            service.validate(&token),
            Err(InternalError::Token(TokenError::Invalid { .. }))
        ));
    }

    #[test]
    fn token_with_wrong_issuer_is_rejected() {
        let service = test_service();
        let other = TokenService::new(
            "test-secret-key-minimum-32-characters-long".to_string(),
            "someone-else".to_string(),
            "carbonledger-web".to_string(),
        );

        let (token, _) = other.issue("alice", "Member", 1, false).unwrap();

        assert!(matches!(
            service.validate(&token),
            Err(InternalError::Token(TokenError::Invalid { .. }))
        ));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let service = test_service();
        assert!(service.validate("not-a-token").is_err());
        assert!(service.validate("").is_err());
    }

    #[test]
    fn debug_does_not_expose_the_secret() {
        let service = test_service();
        let output = format!("{:?}", service);
        assert!(!output.contains("test-secret-key"));
        assert!(output.contains("<redacted>"));
    }
}

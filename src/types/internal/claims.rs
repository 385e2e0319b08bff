use serde::{Deserialize, Serialize};

/// Claims carried by the signed AuthToken cookie.
///
/// The custom `username`/`role`/`member_id`/`remember_me` fields mirror the
/// web client contract and are string-encoded on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Subject (username)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Unique token id
    pub jti: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    pub username: String,
    pub role: String,

    /// String-encoded numeric member id
    pub member_id: String,

    /// String-encoded boolean
    pub remember_me: String,
}

impl AuthClaims {
    /// Numeric member id; a missing or unparseable value resolves to 0
    pub fn member_id(&self) -> i64 {
        self.member_id.trim().parse().unwrap_or(0)
    }

    pub fn remember_me(&self) -> bool {
        self.remember_me.eq_ignore_ascii_case("true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with_member_id(member_id: &str) -> AuthClaims {
        AuthClaims {
            sub: "alice".to_string(),
            iss: "carbonledger".to_string(),
            aud: "carbonledger-web".to_string(),
            jti: "test-jti".to_string(),
            iat: 0,
            exp: 0,
            username: "alice".to_string(),
            role: "Member".to_string(),
            member_id: member_id.to_string(),
            remember_me: "false".to_string(),
        }
    }

    #[test]
    fn member_id_parses_numeric_value() {
        assert_eq!(claims_with_member_id("42").member_id(), 42);
    }

    #[test]
    fn member_id_falls_back_to_zero_when_unparseable() {
        assert_eq!(claims_with_member_id("").member_id(), 0);
        assert_eq!(claims_with_member_id("not-a-number").member_id(), 0);
    }

    #[test]
    fn remember_me_is_case_insensitive() {
        let mut claims = claims_with_member_id("1");
        claims.remember_me = "True".to_string();
        assert!(claims.remember_me());
        claims.remember_me = "false".to_string();
        assert!(!claims.remember_me());
    }
}

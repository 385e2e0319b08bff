use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::errors::InternalError;
use crate::services::{AccessResolver, TokenService};
use crate::stores::{CredentialCheck, CredentialStore, SessionStore};
use crate::types::db::user;
use crate::types::internal::request_meta::RequestMeta;
use crate::types::internal::session::SessionState;

/// Role recorded when a user has no assignments at all
const DEFAULT_ROLE: &str = "Member";

/// Result of a login attempt
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Success(EstablishedLogin),
    InvalidCredentials,
    Locked,
}

/// Everything the API layer needs to answer a successful login
#[derive(Debug, Clone)]
pub struct EstablishedLogin {
    pub session_id: String,
    pub token: String,
    pub username: String,
    pub role: String,
    pub member_id: i64,
    pub remember_me: bool,
    pub expires_in: i64,
}

/// Orchestrates login and logout across the credential store, token service,
/// session store and activity log
pub struct AuthService {
    credential_store: Arc<CredentialStore>,
    resolver: Arc<AccessResolver>,
    tokens: Arc<TokenService>,
    sessions: Arc<SessionStore>,
    audit_logger: Arc<AuditLogger>,
}

impl AuthService {
    pub fn new(
        credential_store: Arc<CredentialStore>,
        resolver: Arc<AccessResolver>,
        tokens: Arc<TokenService>,
        sessions: Arc<SessionStore>,
        audit_logger: Arc<AuditLogger>,
    ) -> Self {
        Self {
            credential_store,
            resolver,
            tokens,
            sessions,
            audit_logger,
        }
    }

    /// Perform a complete login flow with audit logging.
    ///
    /// Lockout and wrong-password outcomes come back as values; only
    /// infrastructure failures surface as errors.
    pub async fn login(
        &self,
        meta: &RequestMeta,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<LoginOutcome, InternalError> {
        let check = self
            .credential_store
            .verify_credentials(username, password)
            .await?;

        let found = match check {
            CredentialCheck::Locked => {
                if let Err(audit_err) = self.audit_logger.log_account_locked(meta, username).await
                {
                    tracing::error!("Failed to log account lockout: {:?}", audit_err);
                }
                return Ok(LoginOutcome::Locked);
            }
            CredentialCheck::Rejected => {
                if let Err(audit_err) = self
                    .audit_logger
                    .log_login_failure(meta, username, "invalid_credentials")
                    .await
                {
                    tracing::error!("Failed to log login failure: {:?}", audit_err);
                }
                return Ok(LoginOutcome::InvalidCredentials);
            }
            CredentialCheck::Valid(found) => found,
        };

        let role = self.session_role_for(&found).await?;
        let (token, token_id) = self.tokens.issue(&found.username, &role, found.id, remember_me)?;
        let expires_in = TokenService::ttl_seconds(remember_me);

        let state = SessionState {
            logged_in: true,
            username: found.username.clone(),
            role: role.clone(),
            member_id: found.id,
            company_id: found.company_id,
        };
        let session_id = self.sessions.insert(state).await;

        if let Err(audit_err) = self
            .audit_logger
            .log_login_success(meta, found.id, &found.username, found.company_id)
            .await
        {
            tracing::error!("Failed to log login success: {:?}", audit_err);
        }

        let issued_at = chrono::Utc::now().timestamp();
        if let Err(audit_err) = self
            .audit_logger
            .log_token_issued(
                meta,
                found.id,
                &found.username,
                &token_id,
                issued_at + expires_in,
                remember_me,
            )
            .await
        {
            tracing::error!("Failed to log token issuance: {:?}", audit_err);
        }

        Ok(LoginOutcome::Success(EstablishedLogin {
            session_id,
            token,
            username: found.username,
            role,
            member_id: found.id,
            remember_me,
            expires_in,
        }))
    }

    /// Destroy the server session, if any
    pub async fn logout(&self, meta: &RequestMeta, session_id: Option<&str>) {
        let Some(id) = session_id else {
            return;
        };

        if let Some(state) = self.sessions.remove(id).await {
            if let Err(audit_err) = self.audit_logger.log_logout(meta, &state).await {
                tracing::error!("Failed to log logout: {:?}", audit_err);
            }
        }
    }

    /// Role recorded in the session and token: the primary company role when
    /// one is set, otherwise the alphabetically first resolved role, else
    /// "Member"
    async fn session_role_for(&self, found: &user::Model) -> Result<String, InternalError> {
        if let Some(primary) = self
            .resolver
            .primary_company_role(found.id)
            .await?
        {
            return Ok(primary);
        }

        let profile = self.resolver.resolve(found.id).await?;
        let role = profile
            .roles
            .into_iter()
            .min()
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());

        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{grant_chain, setup_test_access};

    fn meta() -> RequestMeta {
        RequestMeta::for_system("auth-test")
    }

    #[tokio::test]
    async fn login_with_valid_credentials_creates_a_session_and_token() {
        let fixture = setup_test_access().await;
        let user_id = fixture.add_user_with_password("alice", "correct horse").await;
        grant_chain(
            &fixture.access_store,
            user_id,
            "Manager",
            "ManageUsers",
            "Account Management",
        )
        .await;

        let outcome = fixture
            .auth_service
            .login(&meta(), "alice", "correct horse", false)
            .await
            .unwrap();

        let established = match outcome {
            LoginOutcome::Success(established) => established,
            other => panic!("expected Success, got {:?}", other),
        };

        assert_eq!(established.username, "alice");
        assert_eq!(established.role, "Manager");
        assert_eq!(established.member_id, user_id);
        assert_eq!(established.expires_in, 2 * 60 * 60);

        // The session is live
        let session = fixture
            .session_store
            .get(&established.session_id)
            .await
            .unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.member_id, user_id);

        // The token round-trips through validation
        let claims = fixture.token_service.validate(&established.token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "Manager");
        assert_eq!(claims.member_id(), user_id);
    }

    #[tokio::test]
    async fn login_with_remember_me_issues_a_long_lived_token() {
        let fixture = setup_test_access().await;
        fixture.add_user_with_password("alice", "correct horse").await;

        let outcome = fixture
            .auth_service
            .login(&meta(), "alice", "correct horse", true)
            .await
            .unwrap();

        match outcome {
            LoginOutcome::Success(established) => {
                assert_eq!(established.expires_in, 7 * 24 * 60 * 60);
                assert!(established.remember_me);
            }
            other => panic!("expected Success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn login_without_any_role_falls_back_to_member() {
        let fixture = setup_test_access().await;
        fixture.add_user_with_password("alice", "correct horse").await;

        let outcome = fixture
            .auth_service
            .login(&meta(), "alice", "correct horse", false)
            .await
            .unwrap();

        match outcome {
            LoginOutcome::Success(established) => assert_eq!(established.role, "Member"),
            other => panic!("expected Success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn wrong_password_yields_invalid_credentials() {
        let fixture = setup_test_access().await;
        fixture.add_user_with_password("alice", "correct horse").await;

        let outcome = fixture
            .auth_service
            .login(&meta(), "alice", "wrong", false)
            .await
            .unwrap();

        assert!(matches!(outcome, LoginOutcome::InvalidCredentials));
    }

    #[tokio::test]
    async fn sixth_attempt_reports_locked_not_invalid() {
        let fixture = setup_test_access().await;
        fixture.add_user_with_password("alice", "correct horse").await;

        for _ in 0..5 {
            let outcome = fixture
                .auth_service
                .login(&meta(), "alice", "wrong", false)
                .await
                .unwrap();
            assert!(matches!(outcome, LoginOutcome::InvalidCredentials));
        }

        let outcome = fixture
            .auth_service
            .login(&meta(), "alice", "correct horse", false)
            .await
            .unwrap();

        assert!(matches!(outcome, LoginOutcome::Locked));
    }

    #[tokio::test]
    async fn logout_removes_the_session() {
        let fixture = setup_test_access().await;
        fixture.add_user_with_password("alice", "correct horse").await;

        let outcome = fixture
            .auth_service
            .login(&meta(), "alice", "correct horse", false)
            .await
            .unwrap();
        let established = match outcome {
            LoginOutcome::Success(established) => established,
            other => panic!("expected Success, got {:?}", other),
        };

        fixture
            .auth_service
            .logout(&meta(), Some(&established.session_id))
            .await;

        assert!(fixture
            .session_store
            .get(&established.session_id)
            .await
            .is_none());
    }
}

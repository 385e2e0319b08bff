use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::services::TokenService;
use crate::stores::SessionStore;
use crate::types::internal::request_meta::RequestMeta;
use crate::types::internal::session::SessionState;

/// Result of applying the token to the current session state
#[derive(Debug, Clone, PartialEq)]
pub enum HydrationOutcome {
    /// Session already active, or nothing to hydrate from
    Unchanged,

    /// A valid token produced a fresh authenticated session
    Hydrated {
        session: SessionState,
        token_id: String,
    },

    /// The presented token failed validation; the client must drop it
    DiscardToken,
}

/// Pure hydration step: decide what the presented token means for the current
/// session without touching any store.
///
/// An active session passes through untouched - no token work is performed
/// and a valid session is never downgraded. With no session, a valid token
/// carrying a username and role upgrades the request to an authenticated
/// session; an invalid token is reported for discard so the client stops
/// retrying it.
pub fn hydrate(
    existing: Option<&SessionState>,
    token: Option<&str>,
    tokens: &TokenService,
) -> HydrationOutcome {
    if existing.map(|s| s.logged_in).unwrap_or(false) {
        return HydrationOutcome::Unchanged;
    }

    let Some(raw) = token else {
        return HydrationOutcome::Unchanged;
    };

    match tokens.validate(raw) {
        Ok(claims) if !claims.username.is_empty() && !claims.role.is_empty() => {
            let session = SessionState::authenticated(
                claims.username.clone(),
                claims.role.clone(),
                claims.member_id(),
                None,
            );
            HydrationOutcome::Hydrated {
                session,
                token_id: claims.jti,
            }
        }
        _ => HydrationOutcome::DiscardToken,
    }
}

/// Identity context established for one request
#[derive(Debug, Clone)]
pub struct Continuity {
    pub session: Option<SessionState>,

    /// Session id to present back to the client; newly generated when
    /// hydration created a session
    pub session_id: Option<String>,

    /// The AuthToken cookie must be deleted
    pub discard_token: bool,
}

/// Ensures a working session exists for each inbound request, hydrating it
/// from the AuthToken cookie when absent.
///
/// Runs before the authorization gate on every request (call-site ordering)
/// and never blocks the request itself.
pub struct SessionContinuity {
    sessions: Arc<SessionStore>,
    tokens: Arc<TokenService>,
    audit_logger: Arc<AuditLogger>,
}

impl SessionContinuity {
    pub fn new(
        sessions: Arc<SessionStore>,
        tokens: Arc<TokenService>,
        audit_logger: Arc<AuditLogger>,
    ) -> Self {
        Self {
            sessions,
            tokens,
            audit_logger,
        }
    }

    /// Establish identity context for one request from the presented cookies.
    ///
    /// Applies the pure `hydrate` decision to the session store; audit writes
    /// are best-effort and never block the request.
    pub async fn establish(
        &self,
        session_id: Option<&str>,
        token: Option<&str>,
        meta: &RequestMeta,
    ) -> Continuity {
        let existing = match session_id {
            Some(id) => self.sessions.get(id).await,
            None => None,
        };

        match hydrate(existing.as_ref(), token, &self.tokens) {
            HydrationOutcome::Unchanged => {
                let session_id = existing.as_ref().and(session_id).map(str::to_string);
                Continuity {
                    session: existing,
                    session_id,
                    discard_token: false,
                }
            }
            HydrationOutcome::Hydrated { session, token_id } => {
                let new_id = self.sessions.insert(session.clone()).await;

                if let Err(err) = self
                    .audit_logger
                    .log_session_hydrated(meta, &session, &token_id)
                    .await
                {
                    tracing::error!("Failed to log session hydration: {:?}", err);
                }

                Continuity {
                    session: Some(session),
                    session_id: Some(new_id),
                    discard_token: false,
                }
            }
            HydrationOutcome::DiscardToken => {
                if let Err(err) = self
                    .audit_logger
                    .log_token_validation_failure(meta, "invalid_or_expired")
                    .await
                {
                    tracing::error!("Failed to log token validation failure: {:?}", err);
                }

                Continuity {
                    session: None,
                    session_id: None,
                    discard_token: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tokens() -> TokenService {
        TokenService::new(
            "test-secret-key-minimum-32-characters-long".to_string(),
            "carbonledger".to_string(),
            "carbonledger-web".to_string(),
        )
    }

    #[test]
    fn active_session_passes_through_even_with_a_bad_token() {
        let tokens = test_tokens();
        let session = SessionState::authenticated("alice", "Member", 1, None);

        // No token work is performed for an active session, so garbage is
        // not even inspected
        let outcome = hydrate(Some(&session), Some("garbage"), &tokens);

        assert_eq!(outcome, HydrationOutcome::Unchanged);
    }

    #[test]
    fn no_session_and_no_token_stays_unauthenticated() {
        let tokens = test_tokens();
        assert_eq!(hydrate(None, None, &tokens), HydrationOutcome::Unchanged);
    }

    #[test]
    fn valid_token_hydrates_a_session() {
        let tokens = test_tokens();
        let (token, jti) = tokens.issue("alice", "Manager", 42, true).unwrap();

        let outcome = hydrate(None, Some(&token), &tokens);

        match outcome {
            HydrationOutcome::Hydrated { session, token_id } => {
                assert!(session.logged_in);
                assert_eq!(session.username, "alice");
                assert_eq!(session.role, "Manager");
                assert_eq!(session.member_id, 42);
                assert_eq!(token_id, jti);
            }
            other => panic!("expected Hydrated, got {:?}", other),
        }
    }

    #[test]
    fn invalid_token_is_discarded() {
        let tokens = test_tokens();

        let outcome = hydrate(None, Some("not-a-real-token"), &tokens);

        assert_eq!(outcome, HydrationOutcome::DiscardToken);
    }

    #[test]
    fn token_signed_elsewhere_is_discarded() {
        let tokens = test_tokens();
        let foreign = TokenService::new(
            "a-completely-different-signing-secret-key".to_string(),
            "carbonledger".to_string(),
            "carbonledger-web".to_string(),
        );
        let (token, _) = foreign.issue("alice", "Admin", 1, false).unwrap();

        assert_eq!(
            hydrate(None, Some(&token), &tokens),
            HydrationOutcome::DiscardToken
        );
    }

    #[test]
    fn token_with_empty_role_is_discarded() {
        let tokens = test_tokens();
        let (token, _) = tokens.issue("alice", "", 1, false).unwrap();

        assert_eq!(
            hydrate(None, Some(&token), &tokens),
            HydrationOutcome::DiscardToken
        );
    }

    #[test]
    fn logged_out_marker_session_can_still_be_upgraded() {
        let tokens = test_tokens();
        let stale = SessionState {
            logged_in: false,
            username: String::new(),
            role: String::new(),
            member_id: 0,
            company_id: None,
        };
        let (token, _) = tokens.issue("alice", "Member", 7, false).unwrap();

        match hydrate(Some(&stale), Some(&token), &tokens) {
            HydrationOutcome::Hydrated { session, .. } => {
                assert_eq!(session.username, "alice");
            }
            other => panic!("expected Hydrated, got {:?}", other),
        }
    }
}

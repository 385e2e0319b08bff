use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::services::AccessResolver;
use crate::types::internal::access::{
    AccessDecision, AccessProfile, AccessRequirement, DenialReason,
};
use crate::types::internal::request_meta::RequestMeta;
use crate::types::internal::session::SessionState;

/// Login entry point used as the redirect target for every denial
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Gatekeeper for protected operations.
///
/// Each protected operation declares an `AccessRequirement`; the gate checks
/// it against the session identity, resolving the full role/permission/
/// capability context only when the session fields alone cannot answer. Every
/// denial is recorded to the activity log before the decision is returned;
/// allows are not logged here. If the resolver or its store is unreachable
/// the gate fails closed.
pub struct AuthorizationGate {
    resolver: Arc<AccessResolver>,
    audit_logger: Arc<AuditLogger>,
}

impl AuthorizationGate {
    pub fn new(resolver: Arc<AccessResolver>, audit_logger: Arc<AuditLogger>) -> Self {
        Self {
            resolver,
            audit_logger,
        }
    }

    pub async fn authorize(
        &self,
        session: Option<&SessionState>,
        requirement: &AccessRequirement,
        meta: &RequestMeta,
    ) -> AccessDecision {
        // Step 1: an unauthenticated request is denied outright
        let Some(state) = session.filter(|s| s.is_authenticated()) else {
            return self.deny(None, requirement, meta, DenialReason::NotAuthenticated)
                .await;
        };

        // Resolution is lazy: the session role often answers the role axis
        // without touching the store
        let mut profile: Option<AccessProfile> = None;

        if !requirement.required_roles.is_empty() {
            let session_role_matches = requirement.required_roles.contains(&state.role);

            let passes = if session_role_matches {
                true
            } else {
                match self.load_profile(&mut profile, state.member_id).await {
                    Ok(resolved) => !resolved.roles.is_disjoint(&requirement.required_roles),
                    Err(()) => {
                        return self
                            .deny(
                                Some(state),
                                requirement,
                                meta,
                                DenialReason::DependencyUnavailable,
                            )
                            .await;
                    }
                }
            };

            if !passes {
                return self
                    .deny(Some(state), requirement, meta, DenialReason::MissingRole)
                    .await;
            }
        }

        if !requirement.required_capabilities.is_empty() {
            let passes = match self.load_profile(&mut profile, state.member_id).await {
                Ok(resolved) => !resolved
                    .capabilities
                    .is_disjoint(&requirement.required_capabilities),
                Err(()) => {
                    return self
                        .deny(
                            Some(state),
                            requirement,
                            meta,
                            DenialReason::DependencyUnavailable,
                        )
                        .await;
                }
            };

            if !passes {
                return self
                    .deny(
                        Some(state),
                        requirement,
                        meta,
                        DenialReason::MissingCapability,
                    )
                    .await;
            }
        }

        AccessDecision::Allowed {
            username: state.username.clone(),
            member_id: state.member_id,
        }
    }

    /// Resolve the profile at most once per check. A resolver failure maps to
    /// `Err(())` so callers fail closed.
    async fn load_profile<'a>(
        &self,
        slot: &'a mut Option<AccessProfile>,
        member_id: i64,
    ) -> Result<&'a AccessProfile, ()> {
        if slot.is_none() {
            match self.resolver.resolve(member_id).await {
                Ok(profile) => *slot = Some(profile),
                Err(err) => {
                    tracing::error!("Access resolution failed, denying request: {:?}", err);
                    return Err(());
                }
            }
        }
        match slot {
            Some(profile) => Ok(profile),
            None => Err(()),
        }
    }

    /// Record the denial synchronously, then return the decision. A failed
    /// audit write is logged and swallowed; the deny stands regardless.
    async fn deny(
        &self,
        session: Option<&SessionState>,
        requirement: &AccessRequirement,
        meta: &RequestMeta,
        reason: DenialReason,
    ) -> AccessDecision {
        if let Err(err) = self
            .audit_logger
            .log_access_denied(meta, session, requirement, reason)
            .await
        {
            tracing::error!("Failed to log access denial: {:?}", err);
        }

        AccessDecision::Denied {
            reason,
            redirect_to: LOGIN_PATH.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{grant_chain, setup_test_access};

    fn meta() -> RequestMeta {
        RequestMeta::for_system("gate-test")
    }

    #[tokio::test]
    async fn unauthenticated_request_is_denied_with_redirect() {
        let fixture = setup_test_access().await;

        let decision = fixture
            .gate
            .authorize(None, &AccessRequirement::roles(["Admin"]), &meta())
            .await;

        match decision {
            AccessDecision::Denied {
                reason,
                redirect_to,
            } => {
                assert_eq!(reason, DenialReason::NotAuthenticated);
                assert_eq!(redirect_to, LOGIN_PATH);
            }
            other => panic!("expected Denied, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn session_without_logged_in_flag_is_denied() {
        let fixture = setup_test_access().await;
        let stale = SessionState {
            logged_in: false,
            username: "alice".to_string(),
            role: "Admin".to_string(),
            member_id: 1,
            company_id: None,
        };

        let decision = fixture
            .gate
            .authorize(Some(&stale), &AccessRequirement::roles(["Admin"]), &meta())
            .await;

        assert!(!decision.is_allowed());
    }

    #[tokio::test]
    async fn unrestricted_requirement_allows_any_authenticated_session() {
        let fixture = setup_test_access().await;
        let user_id = fixture.add_user("alice").await;
        let session = SessionState::authenticated("alice", "Member", user_id, None);

        let decision = fixture
            .gate
            .authorize(Some(&session), &AccessRequirement::authenticated(), &meta())
            .await;

        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn session_role_satisfies_the_role_axis_without_resolution() {
        let fixture = setup_test_access().await;
        // member_id 999_999 has no assignments; only the session role matches
        let session = SessionState::authenticated("alice", "Admin", 999_999, None);

        let decision = fixture
            .gate
            .authorize(Some(&session), &AccessRequirement::roles(["Admin"]), &meta())
            .await;

        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn resolved_role_satisfies_the_role_axis_when_session_role_does_not() {
        let fixture = setup_test_access().await;
        let user_id = fixture.add_user("alice").await;
        grant_chain(
            &fixture.access_store,
            user_id,
            "Manager",
            "ManageUsers",
            "Account Management",
        )
        .await;
        let session = SessionState::authenticated("alice", "Member", user_id, None);

        let decision = fixture
            .gate
            .authorize(
                Some(&session),
                &AccessRequirement::roles(["Manager"]),
                &meta(),
            )
            .await;

        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn missing_role_is_denied() {
        let fixture = setup_test_access().await;
        let user_id = fixture.add_user("alice").await;
        let session = SessionState::authenticated("alice", "Member", user_id, None);

        let decision = fixture
            .gate
            .authorize(Some(&session), &AccessRequirement::roles(["Admin"]), &meta())
            .await;

        match decision {
            AccessDecision::Denied { reason, .. } => {
                assert_eq!(reason, DenialReason::MissingRole);
            }
            other => panic!("expected Denied, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn capability_axis_requires_resolution() {
        let fixture = setup_test_access().await;
        let user_id = fixture.add_user("alice").await;
        grant_chain(
            &fixture.access_store,
            user_id,
            "Manager",
            "ManageUsers",
            "Account Management",
        )
        .await;
        let session = SessionState::authenticated("alice", "Manager", user_id, None);

        let allowed = fixture
            .gate
            .authorize(
                Some(&session),
                &AccessRequirement::capabilities(["Account Management"]),
                &meta(),
            )
            .await;
        assert!(allowed.is_allowed());

        let denied = fixture
            .gate
            .authorize(
                Some(&session),
                &AccessRequirement::capabilities(["Report Export"]),
                &meta(),
            )
            .await;
        match denied {
            AccessDecision::Denied { reason, .. } => {
                assert_eq!(reason, DenialReason::MissingCapability);
            }
            other => panic!("expected Denied, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn both_axes_must_pass_when_both_are_declared() {
        let fixture = setup_test_access().await;
        let user_id = fixture.add_user("alice").await;
        grant_chain(
            &fixture.access_store,
            user_id,
            "Manager",
            "ManageUsers",
            "Account Management",
        )
        .await;
        let session = SessionState::authenticated("alice", "Manager", user_id, None);

        let requirement = AccessRequirement::roles(["Manager"])
            .and_capabilities(["Report Export"]);

        let decision = fixture
            .gate
            .authorize(Some(&session), &requirement, &meta())
            .await;

        assert!(!decision.is_allowed());
    }
}

// End-to-end flows across login, resolution and the authorization gate

mod common;

use common::setup_test_app;

use carbonledger_backend::services::LoginOutcome;
use carbonledger_backend::types::internal::access::{
    AccessDecision, AccessRequirement, DenialReason,
};
use carbonledger_backend::types::internal::request_meta::RequestMeta;
use carbonledger_backend::types::internal::session::SessionState;

fn meta() -> RequestMeta {
    RequestMeta::for_system("integration-test")
}

#[tokio::test]
async fn company_scoped_manager_reaches_account_management() {
    let app = setup_test_app().await;

    // User U holds Manager in Company A; Manager -> ManageUsers -> Account
    // Management
    let user_id = app.add_user("ursula", "pass-for-ursula").await;
    let company = app
        .access_store
        .create_company("Acme Corp".to_string())
        .await
        .unwrap();
    let role = app
        .access_store
        .create_role("Manager".to_string(), None)
        .await
        .unwrap();
    let permission = app
        .access_store
        .create_permission("ManageUsers".to_string(), None)
        .await
        .unwrap();
    let capability = app
        .access_store
        .create_capability("Account Management".to_string(), None)
        .await
        .unwrap();
    app.access_store
        .link_role_permission(role.id, permission.id)
        .await
        .unwrap();
    app.access_store
        .link_permission_capability(permission.id, capability.id)
        .await
        .unwrap();
    app.access_store
        .assign_company_role(user_id, company.id, role.id, true, None)
        .await
        .unwrap();

    // Active session for U
    let outcome = app
        .auth_service
        .login(&meta(), "ursula", "pass-for-ursula", false)
        .await
        .unwrap();
    let established = match outcome {
        LoginOutcome::Success(established) => established,
        other => panic!("expected Success, got {:?}", other),
    };
    assert_eq!(established.role, "Manager");

    let session = app
        .session_store
        .get(&established.session_id)
        .await
        .unwrap();
    let requirement = AccessRequirement::capabilities(["Account Management"]);

    let decision = app
        .gate
        .authorize(Some(&session), &requirement, &meta())
        .await;
    assert!(decision.is_allowed());

    // Removing the company-scoped assignment and re-resolving denies it
    app.access_store
        .revoke_company_role(user_id, company.id, role.id)
        .await
        .unwrap();

    let decision = app
        .gate
        .authorize(Some(&session), &requirement, &meta())
        .await;
    match decision {
        AccessDecision::Denied { reason, .. } => {
            assert_eq!(reason, DenialReason::MissingCapability);
        }
        other => panic!("expected Denied, got {:?}", other),
    }
}

#[tokio::test]
async fn user_with_no_assignments_is_denied_on_every_gated_axis() {
    let app = setup_test_app().await;
    let user_id = app.add_user("loner", "pass-for-loner").await;

    let profile = app.resolver.resolve(user_id).await.unwrap();
    assert!(profile.roles.is_empty());
    assert!(profile.permissions.is_empty());
    assert!(profile.capabilities.is_empty());

    let session = SessionState::authenticated("loner", "Member", user_id, None);

    let by_role = app
        .gate
        .authorize(
            Some(&session),
            &AccessRequirement::roles(["Admin"]),
            &meta(),
        )
        .await;
    assert!(!by_role.is_allowed());

    let by_capability = app
        .gate
        .authorize(
            Some(&session),
            &AccessRequirement::capabilities(["Account Management"]),
            &meta(),
        )
        .await;
    assert!(!by_capability.is_allowed());
}

#[tokio::test]
async fn five_failures_lock_alice_until_the_window_elapses() {
    let app = setup_test_app().await;
    app.add_user("alice", "correct-password").await;

    // Five consecutive failures within the window
    for _ in 0..5 {
        let outcome = app
            .auth_service
            .login(&meta(), "alice", "wrong-password", false)
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::InvalidCredentials));
    }

    // Sixth attempt with the correct password reports Locked, not a
    // password mismatch
    let outcome = app
        .auth_service
        .login(&meta(), "alice", "correct-password", false)
        .await
        .unwrap();
    assert!(matches!(outcome, LoginOutcome::Locked));
}

#[tokio::test]
async fn monotonic_add_and_remove_through_the_grant_chain() {
    let app = setup_test_app().await;
    let user_id = app.add_user("rita", "pass-for-rita").await;

    let role = app
        .access_store
        .create_role("Auditor".to_string(), None)
        .await
        .unwrap();
    let permission = app
        .access_store
        .create_permission("ManageReports".to_string(), None)
        .await
        .unwrap();
    let capability = app
        .access_store
        .create_capability("Report Export".to_string(), None)
        .await
        .unwrap();

    app.access_store
        .assign_user_role(user_id, role.id)
        .await
        .unwrap();
    app.access_store
        .link_role_permission(role.id, permission.id)
        .await
        .unwrap();
    app.access_store
        .link_permission_capability(permission.id, capability.id)
        .await
        .unwrap();

    assert!(app
        .resolver
        .user_has_capability(user_id, "Report Export")
        .await
        .unwrap());

    app.access_store
        .unlink_role_permission(role.id, permission.id)
        .await
        .unwrap();

    assert!(!app
        .resolver
        .user_has_capability(user_id, "Report Export")
        .await
        .unwrap());

    // Relinking restores the grant
    app.access_store
        .link_role_permission(role.id, permission.id)
        .await
        .unwrap();

    assert!(app
        .resolver
        .user_has_capability(user_id, "Report Export")
        .await
        .unwrap());
}

#[tokio::test]
async fn anonymous_request_is_denied_and_redirected() {
    let app = setup_test_app().await;

    let decision = app
        .gate
        .authorize(
            None,
            &AccessRequirement::capabilities(["Account Management"]),
            &meta(),
        )
        .await;

    match decision {
        AccessDecision::Denied {
            reason,
            redirect_to,
        } => {
            assert_eq!(reason, DenialReason::NotAuthenticated);
            assert!(redirect_to.ends_with("/auth/login"));
        }
        other => panic!("expected Denied, got {:?}", other),
    }
}

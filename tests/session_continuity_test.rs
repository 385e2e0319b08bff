// Token-based session continuity across a simulated server restart

mod common;

use common::setup_test_app;

use carbonledger_backend::services::{LoginOutcome, TokenService};
use carbonledger_backend::types::internal::request_meta::RequestMeta;

fn meta() -> RequestMeta {
    RequestMeta::for_system("continuity-test")
}

#[tokio::test]
async fn token_rehydrates_a_session_after_the_server_side_session_is_gone() {
    let app = setup_test_app().await;
    let user_id = app.add_user("carol", "pass-for-carol").await;

    let outcome = app
        .auth_service
        .login(&meta(), "carol", "pass-for-carol", true)
        .await
        .unwrap();
    let established = match outcome {
        LoginOutcome::Success(established) => established,
        other => panic!("expected Success, got {:?}", other),
    };

    // Server-side session disappears (restart, eviction)
    app.session_store.remove(&established.session_id).await;

    let continuity = app
        .continuity
        .establish(
            Some(&established.session_id),
            Some(&established.token),
            &meta(),
        )
        .await;

    let session = continuity.session.expect("expected a hydrated session");
    assert!(session.is_authenticated());
    assert_eq!(session.username, "carol");
    assert_eq!(session.member_id, user_id);
    assert!(!continuity.discard_token);

    // The hydrated session is live in the store under the new id
    let new_id = continuity.session_id.expect("expected a new session id");
    assert_ne!(new_id, established.session_id);
    assert!(app.session_store.get(&new_id).await.is_some());
}

#[tokio::test]
async fn active_session_wins_over_any_token() {
    let app = setup_test_app().await;
    app.add_user("carol", "pass-for-carol").await;

    let outcome = app
        .auth_service
        .login(&meta(), "carol", "pass-for-carol", false)
        .await
        .unwrap();
    let established = match outcome {
        LoginOutcome::Success(established) => established,
        other => panic!("expected Success, got {:?}", other),
    };

    // Even a garbage token does not disturb the active session
    let continuity = app
        .continuity
        .establish(Some(&established.session_id), Some("garbage"), &meta())
        .await;

    assert!(!continuity.discard_token);
    assert_eq!(
        continuity.session_id.as_deref(),
        Some(established.session_id.as_str())
    );
    assert_eq!(
        continuity.session.map(|s| s.username),
        Some("carol".to_string())
    );
}

#[tokio::test]
async fn invalid_token_without_a_session_is_discarded() {
    let app = setup_test_app().await;

    let continuity = app
        .continuity
        .establish(None, Some("not-a-real-token"), &meta())
        .await;

    assert!(continuity.session.is_none());
    assert!(continuity.discard_token);
}

#[tokio::test]
async fn token_from_a_foreign_signer_is_discarded() {
    let app = setup_test_app().await;

    let foreign = TokenService::new(
        "a-completely-different-signing-secret-key".to_string(),
        "carbonledger".to_string(),
        "carbonledger-web".to_string(),
    );
    let (token, _) = foreign.issue("mallory", "Admin", 1, true).unwrap();

    let continuity = app.continuity.establish(None, Some(&token), &meta()).await;

    assert!(continuity.session.is_none());
    assert!(continuity.discard_token);
}

#[tokio::test]
async fn no_session_and_no_token_proceeds_unauthenticated() {
    let app = setup_test_app().await;

    let continuity = app.continuity.establish(None, None, &meta()).await;

    assert!(continuity.session.is_none());
    assert!(continuity.session_id.is_none());
    assert!(!continuity.discard_token);
}

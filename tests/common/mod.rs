// Shared setup for integration tests

use std::sync::Arc;

use migration::{AccessMigrator, AuditMigrator, MigratorTrait};
use sea_orm::Database;

use carbonledger_backend::audit::AuditLogger;
use carbonledger_backend::services::{
    AccessResolver, AuthService, AuthorizationGate, SessionContinuity, TokenService,
};
use carbonledger_backend::stores::{AccessStore, AuditStore, CredentialStore, SessionStore};

pub const TEST_TOKEN_SECRET: &str = "test-secret-key-minimum-32-characters-long";

pub struct TestApp {
    pub access_store: Arc<AccessStore>,
    pub credential_store: Arc<CredentialStore>,
    pub session_store: Arc<SessionStore>,
    pub token_service: Arc<TokenService>,
    pub resolver: Arc<AccessResolver>,
    pub gate: Arc<AuthorizationGate>,
    pub continuity: Arc<SessionContinuity>,
    pub auth_service: Arc<AuthService>,
}

impl TestApp {
    pub async fn add_user(&self, username: &str, password: &str) -> i64 {
        self.credential_store
            .add_user(
                username.to_string(),
                format!("{}@example.com", username),
                password.to_string(),
                None,
            )
            .await
            .expect("Failed to create test user")
    }
}

pub async fn setup_test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    AccessMigrator::up(&db, None)
        .await
        .expect("Failed to run access migrations");

    let audit_db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit test database");
    AuditMigrator::up(&audit_db, None)
        .await
        .expect("Failed to run audit migrations");

    let audit_store = Arc::new(AuditStore::new(audit_db));
    let audit_logger = Arc::new(AuditLogger::new(audit_store));

    let access_store = Arc::new(AccessStore::new(db.clone()));
    let credential_store = Arc::new(CredentialStore::new(
        db,
        "test-pepper-for-integration-tests".to_string(),
    ));
    let session_store = Arc::new(SessionStore::new());

    let token_service = Arc::new(TokenService::new(
        TEST_TOKEN_SECRET.to_string(),
        "carbonledger".to_string(),
        "carbonledger-web".to_string(),
    ));

    let resolver = Arc::new(AccessResolver::new(access_store.clone()));
    let gate = Arc::new(AuthorizationGate::new(
        resolver.clone(),
        audit_logger.clone(),
    ));
    let continuity = Arc::new(SessionContinuity::new(
        session_store.clone(),
        token_service.clone(),
        audit_logger.clone(),
    ));
    let auth_service = Arc::new(AuthService::new(
        credential_store.clone(),
        resolver.clone(),
        token_service.clone(),
        session_store.clone(),
        audit_logger.clone(),
    ));

    TestApp {
        access_store,
        credential_store,
        session_store,
        token_service,
        resolver,
        gate,
        continuity,
        auth_service,
    }
}

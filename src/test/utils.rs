// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::Arc;

use migration::{AccessMigrator, AuditMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::audit::AuditLogger;
use crate::services::{
    AccessResolver, AuthService, AuthorizationGate, SessionContinuity, TokenService,
};
use crate::stores::{AccessStore, AuditStore, CredentialStore, SessionStore};

pub const TEST_TOKEN_SECRET: &str = "test-secret-key-minimum-32-characters-long";
pub const TEST_PEPPER: &str = "test-pepper-for-unit-tests";

/// Create migrated in-memory databases for the access schema and the audit
/// schema
pub async fn setup_test_databases() -> (DatabaseConnection, DatabaseConnection) {
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

    (db, audit_db)
}

/// Fully wired access-control fixture over in-memory databases.
///
/// Callers use the pieces they need and ignore the rest.
pub struct TestAccess {
    pub db: DatabaseConnection,
    pub audit_db: DatabaseConnection,
    pub access_store: Arc<AccessStore>,
    pub credential_store: Arc<CredentialStore>,
    pub audit_store: Arc<AuditStore>,
    pub audit_logger: Arc<AuditLogger>,
    pub session_store: Arc<SessionStore>,
    pub token_service: Arc<TokenService>,
    pub resolver: Arc<AccessResolver>,
    pub gate: Arc<AuthorizationGate>,
    pub continuity: Arc<SessionContinuity>,
    pub auth_service: Arc<AuthService>,
}

impl TestAccess {
    /// Add a user with a throwaway password, returning its id
    pub async fn add_user(&self, username: &str) -> i64 {
        self.add_user_with_password(username, "test-password").await
    }

    pub async fn add_user_with_password(&self, username: &str, password: &str) -> i64 {
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

pub async fn setup_test_access() -> TestAccess {
    let (db, audit_db) = setup_test_databases().await;

    let audit_store = Arc::new(AuditStore::new(audit_db.clone()));
    let audit_logger = Arc::new(AuditLogger::new(audit_store.clone()));

    let access_store = Arc::new(AccessStore::new(db.clone()));
    let credential_store = Arc::new(CredentialStore::new(db.clone(), TEST_PEPPER.to_string()));
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

    TestAccess {
        db,
        audit_db,
        access_store,
        credential_store,
        audit_store,
        audit_logger,
        session_store,
        token_service,
        resolver,
        gate,
        continuity,
        auth_service,
    }
}

/// Ids created by `grant_chain`
pub struct GrantedChain {
    pub role_id: i64,
    pub permission_id: i64,
    pub capability_id: i64,
}

/// Wire up user -> role -> permission -> capability in one call
pub async fn grant_chain(
    access_store: &Arc<AccessStore>,
    user_id: i64,
    role_name: &str,
    permission_key: &str,
    capability_name: &str,
) -> GrantedChain {
    let role = access_store
        .create_role(role_name.to_string(), None)
        .await
        .expect("Failed to create role");
    let permission = access_store
        .create_permission(permission_key.to_string(), None)
        .await
        .expect("Failed to create permission");
    let capability = access_store
        .create_capability(capability_name.to_string(), None)
        .await
        .expect("Failed to create capability");

    access_store
        .assign_user_role(user_id, role.id)
        .await
        .expect("Failed to assign role");
    access_store
        .link_role_permission(role.id, permission.id)
        .await
        .expect("Failed to link role permission");
    access_store
        .link_permission_capability(permission.id, capability.id)
        .await
        .expect("Failed to link permission capability");

    GrantedChain {
        role_id: role.id,
        permission_id: permission.id,
        capability_id: capability.id,
    }
}

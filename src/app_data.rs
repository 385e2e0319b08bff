use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::config::{DatabaseConnections, SecretManager};
use crate::services::{
    AccessResolver, AuthService, AuthorizationGate, SessionContinuity, TokenService,
};
use crate::stores::{AccessStore, AuditStore, CredentialStore, SessionStore};

/// Centralized application data following the main-owned stores pattern.
///
/// All dependencies are created once at startup and shared across the API
/// layer; construction order matters only in that the audit store comes first
/// because everything else logs through it.
pub struct AppData {
    pub connections: DatabaseConnections,
    pub secret_manager: Arc<SecretManager>,
    pub audit_store: Arc<AuditStore>,
    pub audit_logger: Arc<AuditLogger>,
    pub access_store: Arc<AccessStore>,
    pub credential_store: Arc<CredentialStore>,
    pub session_store: Arc<SessionStore>,
    pub token_service: Arc<TokenService>,
    pub resolver: Arc<AccessResolver>,
    pub gate: Arc<AuthorizationGate>,
    pub continuity: Arc<SessionContinuity>,
    pub auth_service: Arc<AuthService>,
}

impl AppData {
    /// Initialize all application data.
    ///
    /// Database connections should be connected and migrated before calling
    /// this.
    pub fn init(connections: DatabaseConnections, secret_manager: Arc<SecretManager>) -> Self {
        tracing::info!("Initializing AppData...");

        let audit_store = Arc::new(AuditStore::new(connections.audit.clone()));
        let audit_logger = Arc::new(AuditLogger::new(audit_store.clone()));

        let access_store = Arc::new(AccessStore::new(connections.primary.clone()));
        let credential_store = Arc::new(CredentialStore::new(
            connections.primary.clone(),
            secret_manager.password_pepper().to_string(),
        ));
        let session_store = Arc::new(SessionStore::new());

        let token_service = Arc::new(TokenService::from_secret_manager(&secret_manager));

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

        tracing::info!("AppData initialization complete");

        Self {
            connections,
            secret_manager,
            audit_store,
            audit_logger,
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
}

use std::sync::Arc;

use crate::audit::AuditBuilder;
use crate::errors::InternalError;
use crate::stores::AuditStore;
use crate::types::internal::access::{AccessRequirement, DenialReason};
use crate::types::internal::audit::{EventType, Outcome};
use crate::types::internal::request_meta::RequestMeta;
use crate::types::internal::session::SessionState;

/// Front end for activity logging.
///
/// One method per event; all callers treat a failed write as non-fatal and
/// log it through tracing instead.
pub struct AuditLogger {
    pub audit_store: Arc<AuditStore>,
}

impl AuditLogger {
    pub fn new(audit_store: Arc<AuditStore>) -> Self {
        Self { audit_store }
    }

    /// Create an AuditBuilder for custom events
    pub fn builder(&self, action: impl Into<EventType>, outcome: Outcome) -> AuditBuilder {
        AuditBuilder::new(self.audit_store.clone(), action, outcome)
    }

    pub async fn log_login_success(
        &self,
        meta: &RequestMeta,
        user_id: i64,
        username: &str,
        company_id: Option<i64>,
    ) -> Result<(), InternalError> {
        self.builder(EventType::LoginSuccess, Outcome::Success)
            .with_meta(meta)
            .actor(user_id, username)
            .company(company_id)
            .write()
            .await
    }

    /// Login failure. No user id is asserted; the attempted username is kept
    /// in the details so probing patterns stay visible.
    pub async fn log_login_failure(
        &self,
        meta: &RequestMeta,
        username: &str,
        reason: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::LoginFailure, Outcome::Failure)
            .with_meta(meta)
            .actor_label("anonymous")
            .add_field("attempted_username", username)
            .add_field("reason", reason)
            .write()
            .await
    }

    pub async fn log_account_locked(
        &self,
        meta: &RequestMeta,
        username: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::AccountLocked, Outcome::Failure)
            .with_meta(meta)
            .actor_label("anonymous")
            .add_field("attempted_username", username)
            .write()
            .await
    }

    pub async fn log_lockout_reset(
        &self,
        meta: &RequestMeta,
        actor_user_id: i64,
        actor_username: &str,
        target_user_id: i64,
    ) -> Result<(), InternalError> {
        self.builder(EventType::LockoutReset, Outcome::Success)
            .with_meta(meta)
            .actor(actor_user_id, actor_username)
            .add_field("target_user_id", target_user_id)
            .write()
            .await
    }

    pub async fn log_logout(
        &self,
        meta: &RequestMeta,
        session: &SessionState,
    ) -> Result<(), InternalError> {
        self.builder(EventType::Logout, Outcome::Success)
            .with_meta(meta)
            .actor(session.member_id, &session.username)
            .company(session.company_id)
            .write()
            .await
    }

    pub async fn log_token_issued(
        &self,
        meta: &RequestMeta,
        user_id: i64,
        username: &str,
        token_id: &str,
        expires_at: i64,
        remember_me: bool,
    ) -> Result<(), InternalError> {
        self.builder(EventType::TokenIssued, Outcome::Success)
            .with_meta(meta)
            .actor(user_id, username)
            .add_field("token_id", token_id)
            .add_field("expires_at", expires_at)
            .add_field("remember_me", remember_me)
            .write()
            .await
    }

    pub async fn log_token_validation_failure(
        &self,
        meta: &RequestMeta,
        reason: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::TokenValidationFailure, Outcome::Failure)
            .with_meta(meta)
            .actor_label("anonymous")
            .add_field("reason", reason)
            .write()
            .await
    }

    pub async fn log_session_hydrated(
        &self,
        meta: &RequestMeta,
        session: &SessionState,
        token_id: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::SessionHydrated, Outcome::Success)
            .with_meta(meta)
            .actor(session.member_id, &session.username)
            .company(session.company_id)
            .add_field("token_id", token_id)
            .write()
            .await
    }

    /// Authorization denial.
    ///
    /// Uses the session identity when known; otherwise the entry carries the
    /// "anonymous" marker and a masked client IP instead of the raw address.
    pub async fn log_access_denied(
        &self,
        meta: &RequestMeta,
        session: Option<&SessionState>,
        requirement: &AccessRequirement,
        reason: DenialReason,
    ) -> Result<(), InternalError> {
        let mut required_roles: Vec<&str> = requirement
            .required_roles
            .iter()
            .map(String::as_str)
            .collect();
        required_roles.sort_unstable();

        let mut required_capabilities: Vec<&str> = requirement
            .required_capabilities
            .iter()
            .map(String::as_str)
            .collect();
        required_capabilities.sort_unstable();

        let builder = self
            .builder(EventType::AccessDenied, Outcome::Denied)
            .with_meta(meta)
            .add_field("reason", reason.as_str())
            .add_field("required_roles", &required_roles)
            .add_field("required_capabilities", &required_capabilities);

        let builder = match session.filter(|s| s.is_authenticated()) {
            Some(state) => builder
                .actor(state.member_id, &state.username)
                .company(state.company_id),
            None => builder.actor_label("anonymous").ip_address(meta.masked_ip()),
        };

        builder.write().await
    }

    pub async fn log_assignment_changed(
        &self,
        meta: &RequestMeta,
        action: EventType,
        actor_user_id: i64,
        actor_username: &str,
        details: &[(&str, i64)],
    ) -> Result<(), InternalError> {
        let mut builder = self
            .builder(action, Outcome::Success)
            .with_meta(meta)
            .actor(actor_user_id, actor_username);

        for (key, value) in details {
            builder = builder.add_field(*key, value);
        }

        builder.write().await
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::errors::InternalError;
use crate::stores::AuditStore;
use crate::types::internal::audit::{AuditEvent, EventType, Outcome};
use crate::types::internal::request_meta::RequestMeta;

/// Builder for activity log entries.
///
/// Fluent construction with automatic hashing for sensitive fields; used by
/// `AuditLogger` internally and available for custom events.
pub struct AuditBuilder {
    action: EventType,
    outcome: Outcome,
    actor_user_id: Option<i64>,
    actor_company_id: Option<i64>,
    actor_label: Option<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    correlation_id: Option<String>,
    data: HashMap<String, serde_json::Value>,
    store: Arc<AuditStore>,
}

impl AuditBuilder {
    pub fn new(store: Arc<AuditStore>, action: impl Into<EventType>, outcome: Outcome) -> Self {
        Self {
            action: action.into(),
            outcome,
            actor_user_id: None,
            actor_company_id: None,
            actor_label: None,
            ip_address: None,
            user_agent: None,
            correlation_id: None,
            data: HashMap::new(),
            store,
        }
    }

    /// Populate ip/user-agent/correlation fields from request metadata
    pub fn with_meta(mut self, meta: &RequestMeta) -> Self {
        self.ip_address = meta.ip_address.map(|ip| ip.to_string());
        self.user_agent = meta.user_agent.clone();
        self.correlation_id = Some(meta.correlation_id.clone());
        self
    }

    /// Record the acting user
    pub fn actor(mut self, user_id: i64, label: impl Into<String>) -> Self {
        self.actor_user_id = Some(user_id);
        self.actor_label = Some(label.into());
        self
    }

    /// Record an actor by label only (e.g. "anonymous" or a username that
    /// could not be resolved to an id)
    pub fn actor_label(mut self, label: impl Into<String>) -> Self {
        self.actor_label = Some(label.into());
        self
    }

    pub fn company(mut self, company_id: Option<i64>) -> Self {
        self.actor_company_id = company_id;
        self
    }

    /// Override the stored IP, used for masked anonymous records
    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Add an arbitrary field to the entry's JSON details
    pub fn add_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.data.insert(key.into(), json_value);
        }
        self
    }

    /// Add a sensitive field hashed with SHA-256.
    ///
    /// Same input always produces the same hash, so entries stay correlatable
    /// without exposing the original value.
    pub fn add_sensitive(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(&value) {
            let mut hasher = Sha256::new();
            hasher.update(json_value.to_string().as_bytes());
            let hash_hex = format!("sha256:{:x}", hasher.finalize());
            self.data.insert(key.into(), json!(hash_hex));
        }
        self
    }

    /// Build the entry without writing it
    pub fn build(self) -> AuditEvent {
        let mut event = AuditEvent::new(self.action, self.outcome);
        event.actor_user_id = self.actor_user_id;
        event.actor_company_id = self.actor_company_id;
        if let Some(label) = self.actor_label {
            event.actor_label = label;
        }
        event.ip_address = self.ip_address;
        event.user_agent = self.user_agent;
        if let Some(correlation_id) = self.correlation_id {
            event.correlation_id = correlation_id;
        }
        event.data = self.data;
        event
    }

    /// Build the entry and append it to the activity log
    pub async fn write(self) -> Result<(), InternalError> {
        let store = self.store.clone();
        let event = self.build();
        store.write_event(event).await
    }
}

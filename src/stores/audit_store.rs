use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::errors::internal::AuditError;
use crate::errors::InternalError;
use crate::types::db::activity_log;
use crate::types::internal::audit::AuditEvent;

/// Label recorded in the created_by column for core-originated entries
const CREATED_BY: &str = "carbonledger-core";

/// Repository for the append-only activity log.
///
/// Insert-only: the core never updates or deletes rows here.
pub struct AuditStore {
    db: DatabaseConnection,
}

impl AuditStore {
    /// Create a new AuditStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append one activity log entry.
    ///
    /// # Errors
    /// Returns `InternalError` if serialization or the database insert fails
    pub async fn write_event(&self, event: AuditEvent) -> Result<(), InternalError> {
        let details = serde_json::to_string(&event.data).map_err(AuditError::Serialization)?;

        let entry = activity_log::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            timestamp: Set(Utc::now().to_rfc3339()),
            action: Set(event.action.to_string()),
            category: Set(event.action.category().to_string()),
            outcome: Set(event.outcome.to_string()),
            actor_user_id: Set(event.actor_user_id),
            actor_company_id: Set(event.actor_company_id),
            actor_label: Set(event.actor_label),
            ip_address: Set(event.ip_address),
            user_agent: Set(event.user_agent),
            correlation_id: Set(event.correlation_id),
            details: Set(details),
            created_by: Set(CREATED_BY.to_string()),
        };

        entry
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("write activity log entry", e))?;

        Ok(())
    }
}

impl std::fmt::Debug for AuditStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditStore")
            .field("db", &"<connection>")
            .finish()
    }
}

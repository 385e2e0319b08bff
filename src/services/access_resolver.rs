use std::sync::Arc;

use crate::errors::InternalError;
use crate::stores::AccessStore;
use crate::types::internal::access::AccessProfile;

/// Computes a user's effective role/permission/capability sets.
///
/// Resolution walks the join graph with batched queries: global and active
/// company-scoped role assignments are unioned into one role set, then
/// permissions are unioned per role and capabilities per permission. A user
/// with no assignments - or a user id that does not exist - resolves to empty
/// sets rather than an error.
pub struct AccessResolver {
    access_store: Arc<AccessStore>,
}

impl AccessResolver {
    pub fn new(access_store: Arc<AccessStore>) -> Self {
        Self { access_store }
    }

    pub async fn resolve(&self, user_id: i64) -> Result<AccessProfile, InternalError> {
        let role_ids = self.access_store.role_ids_for_user(user_id).await?;
        if role_ids.is_empty() {
            return Ok(AccessProfile::default());
        }

        let roles = self.access_store.role_names(&role_ids).await?;
        let (permission_ids, permissions) =
            self.access_store.permissions_for_roles(&role_ids).await?;
        let capabilities = self
            .access_store
            .capabilities_for_permissions(&permission_ids)
            .await?;

        Ok(AccessProfile {
            roles,
            permissions,
            capabilities,
        })
    }

    /// Role name from the user's primary active company assignment, if any
    pub async fn primary_company_role(
        &self,
        user_id: i64,
    ) -> Result<Option<String>, InternalError> {
        self.access_store.primary_company_role(user_id).await
    }

    /// Membership test against a fresh resolution; no shared cache
    pub async fn user_has_permission(
        &self,
        user_id: i64,
        permission_key: &str,
    ) -> Result<bool, InternalError> {
        let profile = self.resolve(user_id).await?;
        Ok(profile.permissions.contains(permission_key))
    }

    /// Membership test against a fresh resolution; no shared cache
    pub async fn user_has_capability(
        &self,
        user_id: i64,
        capability_name: &str,
    ) -> Result<bool, InternalError> {
        let profile = self.resolve(user_id).await?;
        Ok(profile.capabilities.contains(capability_name))
    }

    /// True when either supplied criterion matches. A criterion that is not
    /// supplied is skipped, never auto-satisfied; with neither supplied the
    /// answer is false.
    pub async fn user_has_permission_or_capability(
        &self,
        user_id: i64,
        permission_key: Option<&str>,
        capability_name: Option<&str>,
    ) -> Result<bool, InternalError> {
        let profile = self.resolve(user_id).await?;

        if let Some(key) = permission_key {
            if profile.permissions.contains(key) {
                return Ok(true);
            }
        }

        if let Some(name) = capability_name {
            if profile.capabilities.contains(name) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

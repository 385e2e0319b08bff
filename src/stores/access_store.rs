use std::collections::HashSet;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::errors::internal::AccessError;
use crate::errors::InternalError;
use crate::types::db::{
    capability, company, permission, permission_capability, role, role_permission, user,
    user_company_role::{self, STATUS_ACTIVE, STATUS_REVOKED},
    user_role,
};

/// Repository for the role/permission/capability graph.
///
/// Reads are expressed as explicit batched queries over the join tables; the
/// resolver stitches them together without any ORM-level graph traversal.
pub struct AccessStore {
    db: DatabaseConnection,
}

impl AccessStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // --- graph reads ---

    /// Union of role ids from global assignments and active company-scoped
    /// assignments. Company-scoped roles contribute identically to global
    /// ones; no company isolation is applied here.
    pub async fn role_ids_for_user(&self, user_id: i64) -> Result<HashSet<i64>, InternalError> {
        let direct = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("load user roles", e))?;

        let scoped = user_company_role::Entity::find()
            .filter(user_company_role::Column::UserId.eq(user_id))
            .filter(user_company_role::Column::Status.eq(STATUS_ACTIVE))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("load user company roles", e))?;

        let mut ids: HashSet<i64> = direct.into_iter().map(|row| row.role_id).collect();
        ids.extend(scoped.into_iter().map(|row| row.role_id));
        Ok(ids)
    }

    pub async fn role_names(
        &self,
        role_ids: &HashSet<i64>,
    ) -> Result<HashSet<String>, InternalError> {
        if role_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = role::Entity::find()
            .filter(role::Column::Id.is_in(role_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("load role names", e))?;

        Ok(rows.into_iter().map(|row| row.name).collect())
    }

    /// Permission ids and keys granted by the given roles
    pub async fn permissions_for_roles(
        &self,
        role_ids: &HashSet<i64>,
    ) -> Result<(HashSet<i64>, HashSet<String>), InternalError> {
        if role_ids.is_empty() {
            return Ok((HashSet::new(), HashSet::new()));
        }

        let links = role_permission::Entity::find()
            .filter(role_permission::Column::RoleId.is_in(role_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("load role permissions", e))?;

        let permission_ids: HashSet<i64> =
            links.into_iter().map(|row| row.permission_id).collect();
        if permission_ids.is_empty() {
            return Ok((HashSet::new(), HashSet::new()));
        }

        let rows = permission::Entity::find()
            .filter(permission::Column::Id.is_in(permission_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("load permission keys", e))?;

        let keys = rows.into_iter().map(|row| row.key).collect();
        Ok((permission_ids, keys))
    }

    pub async fn capabilities_for_permissions(
        &self,
        permission_ids: &HashSet<i64>,
    ) -> Result<HashSet<String>, InternalError> {
        if permission_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let links = permission_capability::Entity::find()
            .filter(
                permission_capability::Column::PermissionId
                    .is_in(permission_ids.iter().copied()),
            )
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("load permission capabilities", e))?;

        let capability_ids: HashSet<i64> =
            links.into_iter().map(|row| row.capability_id).collect();
        if capability_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = capability::Entity::find()
            .filter(capability::Column::Id.is_in(capability_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("load capability names", e))?;

        Ok(rows.into_iter().map(|row| row.name).collect())
    }

    /// Role name from the user's primary active company assignment, if any
    pub async fn primary_company_role(
        &self,
        user_id: i64,
    ) -> Result<Option<String>, InternalError> {
        let assignment = user_company_role::Entity::find()
            .filter(user_company_role::Column::UserId.eq(user_id))
            .filter(user_company_role::Column::Status.eq(STATUS_ACTIVE))
            .filter(user_company_role::Column::IsPrimary.eq(true))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("load primary company role", e))?;

        let Some(assignment) = assignment else {
            return Ok(None);
        };

        let found = role::Entity::find_by_id(assignment.role_id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("load role for assignment", e))?;

        Ok(found.map(|row| row.name))
    }

    // --- catalog ---

    pub async fn create_role(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<role::Model, InternalError> {
        let existing = role::Entity::find()
            .filter(role::Column::Name.eq(&name))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find role by name", e))?;

        if existing.is_some() {
            return Err(AccessError::duplicate("Role", name).into());
        }

        let new_role = role::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            name: Set(name),
            description: Set(description),
        };

        new_role
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert role", e))
    }

    pub async fn create_permission(
        &self,
        key: String,
        description: Option<String>,
    ) -> Result<permission::Model, InternalError> {
        let existing = permission::Entity::find()
            .filter(permission::Column::Key.eq(&key))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find permission by key", e))?;

        if existing.is_some() {
            return Err(AccessError::duplicate("Permission", key).into());
        }

        let new_permission = permission::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            key: Set(key),
            description: Set(description),
        };

        new_permission
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert permission", e))
    }

    pub async fn create_capability(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<capability::Model, InternalError> {
        let existing = capability::Entity::find()
            .filter(capability::Column::Name.eq(&name))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find capability by name", e))?;

        if existing.is_some() {
            return Err(AccessError::duplicate("Capability", name).into());
        }

        let new_capability = capability::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            name: Set(name),
            description: Set(description),
        };

        new_capability
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert capability", e))
    }

    pub async fn create_company(&self, name: String) -> Result<company::Model, InternalError> {
        let new_company = company::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            name: Set(name),
            created_at: Set(Utc::now().timestamp()),
        };

        new_company
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert company", e))
    }

    pub async fn list_roles(&self) -> Result<Vec<role::Model>, InternalError> {
        role::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list roles", e))
    }

    pub async fn list_permissions(&self) -> Result<Vec<permission::Model>, InternalError> {
        permission::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list permissions", e))
    }

    pub async fn list_capabilities(&self) -> Result<Vec<capability::Model>, InternalError> {
        capability::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list capabilities", e))
    }

    // --- assignment mutations ---
    // All mutations are idempotent; the returned bool reports whether a row
    // actually changed.

    pub async fn assign_user_role(
        &self,
        user_id: i64,
        role_id: i64,
    ) -> Result<bool, InternalError> {
        self.require_user(user_id).await?;
        self.require_role(role_id).await?;

        let existing = user_role::Entity::find_by_id((user_id, role_id))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find user role", e))?;

        if existing.is_some() {
            return Ok(false);
        }

        let link = user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
        };

        link.insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert user role", e))?;

        Ok(true)
    }

    pub async fn revoke_user_role(
        &self,
        user_id: i64,
        role_id: i64,
    ) -> Result<bool, InternalError> {
        let result = user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::RoleId.eq(role_id))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete user role", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn assign_company_role(
        &self,
        user_id: i64,
        company_id: i64,
        role_id: i64,
        is_primary: bool,
        assigned_by: Option<i64>,
    ) -> Result<bool, InternalError> {
        self.require_user(user_id).await?;
        self.require_role(role_id).await?;

        let existing = user_company_role::Entity::find()
            .filter(user_company_role::Column::UserId.eq(user_id))
            .filter(user_company_role::Column::CompanyId.eq(company_id))
            .filter(user_company_role::Column::RoleId.eq(role_id))
            .filter(user_company_role::Column::Status.eq(STATUS_ACTIVE))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find company role", e))?;

        if existing.is_some() {
            return Ok(false);
        }

        let assignment = user_company_role::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            user_id: Set(user_id),
            company_id: Set(company_id),
            role_id: Set(role_id),
            is_primary: Set(is_primary),
            status: Set(STATUS_ACTIVE.to_string()),
            assigned_by: Set(assigned_by),
            assigned_at: Set(Utc::now().timestamp()),
            revoked_at: Set(None),
        };

        assignment
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert company role", e))?;

        Ok(true)
    }

    /// Mark matching active assignments as revoked; rows are kept for history
    pub async fn revoke_company_role(
        &self,
        user_id: i64,
        company_id: i64,
        role_id: i64,
    ) -> Result<bool, InternalError> {
        let result = user_company_role::Entity::update_many()
            .col_expr(
                user_company_role::Column::Status,
                Expr::value(STATUS_REVOKED),
            )
            .col_expr(
                user_company_role::Column::RevokedAt,
                Expr::value(Utc::now().timestamp()),
            )
            .filter(user_company_role::Column::UserId.eq(user_id))
            .filter(user_company_role::Column::CompanyId.eq(company_id))
            .filter(user_company_role::Column::RoleId.eq(role_id))
            .filter(user_company_role::Column::Status.eq(STATUS_ACTIVE))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("revoke company role", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn link_role_permission(
        &self,
        role_id: i64,
        permission_id: i64,
    ) -> Result<bool, InternalError> {
        self.require_role(role_id).await?;
        self.require_permission(permission_id).await?;

        let existing = role_permission::Entity::find_by_id((role_id, permission_id))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find role permission", e))?;

        if existing.is_some() {
            return Ok(false);
        }

        let link = role_permission::ActiveModel {
            role_id: Set(role_id),
            permission_id: Set(permission_id),
        };

        link.insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert role permission", e))?;

        Ok(true)
    }

    pub async fn unlink_role_permission(
        &self,
        role_id: i64,
        permission_id: i64,
    ) -> Result<bool, InternalError> {
        let result = role_permission::Entity::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .filter(role_permission::Column::PermissionId.eq(permission_id))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete role permission", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn link_permission_capability(
        &self,
        permission_id: i64,
        capability_id: i64,
    ) -> Result<bool, InternalError> {
        self.require_permission(permission_id).await?;
        self.require_capability(capability_id).await?;

        let existing =
            permission_capability::Entity::find_by_id((permission_id, capability_id))
                .one(&self.db)
                .await
                .map_err(|e| InternalError::database("find permission capability", e))?;

        if existing.is_some() {
            return Ok(false);
        }

        let link = permission_capability::ActiveModel {
            permission_id: Set(permission_id),
            capability_id: Set(capability_id),
        };

        link.insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert permission capability", e))?;

        Ok(true)
    }

    pub async fn unlink_permission_capability(
        &self,
        permission_id: i64,
        capability_id: i64,
    ) -> Result<bool, InternalError> {
        let result = permission_capability::Entity::delete_many()
            .filter(permission_capability::Column::PermissionId.eq(permission_id))
            .filter(permission_capability::Column::CapabilityId.eq(capability_id))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete permission capability", e))?;

        Ok(result.rows_affected > 0)
    }

    // --- existence checks for friendlier admin errors ---

    async fn require_user(&self, user_id: i64) -> Result<(), InternalError> {
        let found = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find user", e))?;
        if found.is_none() {
            return Err(AccessError::not_found("User", user_id).into());
        }
        Ok(())
    }

    async fn require_role(&self, role_id: i64) -> Result<(), InternalError> {
        let found = role::Entity::find_by_id(role_id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find role", e))?;
        if found.is_none() {
            return Err(AccessError::not_found("Role", role_id).into());
        }
        Ok(())
    }

    async fn require_permission(&self, permission_id: i64) -> Result<(), InternalError> {
        let found = permission::Entity::find_by_id(permission_id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find permission", e))?;
        if found.is_none() {
            return Err(AccessError::not_found("Permission", permission_id).into());
        }
        Ok(())
    }

    async fn require_capability(&self, capability_id: i64) -> Result<(), InternalError> {
        let found = capability::Entity::find_by_id(capability_id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find capability", e))?;
        if found.is_none() {
            return Err(AccessError::not_found("Capability", capability_id).into());
        }
        Ok(())
    }
}

impl std::fmt::Debug for AccessStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessStore")
            .field("db", &"<connection>")
            .finish()
    }
}

use std::sync::Arc;

use poem::web::cookie::CookieJar;
use poem::Request;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::establish_identity;
use crate::audit::AuditLogger;
use crate::errors::api::admin::AdminError;
use crate::services::{AuthorizationGate, SessionContinuity};
use crate::stores::{AccessStore, CredentialStore};
use crate::types::dto::admin::{
    AssignmentResponse, CapabilitySummary, CompanyRoleRequest, CompanyRoleRevokeRequest,
    CreateCapabilityRequest, CreatePermissionRequest, CreateRoleRequest, PermissionCapabilityRequest,
    PermissionSummary, RolePermissionRequest, RoleSummary, UnlockUserRequest, UserRoleRequest,
};
use crate::types::internal::access::{AccessDecision, AccessRequirement};
use crate::types::internal::audit::EventType;
use crate::types::internal::request_meta::RequestMeta;

/// Administrative API for the role/permission/capability graph.
///
/// Every endpoint is wrapped by the authorization gate with a declared
/// requirement; session continuity runs first so a valid AuthToken cookie is
/// enough to reach these after a server restart.
pub struct AdminApi {
    continuity: Arc<SessionContinuity>,
    gate: Arc<AuthorizationGate>,
    access_store: Arc<AccessStore>,
    credential_store: Arc<CredentialStore>,
    audit_logger: Arc<AuditLogger>,
}

/// Principal that passed the gate
struct AdminPrincipal {
    member_id: i64,
    username: String,
}

impl AdminApi {
    pub fn new(
        continuity: Arc<SessionContinuity>,
        gate: Arc<AuthorizationGate>,
        access_store: Arc<AccessStore>,
        credential_store: Arc<CredentialStore>,
        audit_logger: Arc<AuditLogger>,
    ) -> Self {
        Self {
            continuity,
            gate,
            access_store,
            credential_store,
            audit_logger,
        }
    }

    /// Structural changes to roles/permissions/capabilities require the Admin
    /// role
    fn structure_requirement() -> AccessRequirement {
        AccessRequirement::roles(["Admin"])
    }

    /// User-facing account administration is keyed on the Account Management
    /// capability
    fn account_requirement() -> AccessRequirement {
        AccessRequirement::capabilities(["Account Management"])
    }

    /// Hydrate, gate, and hand back the acting principal, or the redirect
    /// produced by a denial
    async fn guard(
        &self,
        req: &Request,
        jar: &CookieJar,
        requirement: &AccessRequirement,
    ) -> Result<(AdminPrincipal, RequestMeta), AdminError> {
        let (meta, continuity) = establish_identity(req, jar, &self.continuity).await;

        let decision = self
            .gate
            .authorize(continuity.session.as_ref(), requirement, &meta)
            .await;

        match decision {
            AccessDecision::Allowed {
                username,
                member_id,
            } => Ok((
                AdminPrincipal {
                    member_id,
                    username,
                },
                meta,
            )),
            AccessDecision::Denied { redirect_to, .. } => {
                Err(AdminError::redirect_to_login(redirect_to))
            }
        }
    }

    async fn log_assignment(
        &self,
        meta: &RequestMeta,
        action: EventType,
        principal: &AdminPrincipal,
        details: &[(&str, i64)],
    ) {
        if let Err(err) = self
            .audit_logger
            .log_assignment_changed(meta, action, principal.member_id, &principal.username, details)
            .await
        {
            tracing::error!("Failed to log assignment change: {:?}", err);
        }
    }
}

/// API tags for administrative endpoints
#[derive(Tags)]
enum AdminTags {
    /// Access control administration
    AccessControl,
}

#[OpenApi(prefix_path = "/admin")]
impl AdminApi {
    /// Create a role
    #[oai(path = "/roles", method = "post", tag = "AdminTags::AccessControl")]
    async fn create_role(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<CreateRoleRequest>,
    ) -> Result<Json<RoleSummary>, AdminError> {
        let (_principal, _meta) = self
            .guard(req, jar, &Self::structure_requirement())
            .await?;

        if body.name.trim().is_empty() {
            return Err(AdminError::bad_request("Role name must not be empty"));
        }

        let created = self
            .access_store
            .create_role(body.name.clone(), body.description.clone())
            .await?;

        Ok(Json(RoleSummary {
            id: created.id,
            name: created.name,
            description: created.description,
        }))
    }

    /// List all roles
    #[oai(path = "/roles", method = "get", tag = "AdminTags::AccessControl")]
    async fn list_roles(
        &self,
        req: &Request,
        jar: &CookieJar,
    ) -> Result<Json<Vec<RoleSummary>>, AdminError> {
        let (_principal, _meta) = self
            .guard(req, jar, &Self::structure_requirement())
            .await?;

        let roles = self.access_store.list_roles().await?;

        Ok(Json(
            roles
                .into_iter()
                .map(|row| RoleSummary {
                    id: row.id,
                    name: row.name,
                    description: row.description,
                })
                .collect(),
        ))
    }

    /// Create a permission
    #[oai(path = "/permissions", method = "post", tag = "AdminTags::AccessControl")]
    async fn create_permission(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<CreatePermissionRequest>,
    ) -> Result<Json<PermissionSummary>, AdminError> {
        let (_principal, _meta) = self
            .guard(req, jar, &Self::structure_requirement())
            .await?;

        if body.key.trim().is_empty() {
            return Err(AdminError::bad_request("Permission key must not be empty"));
        }

        let created = self
            .access_store
            .create_permission(body.key.clone(), body.description.clone())
            .await?;

        Ok(Json(PermissionSummary {
            id: created.id,
            key: created.key,
            description: created.description,
        }))
    }

    /// List all permissions
    #[oai(path = "/permissions", method = "get", tag = "AdminTags::AccessControl")]
    async fn list_permissions(
        &self,
        req: &Request,
        jar: &CookieJar,
    ) -> Result<Json<Vec<PermissionSummary>>, AdminError> {
        let (_principal, _meta) = self
            .guard(req, jar, &Self::structure_requirement())
            .await?;

        let permissions = self.access_store.list_permissions().await?;

        Ok(Json(
            permissions
                .into_iter()
                .map(|row| PermissionSummary {
                    id: row.id,
                    key: row.key,
                    description: row.description,
                })
                .collect(),
        ))
    }

    /// Create a capability
    #[oai(path = "/capabilities", method = "post", tag = "AdminTags::AccessControl")]
    async fn create_capability(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<CreateCapabilityRequest>,
    ) -> Result<Json<CapabilitySummary>, AdminError> {
        let (_principal, _meta) = self
            .guard(req, jar, &Self::structure_requirement())
            .await?;

        if body.name.trim().is_empty() {
            return Err(AdminError::bad_request("Capability name must not be empty"));
        }

        let created = self
            .access_store
            .create_capability(body.name.clone(), body.description.clone())
            .await?;

        Ok(Json(CapabilitySummary {
            id: created.id,
            name: created.name,
            description: created.description,
        }))
    }

    /// List all capabilities
    #[oai(path = "/capabilities", method = "get", tag = "AdminTags::AccessControl")]
    async fn list_capabilities(
        &self,
        req: &Request,
        jar: &CookieJar,
    ) -> Result<Json<Vec<CapabilitySummary>>, AdminError> {
        let (_principal, _meta) = self
            .guard(req, jar, &Self::structure_requirement())
            .await?;

        let capabilities = self.access_store.list_capabilities().await?;

        Ok(Json(
            capabilities
                .into_iter()
                .map(|row| CapabilitySummary {
                    id: row.id,
                    name: row.name,
                    description: row.description,
                })
                .collect(),
        ))
    }

    /// Assign a global role to a user
    #[oai(path = "/user-roles", method = "post", tag = "AdminTags::AccessControl")]
    async fn assign_user_role(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<UserRoleRequest>,
    ) -> Result<Json<AssignmentResponse>, AdminError> {
        let (principal, meta) = self.guard(req, jar, &Self::account_requirement()).await?;

        let changed = self
            .access_store
            .assign_user_role(body.user_id, body.role_id)
            .await?;

        if changed {
            self.log_assignment(
                &meta,
                EventType::RoleAssignmentChanged,
                &principal,
                &[("target_user_id", body.user_id), ("role_id", body.role_id)],
            )
            .await;
        }

        Ok(Json(AssignmentResponse {
            changed,
            message: "Role assigned".to_string(),
        }))
    }

    /// Revoke a global role from a user
    #[oai(path = "/user-roles/revoke", method = "post", tag = "AdminTags::AccessControl")]
    async fn revoke_user_role(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<UserRoleRequest>,
    ) -> Result<Json<AssignmentResponse>, AdminError> {
        let (principal, meta) = self.guard(req, jar, &Self::account_requirement()).await?;

        let changed = self
            .access_store
            .revoke_user_role(body.user_id, body.role_id)
            .await?;

        if changed {
            self.log_assignment(
                &meta,
                EventType::RoleAssignmentChanged,
                &principal,
                &[("target_user_id", body.user_id), ("role_id", body.role_id)],
            )
            .await;
        }

        Ok(Json(AssignmentResponse {
            changed,
            message: "Role revoked".to_string(),
        }))
    }

    /// Assign a company-scoped role to a user
    #[oai(path = "/company-roles", method = "post", tag = "AdminTags::AccessControl")]
    async fn assign_company_role(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<CompanyRoleRequest>,
    ) -> Result<Json<AssignmentResponse>, AdminError> {
        let (principal, meta) = self.guard(req, jar, &Self::account_requirement()).await?;

        let changed = self
            .access_store
            .assign_company_role(
                body.user_id,
                body.company_id,
                body.role_id,
                body.is_primary.unwrap_or(false),
                Some(principal.member_id),
            )
            .await?;

        if changed {
            self.log_assignment(
                &meta,
                EventType::RoleAssignmentChanged,
                &principal,
                &[
                    ("target_user_id", body.user_id),
                    ("company_id", body.company_id),
                    ("role_id", body.role_id),
                ],
            )
            .await;
        }

        Ok(Json(AssignmentResponse {
            changed,
            message: "Company role assigned".to_string(),
        }))
    }

    /// Revoke a company-scoped role assignment
    #[oai(path = "/company-roles/revoke", method = "post", tag = "AdminTags::AccessControl")]
    async fn revoke_company_role(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<CompanyRoleRevokeRequest>,
    ) -> Result<Json<AssignmentResponse>, AdminError> {
        let (principal, meta) = self.guard(req, jar, &Self::account_requirement()).await?;

        let changed = self
            .access_store
            .revoke_company_role(body.user_id, body.company_id, body.role_id)
            .await?;

        if changed {
            self.log_assignment(
                &meta,
                EventType::RoleAssignmentChanged,
                &principal,
                &[
                    ("target_user_id", body.user_id),
                    ("company_id", body.company_id),
                    ("role_id", body.role_id),
                ],
            )
            .await;
        }

        Ok(Json(AssignmentResponse {
            changed,
            message: "Company role revoked".to_string(),
        }))
    }

    /// Grant a permission to a role
    #[oai(path = "/role-permissions", method = "post", tag = "AdminTags::AccessControl")]
    async fn link_role_permission(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<RolePermissionRequest>,
    ) -> Result<Json<AssignmentResponse>, AdminError> {
        let (principal, meta) = self
            .guard(req, jar, &Self::structure_requirement())
            .await?;

        let changed = self
            .access_store
            .link_role_permission(body.role_id, body.permission_id)
            .await?;

        if changed {
            self.log_assignment(
                &meta,
                EventType::PermissionAssignmentChanged,
                &principal,
                &[
                    ("role_id", body.role_id),
                    ("permission_id", body.permission_id),
                ],
            )
            .await;
        }

        Ok(Json(AssignmentResponse {
            changed,
            message: "Permission granted to role".to_string(),
        }))
    }

    /// Remove a permission from a role
    #[oai(path = "/role-permissions/unlink", method = "post", tag = "AdminTags::AccessControl")]
    async fn unlink_role_permission(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<RolePermissionRequest>,
    ) -> Result<Json<AssignmentResponse>, AdminError> {
        let (principal, meta) = self
            .guard(req, jar, &Self::structure_requirement())
            .await?;

        let changed = self
            .access_store
            .unlink_role_permission(body.role_id, body.permission_id)
            .await?;

        if changed {
            self.log_assignment(
                &meta,
                EventType::PermissionAssignmentChanged,
                &principal,
                &[
                    ("role_id", body.role_id),
                    ("permission_id", body.permission_id),
                ],
            )
            .await;
        }

        Ok(Json(AssignmentResponse {
            changed,
            message: "Permission removed from role".to_string(),
        }))
    }

    /// Attach a capability to a permission
    #[oai(path = "/permission-capabilities", method = "post", tag = "AdminTags::AccessControl")]
    async fn link_permission_capability(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<PermissionCapabilityRequest>,
    ) -> Result<Json<AssignmentResponse>, AdminError> {
        let (principal, meta) = self
            .guard(req, jar, &Self::structure_requirement())
            .await?;

        let changed = self
            .access_store
            .link_permission_capability(body.permission_id, body.capability_id)
            .await?;

        if changed {
            self.log_assignment(
                &meta,
                EventType::CapabilityAssignmentChanged,
                &principal,
                &[
                    ("permission_id", body.permission_id),
                    ("capability_id", body.capability_id),
                ],
            )
            .await;
        }

        Ok(Json(AssignmentResponse {
            changed,
            message: "Capability attached to permission".to_string(),
        }))
    }

    /// Detach a capability from a permission
    #[oai(
        path = "/permission-capabilities/unlink",
        method = "post",
        tag = "AdminTags::AccessControl"
    )]
    async fn unlink_permission_capability(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<PermissionCapabilityRequest>,
    ) -> Result<Json<AssignmentResponse>, AdminError> {
        let (principal, meta) = self
            .guard(req, jar, &Self::structure_requirement())
            .await?;

        let changed = self
            .access_store
            .unlink_permission_capability(body.permission_id, body.capability_id)
            .await?;

        if changed {
            self.log_assignment(
                &meta,
                EventType::CapabilityAssignmentChanged,
                &principal,
                &[
                    ("permission_id", body.permission_id),
                    ("capability_id", body.capability_id),
                ],
            )
            .await;
        }

        Ok(Json(AssignmentResponse {
            changed,
            message: "Capability detached from permission".to_string(),
        }))
    }

    /// Explicitly clear a user's login lockout
    #[oai(path = "/users/unlock", method = "post", tag = "AdminTags::AccessControl")]
    async fn unlock_user(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<UnlockUserRequest>,
    ) -> Result<Json<AssignmentResponse>, AdminError> {
        let (principal, meta) = self.guard(req, jar, &Self::account_requirement()).await?;

        let found = self.credential_store.find_by_id(body.user_id).await?;
        if found.is_none() {
            return Err(AdminError::not_found("User not found"));
        }

        self.credential_store.reset_lockout(body.user_id).await?;

        if let Err(err) = self
            .audit_logger
            .log_lockout_reset(&meta, principal.member_id, &principal.username, body.user_id)
            .await
        {
            tracing::error!("Failed to log lockout reset: {:?}", err);
        }

        Ok(Json(AssignmentResponse {
            changed: true,
            message: "Lockout cleared".to_string(),
        }))
    }
}

use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for creating a role
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RoleSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Request model for creating a permission
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreatePermissionRequest {
    pub key: String,
    pub description: Option<String>,
}

#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PermissionSummary {
    pub id: i64,
    pub key: String,
    pub description: Option<String>,
}

/// Request model for creating a capability
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreateCapabilityRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CapabilitySummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Request model for global user/role assignment and revocation
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UserRoleRequest {
    pub user_id: i64,
    pub role_id: i64,
}

/// Request model for company-scoped role assignment
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CompanyRoleRequest {
    pub user_id: i64,
    pub company_id: i64,
    pub role_id: i64,
    pub is_primary: Option<bool>,
}

/// Request model for revoking a company-scoped role assignment
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CompanyRoleRevokeRequest {
    pub user_id: i64,
    pub company_id: i64,
    pub role_id: i64,
}

/// Request model for linking or unlinking a role and a permission
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RolePermissionRequest {
    pub role_id: i64,
    pub permission_id: i64,
}

/// Request model for linking or unlinking a permission and a capability
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PermissionCapabilityRequest {
    pub permission_id: i64,
    pub capability_id: i64,
}

/// Request model for an explicit lockout reset
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UnlockUserRequest {
    pub user_id: i64,
}

/// Generic response for assignment mutations
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct AssignmentResponse {
    /// Whether the mutation changed anything (false when already in the
    /// requested state)
    pub changed: bool,

    pub message: String,
}

use crate::app_data::AppData;
use crate::errors::internal::{AccessError, CredentialError};
use crate::errors::InternalError;
use crate::types::internal::request_meta::RequestMeta;

/// Provision the baseline access-control graph and the initial admin user.
///
/// Idempotent: records that already exist are reused, so the command can run
/// on every deploy. The admin account is created from ADMIN_USERNAME /
/// ADMIN_EMAIL / ADMIN_PASSWORD and receives the Admin role plus the
/// ManageUsers -> Account Management chain.
pub async fn run(app_data: &AppData) -> Result<(), InternalError> {
    let meta = RequestMeta::for_system("seed");

    let member_role = ensure_role(app_data, "Member", "Baseline member access").await?;
    let manager_role = ensure_role(app_data, "Manager", "Company management access").await?;
    let admin_role = ensure_role(app_data, "Admin", "Full administrative access").await?;

    let manage_users = ensure_permission(app_data, "ManageUsers", "Manage user accounts").await?;
    let manage_emissions =
        ensure_permission(app_data, "ManageEmissions", "Manage emission records").await?;
    let manage_reports =
        ensure_permission(app_data, "ManageReports", "Manage and export reports").await?;

    let account_management =
        ensure_capability(app_data, "Account Management", "Account administration screens")
            .await?;
    let emission_records =
        ensure_capability(app_data, "Emission Records", "Emission record screens").await?;
    let report_export = ensure_capability(app_data, "Report Export", "Report export").await?;

    let links = [
        (admin_role, manage_users),
        (admin_role, manage_emissions),
        (admin_role, manage_reports),
        (manager_role, manage_emissions),
        (manager_role, manage_reports),
        (member_role, manage_emissions),
    ];
    for (role_id, permission_id) in links {
        app_data
            .access_store
            .link_role_permission(role_id, permission_id)
            .await?;
    }

    let capability_links = [
        (manage_users, account_management),
        (manage_emissions, emission_records),
        (manage_reports, report_export),
    ];
    for (permission_id, capability_id) in capability_links {
        app_data
            .access_store
            .link_permission_capability(permission_id, capability_id)
            .await?;
    }

    // Initial admin account, if configured
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let Ok(password) = std::env::var("ADMIN_PASSWORD") else {
        tracing::warn!("ADMIN_PASSWORD not set; skipping admin user creation");
        return Ok(());
    };

    let admin_id = match app_data
        .credential_store
        .add_user(username.clone(), email, password, None)
        .await
    {
        Ok(id) => id,
        Err(InternalError::Credential(CredentialError::DuplicateUsername(_))) => {
            tracing::info!("Admin user '{}' already exists, skipping creation", username);
            let existing = app_data
                .credential_store
                .find_by_username(&username)
                .await?
                .ok_or_else(|| AccessError::not_found("User", 0))?;
            existing.id
        }
        Err(other) => return Err(other),
    };

    app_data
        .access_store
        .assign_user_role(admin_id, admin_role)
        .await?;

    if let Err(err) = app_data
        .audit_logger
        .builder("seed_completed", crate::types::internal::audit::Outcome::Success)
        .with_meta(&meta)
        .actor(admin_id, &username)
        .add_field("admin_role_id", admin_role)
        .write()
        .await
    {
        tracing::error!("Failed to log seed completion: {:?}", err);
    }

    tracing::info!("Seeding complete");
    Ok(())
}

async fn ensure_role(
    app_data: &AppData,
    name: &str,
    description: &str,
) -> Result<i64, InternalError> {
    match app_data
        .access_store
        .create_role(name.to_string(), Some(description.to_string()))
        .await
    {
        Ok(created) => Ok(created.id),
        Err(InternalError::Access(AccessError::DuplicateName { .. })) => {
            let roles = app_data.access_store.list_roles().await?;
            roles
                .into_iter()
                .find(|row| row.name == name)
                .map(|row| row.id)
                .ok_or_else(|| AccessError::not_found("Role", 0).into())
        }
        Err(other) => Err(other),
    }
}

async fn ensure_permission(
    app_data: &AppData,
    key: &str,
    description: &str,
) -> Result<i64, InternalError> {
    match app_data
        .access_store
        .create_permission(key.to_string(), Some(description.to_string()))
        .await
    {
        Ok(created) => Ok(created.id),
        Err(InternalError::Access(AccessError::DuplicateName { .. })) => {
            let permissions = app_data.access_store.list_permissions().await?;
            permissions
                .into_iter()
                .find(|row| row.key == key)
                .map(|row| row.id)
                .ok_or_else(|| AccessError::not_found("Permission", 0).into())
        }
        Err(other) => Err(other),
    }
}

async fn ensure_capability(
    app_data: &AppData,
    name: &str,
    description: &str,
) -> Result<i64, InternalError> {
    match app_data
        .access_store
        .create_capability(name.to_string(), Some(description.to_string()))
        .await
    {
        Ok(created) => Ok(created.id),
        Err(InternalError::Access(AccessError::DuplicateName { .. })) => {
            let capabilities = app_data.access_store.list_capabilities().await?;
            capabilities
                .into_iter()
                .find(|row| row.name == name)
                .map(|row| row.id)
                .ok_or_else(|| AccessError::not_found("Capability", 0).into())
        }
        Err(other) => Err(other),
    }
}

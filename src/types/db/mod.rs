// SeaORM entities, one module per table
pub mod activity_log;
pub mod capability;
pub mod company;
pub mod permission;
pub mod permission_capability;
pub mod role;
pub mod role_permission;
pub mod user;
pub mod user_company_role;
pub mod user_role;

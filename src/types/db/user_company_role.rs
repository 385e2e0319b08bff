use sea_orm::entity::prelude::*;

/// Company-scoped role assignment with lifecycle columns.
///
/// A user may hold different roles in different companies at the same time;
/// only rows with status "active" contribute to authorization.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_company_roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub company_id: i64,
    pub role_id: i64,
    pub is_primary: bool,
    pub status: String,
    pub assigned_by: Option<i64>,
    pub assigned_at: i64,
    pub revoked_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_REVOKED: &str = "revoked";

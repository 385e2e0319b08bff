use sea_orm::entity::prelude::*;

/// SeaORM entity for the append-only activity_log table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timestamp: String,
    pub action: String,
    pub category: String,
    pub outcome: String,
    pub actor_user_id: Option<i64>,
    pub actor_company_id: Option<i64>,
    pub actor_label: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub correlation_id: String,
    pub details: String,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

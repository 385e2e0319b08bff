pub use sea_orm_migration::prelude::*;

mod m20260115_000001_create_access_schema;
mod m20260115_000002_create_audit_schema;

pub struct AccessMigrator;

#[async_trait::async_trait]
impl MigratorTrait for AccessMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260115_000001_create_access_schema::Migration)]
    }
}

pub struct AuditMigrator;

#[async_trait::async_trait]
impl MigratorTrait for AuditMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260115_000002_create_audit_schema::Migration)]
    }
}

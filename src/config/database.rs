use migration::{AccessMigrator, AuditMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection, DbErr};

/// Connection strings for the two databases.
///
/// Passed explicitly into `DatabaseConnections::connect`; nothing holds
/// process-wide connection state.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub primary_url: String,
    pub audit_url: String,
}

impl DatabaseSettings {
    pub fn from_env() -> Self {
        let primary_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://carbonledger.db?mode=rwc".to_string());

        let audit_url = std::env::var("AUDIT_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://carbonledger-audit.db?mode=rwc".to_string());

        Self {
            primary_url,
            audit_url,
        }
    }
}

/// Live connections to the access-control database and the audit database.
///
/// The activity log lives on its own connection so an unavailable audit
/// database degrades logging without taking down credential reads.
#[derive(Clone)]
pub struct DatabaseConnections {
    pub primary: DatabaseConnection,
    pub audit: DatabaseConnection,
}

impl DatabaseConnections {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, DbErr> {
        tracing::info!("Connecting to database: {}", settings.primary_url);
        let primary = Database::connect(&settings.primary_url).await?;

        tracing::info!("Connecting to audit database: {}", settings.audit_url);
        let audit = Database::connect(&settings.audit_url).await?;

        Ok(Self { primary, audit })
    }

    /// Run schema migrations on both databases
    pub async fn migrate(&self) -> Result<(), DbErr> {
        AccessMigrator::up(&self.primary, None).await?;
        AuditMigrator::up(&self.audit, None).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }
}

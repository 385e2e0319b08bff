use std::sync::Arc;

use clap::{Parser, Subcommand};
use poem::middleware::CookieJarManager;
use poem::{listener::TcpListener, EndpointExt, Route, Server};
use poem_openapi::OpenApiService;

use carbonledger_backend::api::{AdminApi, AuthApi, HealthApi};
use carbonledger_backend::app_data::AppData;
use carbonledger_backend::cli::seed;
use carbonledger_backend::config::{
    init_logging, DatabaseConnections, DatabaseSettings, SecretManager,
};

#[derive(Parser)]
#[command(name = "carbonledger-backend", about = "CarbonLedger access-control backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Bind address
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: String,
    },
    /// Provision baseline roles, permissions, capabilities and the admin user
    Seed,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging()?;

    let cli = Cli::parse();

    let secret_manager = Arc::new(SecretManager::init()?);

    let settings = DatabaseSettings::from_env();
    let connections = DatabaseConnections::connect(&settings).await?;
    connections.migrate().await?;

    let app_data = Arc::new(AppData::init(connections, secret_manager));

    match cli.command.unwrap_or(Command::Serve {
        bind: "0.0.0.0:3000".to_string(),
    }) {
        Command::Seed => {
            seed::run(&app_data).await?;
            Ok(())
        }
        Command::Serve { bind } => serve(app_data, &bind).await,
    }
}

async fn serve(app_data: Arc<AppData>, bind: &str) -> Result<(), Box<dyn std::error::Error>> {
    let auth_api = AuthApi::new(app_data.auth_service.clone(), app_data.continuity.clone());
    let admin_api = AdminApi::new(
        app_data.continuity.clone(),
        app_data.gate.clone(),
        app_data.access_store.clone(),
        app_data.credential_store.clone(),
        app_data.audit_logger.clone(),
    );

    let api_service = OpenApiService::new(
        (HealthApi, auth_api, admin_api),
        "CarbonLedger API",
        "1.0.0",
    )
    .server(format!("http://{}/api", bind));

    let ui = api_service.swagger_ui();

    // Session continuity runs inside each endpoint, before its gate check;
    // the cookie jar middleware only makes the cookies accessible
    let app = Route::new()
        .nest("/api", api_service)
        .nest("/swagger", ui)
        .with(CookieJarManager::new());

    tracing::info!("Starting server on http://{}", bind);
    Server::new(TcpListener::bind(bind)).run(app).await?;

    Ok(())
}

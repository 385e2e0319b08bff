mod database;
mod logging;
mod secret_manager;

pub use database::{DatabaseConnections, DatabaseSettings};
pub use logging::init_logging;
pub use secret_manager::{SecretError, SecretManager};

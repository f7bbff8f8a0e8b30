use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;
use tracing::info;

use configs::DatabaseConfig;

use crate::errors::ModelError;

/// `DATABASE_URL` after `.env` is loaded, empty when unset.
pub static DATABASE_URL: Lazy<String> = Lazy::new(|| {
    // Load .env if present
    let _ = dotenvy::dotenv();
    url_or_empty(env::var("DATABASE_URL").ok())
});

fn url_or_empty(var: Option<String>) -> String {
    var.map(|url| url.trim().to_string()).unwrap_or_default()
}

/// Connect using the pool settings carried by `cfg`.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<DatabaseConnection, ModelError> {
    if cfg.url.trim().is_empty() {
        return Err(ModelError::Config("database url is empty".into()));
    }
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opt).await?;
    info!(
        max_connections = cfg.max_connections,
        min_connections = cfg.min_connections,
        "database_pool_ready"
    );
    Ok(db)
}

/// Round-trip a trivial query to confirm the pool is usable.
pub async fn test_connection(db: &DatabaseConnection) -> Result<(), ModelError> {
    db.ping().await?;
    Ok(())
}

use configs::{AppConfig, LogFormat};
use dotenvy::dotenv;
use migration::MigratorTrait;
use service::{MenuRepository, MenuStore};
use tracing::{error, info, warn};
use uuid::Uuid;

fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Compact => common::utils::logging::init_logging_default(),
        LogFormat::Json => common::utils::logging::init_logging_json(),
    }
    info!(service = "menus", event = "logger_init", "tracing subscriber initialized");
}

async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    models::db::test_connection(&db).await?;

    migration::Migrator::up(&db, None).await?;
    info!(service = "menus", event = "migrated", "menus schema is up to date");

    let store = MenuStore::from_config(db, &cfg.store);
    let menus = store.list().await?;
    info!(
        service = "menus",
        event = "ready",
        count = menus.len(),
        timeout_ms = store.timeout().as_millis() as u64,
        "menu store ready"
    );
    Ok(())
}

fn main() -> std::process::ExitCode {
    dotenv().ok();

    // config file first, then the environment alone
    let loaded = configs::load_with_env_fallback(&configs::config_path());
    let format = loaded.as_ref().map(|(c, _)| c.logging.format).unwrap_or_default();
    init_logging(format);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "menus",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let cfg = match loaded {
        Ok((cfg, None)) => cfg,
        Ok((cfg, Some(file_err))) => {
            warn!(
                service = "menus",
                event = "config_file_ignored",
                error = %file_err,
                "config file unusable; continuing with environment settings"
            );
            cfg
        }
        Err(e) => {
            error!(
                service = "menus",
                event = "config_invalid",
                error = %e,
                "cannot load configuration"
            );
            return std::process::ExitCode::FAILURE;
        }
    };
    if cfg.database.sqlx_logging {
        warn!(service = "menus", event = "sqlx_logging", "sqlx statement logging is enabled");
    }

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(
                service = "menus",
                event = "runtime_build_failed",
                error = %e,
                "failed to build tokio runtime"
            );
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "menus",
        event = "start",
        %service_id,
        pid,
        version = env!("CARGO_PKG_VERSION"),
        "bootstrap starting"
    );

    match rt.block_on(run(cfg)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(service = "menus", event = "run_failed", error = %e, "bootstrap failed");
            std::process::ExitCode::FAILURE
        }
    }
}

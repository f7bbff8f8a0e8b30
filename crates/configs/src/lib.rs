use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

/// Per-call deadline applied by the menu store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

fn default_store_timeout() -> u64 { 3 }

impl Default for StoreConfig {
    fn default() -> Self {
        Self { timeout_secs: default_store_timeout() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// `CONFIG_PATH`, or `config.toml` in the working directory.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// Loads and validates `path`, falling back to the environment alone when the
/// file is absent or unusable. The second element carries the file error that
/// was set aside; a missing file is not reported.
pub fn load_with_env_fallback(path: &str) -> Result<(AppConfig, Option<anyhow::Error>)> {
    if !std::path::Path::new(path).exists() {
        return AppConfig::from_env().map(|cfg| (cfg, None));
    }
    let from_file = load_from_file(path).and_then(|mut cfg| {
        cfg.normalize_and_validate()?;
        Ok(cfg)
    });
    match from_file {
        Ok(cfg) => Ok((cfg, None)),
        Err(file_err) => match AppConfig::from_env() {
            Ok(cfg) => Ok((cfg, Some(file_err.context(format!("config file {path}"))))),
            Err(env_err) => {
                Err(anyhow!("no usable config: file {path}: {file_err}; env: {env_err}"))
            }
        },
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config assembled purely from the environment, used when no TOML file exists.
    pub fn from_env() -> Result<Self> {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // DATABASE_URL fills in a missing database.url
        self.database.normalize_from_env();
        self.database.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or via DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(anyhow!("store.timeout_secs must be >= 1"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg = parse("[database]\nurl = \"postgres://localhost/menus\"\n").unwrap();
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.database.min_connections, 2);
        assert_eq!(cfg.store.timeout_secs, 3);
        assert_eq!(cfg.logging.format, LogFormat::Compact);
        cfg.database.validate().unwrap();
        cfg.store.validate().unwrap();
    }

    #[test]
    fn json_log_format_parses() {
        let cfg = parse("[logging]\nformat = \"json\"\n").unwrap();
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.database.acquire_timeout_secs, 30);
    }

    #[test]
    fn rejects_non_postgres_url() {
        let cfg = parse("[database]\nurl = \"mysql://localhost/menus\"\n").unwrap();
        assert!(cfg.database.validate().is_err());
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let toml = "[database]\nurl = \"postgres://localhost/menus\"\n\
                    max_connections = 1\nmin_connections = 4\n";
        let cfg = parse(toml).unwrap();
        assert!(cfg.database.validate().is_err());
    }

    #[test]
    fn rejects_zero_store_timeout() {
        let cfg = parse("[store]\ntimeout_secs = 0\n").unwrap();
        assert!(cfg.store.validate().is_err());
        let cfg = parse("[store]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(cfg.store.timeout(), std::time::Duration::from_secs(5));
    }

    // The only test in this crate that touches DATABASE_URL.
    #[test]
    fn unusable_file_falls_back_to_env_and_reports_why() {
        let dir = std::env::temp_dir();
        let broken = dir.join(format!("menus-broken-{}.toml", std::process::id()));
        std::fs::write(&broken, "[database\nurl = ").unwrap();
        let broken = broken.to_string_lossy().into_owned();
        let missing = dir.join(format!("menus-missing-{}.toml", std::process::id()));
        let missing = missing.to_string_lossy().into_owned();

        std::env::set_var("DATABASE_URL", "postgres://localhost/menus");
        let (cfg, ignored) = load_with_env_fallback(&broken).unwrap();
        assert_eq!(cfg.database.url, "postgres://localhost/menus");
        let ignored = ignored.expect("malformed file must be reported");
        assert!(ignored.to_string().contains(&broken), "{ignored}");

        let (_, ignored) = load_with_env_fallback(&missing).unwrap();
        assert!(ignored.is_none());

        std::env::remove_var("DATABASE_URL");
        let err = load_with_env_fallback(&broken).unwrap_err();
        assert!(err.to_string().starts_with("no usable config"), "{err}");

        let _ = std::fs::remove_file(&broken);
    }
}

use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Connection metadata for the backend project. Owned by the external
/// collaborator; the in-memory backend only echoes it in logs.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_project_id")]
    pub project_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// How many popular stays the home screen subscribes to.
    #[serde(default = "default_page_size")]
    pub popular_page_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_project_id() -> String {
    "booknstay-demo".to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_filter() -> String {
    "booknstay_app=debug".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            popular_page_size: default_page_size(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Checked-in defaults; every file layer is optional so a bare
            // checkout still starts.
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Machine-local overrides, not checked in.
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `BOOKNSTAY__CATALOG__POPULAR_PAGE_SIZE=5`
            .add_source(config::Environment::with_prefix("BOOKNSTAY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

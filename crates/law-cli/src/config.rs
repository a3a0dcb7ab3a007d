//! `ServiceConfig`: TOML file layered with environment variables (§6 "Environment").
use std::path::PathBuf;
use std::time::Duration;

use law_orchestrator::OrchestratorConfig;
use serde::Deserialize;

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_daily_budget() -> f64 {
    10.0
}

fn default_stage4_deadline_secs() -> u64 {
    15
}

fn default_strategy_timeout_secs() -> u64 {
    8
}

fn default_concurrency_cap() -> usize {
    8
}

/// Everything named in §6 "Environment" plus the retrieval/fusion knobs an Open
/// Question ("make these configurable") asks for.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_llm_provider")]
    pub llm_provider: String,
    #[serde(default)]
    pub llm_api_key: String,
    #[serde(default)]
    pub llm_fallback_provider: Option<String>,
    #[serde(default)]
    pub llm_fallback_api_key: Option<String>,
    #[serde(default = "default_daily_budget")]
    pub llm_daily_budget: f64,

    #[serde(default = "default_stage4_deadline_secs")]
    pub stage4_deadline_secs: u64,
    #[serde(default = "default_strategy_timeout_secs")]
    pub strategy_timeout_secs: u64,
    #[serde(default = "default_concurrency_cap")]
    pub concurrency_cap: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            llm_provider: default_llm_provider(),
            llm_api_key: String::new(),
            llm_fallback_provider: None,
            llm_fallback_api_key: None,
            llm_daily_budget: default_daily_budget(),
            stage4_deadline_secs: default_stage4_deadline_secs(),
            strategy_timeout_secs: default_strategy_timeout_secs(),
            concurrency_cap: default_concurrency_cap(),
        }
    }
}

impl ServiceConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            stage4_deadline: Duration::from_secs(self.stage4_deadline_secs),
            strategy_timeout: Duration::from_secs(self.strategy_timeout_secs),
            concurrency_cap: self.concurrency_cap,
            ..OrchestratorConfig::default()
        }
    }
}

/// Load from an optional TOML file, layered with `LAW_`-prefixed environment variables
/// and the four legacy variable names from §6 ("Environment") for compatibility with
/// §6's own naming. `.env` is loaded first via `dotenvy`, matching
/// `try_main`'s `dotenvy::dotenv().ok()` (missing `.env` is not an error).
pub fn load(path: Option<&std::path::Path>) -> Result<ServiceConfig, config::ConfigError> {
    dotenvy::dotenv().ok();

    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(&path.to_string_lossy()).required(true));
    } else {
        builder = builder.add_source(config::File::with_name("law-cli").required(false));
    }

    builder = builder
        .add_source(config::Environment::with_prefix("LAW").separator("_"))
        // §6's own variable names, so `LISTEN_ADDR=...` works without the `LAW_` prefix.
        .set_override_option("listen_addr", std::env::var("LISTEN_ADDR").ok())?
        .set_override_option("llm_provider", std::env::var("LLM_PROVIDER").ok())?
        .set_override_option("llm_api_key", std::env::var("LLM_API_KEY").ok())?
        .set_override_option("llm_fallback_provider", std::env::var("LLM_FALLBACK_PROVIDER").ok())?
        .set_override_option(
            "llm_daily_budget",
            std::env::var("LLM_DAILY_BUDGET").ok().and_then(|v| v.parse::<f64>().ok()),
        )?
        .set_override_option("data_dir", std::env::var("DATA_DIR").ok())?
        .set_override_option("log_level", std::env::var("LOG_LEVEL").ok())?;

    builder.build()?.try_deserialize()
}

use crate::domain::period::Period;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub api: ApiSettings,
    #[serde(default)]
    pub history: HistorySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

/// Upstream health-data API the history is read from
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct HistorySettings {
    #[serde(default)]
    pub default_period: Period,
}

fn default_timeout_secs() -> u64 {
    10
}

/// Load `config/history.*`, overridable with `HEALTH_HISTORY__SECTION__KEY` variables
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/history"))
        .add_source(config::Environment::with_prefix("HEALTH_HISTORY").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

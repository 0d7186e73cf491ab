use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AvrcError;

pub const DEFAULT_RECORD_URL: &str = "https://zenodo.org/api/records/11426065";
pub const DEFAULT_CONFIG_FILE: &str = "avrc.json";
pub const RECORD_URL_ENV: &str = "AVRC_RECORD_URL";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub record_url: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub record_url: String,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            record_url: DEFAULT_RECORD_URL.to_string(),
            user_agent: default_user_agent(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Without `path`, a missing `avrc.json` in the working directory means
    /// defaults.
    pub fn resolve(path: Option<&str>) -> Result<Settings, AvrcError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config = if path.is_none() && !config_path.exists() {
            Config::default()
        } else {
            let content = fs::read_to_string(&config_path)
                .map_err(|_| AvrcError::ConfigRead(config_path.clone()))?;
            serde_json::from_str(&content).map_err(|err| AvrcError::ConfigParse(err.to_string()))?
        };

        let env_url = std::env::var(RECORD_URL_ENV).ok();
        Ok(Self::resolve_config(config, env_url.as_deref()))
    }

    pub fn resolve_config(config: Config, env_record_url: Option<&str>) -> Settings {
        let defaults = Settings::default();
        let record_url = env_record_url
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .or(config.record_url)
            .unwrap_or(defaults.record_url);

        Settings {
            record_url,
            user_agent: config.user_agent.unwrap_or(defaults.user_agent),
            connect_timeout_secs: config
                .connect_timeout_secs
                .unwrap_or(defaults.connect_timeout_secs),
        }
    }
}

fn default_user_agent() -> String {
    format!("avrc/{}", env!("CARGO_PKG_VERSION"))
}

use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub output_dir: String,
    pub concurrency: usize,
    pub delay_seconds: f64,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub proxies: Vec<String>,
    pub timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output_dir: "data".to_string(),
            concurrency: 8,
            delay_seconds: 1.0,
            user_agent: None,
            proxies: Vec::new(),
            timeout_seconds: 30,
        }
    }
}

impl Settings {
    // Builds settings from `OUTPUT_DIR`, `CONCURRENCY`, `DELAY_SECONDS`, `USER_AGENT`,
    // `PROXIES` (comma separated) and `TIMEOUT_SECONDS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let raw: Settings = Config::builder()
            .set_default("output_dir", defaults.output_dir)?
            .set_default("concurrency", defaults.concurrency as i64)?
            .set_default("delay_seconds", defaults.delay_seconds)?
            .set_default("timeout_seconds", defaults.timeout_seconds as i64)?
            .set_default("proxies", Vec::<String>::new())?
            .add_source(
                Environment::default()
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("proxies"),
            )
            .build()?
            .try_deserialize()?;

        let settings = raw.cleaned();
        settings.validate()?;
        Ok(settings)
    }

    fn cleaned(mut self) -> Self {
        self.user_agent = self
            .user_agent
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty());
        self.proxies = self
            .proxies
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "concurrency",
                reason: "must be a positive integer".to_string(),
            });
        }
        if Duration::try_from_secs_f64(self.delay_seconds).is_err() {
            return Err(ConfigError::Invalid {
                field: "delay_seconds",
                reason: format!("must be a non-negative number of seconds that fits a Duration, got {}", self.delay_seconds),
            });
        }
        for proxy in &self.proxies {
            if url::Url::parse(proxy).is_err() {
                return Err(ConfigError::Invalid {
                    field: "proxies",
                    reason: format!("not a valid proxy URL: {}", proxy),
                });
            }
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        // Validated settings always convert.
        Duration::try_from_secs_f64(self.delay_seconds).unwrap_or(Duration::ZERO)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn default_output_path(&self) -> String {
        format!("{}/technicians.csv", self.output_dir.trim_end_matches('/'))
    }
}

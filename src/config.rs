// Configuration - layered defaults, TOML files and environment variables

use crate::dates::DateGrammar;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "runner-analytics.toml";

/// Prefix for environment overrides, e.g. `RUNNER_ANALYTICS_FORMAT=json`
pub const ENV_PREFIX: &str = "RUNNER_ANALYTICS_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,

    /// How the CLI prints reports
    pub format: OutputFormat,

    /// Accepted date formats (chrono syntax). Empty = built-in grammar.
    pub date_formats: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            format: OutputFormat::Text,
            date_formats: Vec::new(),
        }
    }
}

impl Config {
    pub fn date_grammar(&self) -> DateGrammar {
        DateGrammar::new(self.date_formats.clone())
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `RUNNER_ANALYTICS_`)
/// 2. Explicit config file (`--config`)
/// 3. `runner-analytics.toml` in `workdir`
/// 4. Built-in defaults
pub fn load_config(workdir: &Path, explicit: Option<&Path>) -> Result<Config, Box<figment::Error>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Box::new(figment::Error::from(format!(
                "config file not found: {}",
                path.display()
            ))));
        }
    }
    figment(workdir, explicit).extract().map_err(Box::new)
}

fn figment(workdir: &Path, explicit: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    let local = workdir.join(DEFAULT_CONFIG_FILE);
    if local.exists() {
        figment = figment.merge(Toml::file(&local));
    }

    if let Some(path) = explicit {
        figment = figment.merge(Toml::file(path));
    }

    figment.merge(Env::prefixed(ENV_PREFIX))
}

//! Application configuration
//!
//! Loaded from YAML, then patched from `SELECTOR_HEAL_*` environment variables.

use std::env;
use std::path::PathBuf;

use locator_heal::HealOptions;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::report::OutputFormat;

pub const ENV_MIN_SCORE: &str = "SELECTOR_HEAL_MIN_SCORE";
pub const ENV_MAX_RESULTS: &str = "SELECTOR_HEAL_MAX_RESULTS";
pub const ENV_TIMEOUT_MS: &str = "SELECTOR_HEAL_TIMEOUT_MS";

pub const LOCAL_CONFIG_PATH: &str = "config/selector-heal.yaml";
const CONFIG_DIR_NAME: &str = "selector-heal";
const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub heal: HealOptions,

    /// Used when `--output` is not given
    pub output: OutputFormat,

    /// Upper bound for one heal on the blocking pool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// JSON file holding accepted and rejected locators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_yaml(raw: &str) -> Result<Self, AppError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn to_yaml(&self) -> Result<String, AppError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(min) = overrides.min_score {
            self.heal.min_candidate_score = min;
        }
        if let Some(max) = overrides.max_results {
            self.heal.max_results = Some(max);
        }
        if let Some(timeout) = overrides.timeout_ms {
            self.timeout_ms = Some(timeout);
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.heal.validate()?;
        if self.timeout_ms == Some(0) {
            return Err(AppError::config("timeout_ms must be > 0"));
        }
        Ok(())
    }
}

/// Values taken from the environment on top of the file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    pub min_score: Option<f64>,
    pub max_results: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl ConfigOverrides {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            min_score: parse_var(&lookup, ENV_MIN_SCORE)?,
            max_results: parse_var(&lookup, ENV_MAX_RESULTS)?,
            timeout_ms: parse_var(&lookup, ENV_TIMEOUT_MS)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|err| AppError::config(format!("{key}={raw:?}: {err}")))
}

/// `./config/selector-heal.yaml` when present, else the per-user config dir.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_PATH);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml("heal:\n  max_results: 5\noutput: json\n").unwrap();
        assert_eq!(config.heal.max_results, Some(5));
        assert_eq!(config.heal.min_candidate_score, 0.3);
        assert!(config.heal.catch_panics);
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.timeout_ms, None);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(AppConfig::from_yaml("  \n").unwrap(), AppConfig::default());
    }

    #[test]
    fn unknown_output_is_rejected() {
        assert!(AppConfig::from_yaml("output: xml\n").is_err());
    }

    #[test]
    fn env_overrides_win() {
        let overrides = ConfigOverrides::from_lookup(lookup(&[
            (ENV_MIN_SCORE, "0.5"),
            (ENV_MAX_RESULTS, "2"),
            (ENV_TIMEOUT_MS, " 1500 "),
        ]))
        .unwrap();
        let mut config = AppConfig::from_yaml("heal:\n  min_candidate_score: 0.1\n").unwrap();
        config.apply(&overrides);
        assert_eq!(config.heal.min_candidate_score, 0.5);
        assert_eq!(config.heal.max_results, Some(2));
        assert_eq!(config.timeout_ms, Some(1500));
    }

    #[test]
    fn bad_env_value_names_the_variable() {
        let err = ConfigOverrides::from_lookup(lookup(&[(ENV_MAX_RESULTS, "many")])).unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_RESULTS));
        assert!(ConfigOverrides::from_lookup(lookup(&[])).unwrap().is_empty());
    }

    #[test]
    fn validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());
        config.timeout_ms = Some(0);
        assert!(config.validate().is_err());
        config.timeout_ms = None;
        config.heal.min_candidate_score = 1.5;
        assert!(matches!(config.validate(), Err(AppError::Heal(_))));
    }
}

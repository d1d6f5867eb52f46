use std::path::PathBuf;

use anyhow::{Context, Result};
use selector_heal_cli::config::default_config_path;
use selector_heal_cli::{AppConfig, ConfigOverrides};
use tokio::fs;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: Option<PathBuf>,
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    // Priority: --config > ./config/selector-heal.yaml > ~/.config/selector-heal/config.yaml
    let config_path = config_path.cloned().or_else(default_config_path);

    let exists = match &config_path {
        Some(path) => fs::try_exists(path).await.unwrap_or(false),
        None => false,
    };

    let mut config = match &config_path {
        Some(path) if exists => {
            let content = fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = AppConfig::from_yaml(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            info!("Loaded configuration from: {}", path.display());
            config
        }
        Some(path) => {
            debug!("Config file not found, using defaults: {}", path.display());
            AppConfig::default()
        }
        None => {
            debug!("No config directory available, using defaults");
            AppConfig::default()
        }
    };

    let overrides = ConfigOverrides::from_env().context("Invalid environment override")?;
    if !overrides.is_empty() {
        info!(?overrides, "Applying environment overrides");
        config.apply(&overrides);
    }
    config.validate().context("Invalid configuration")?;

    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use dom_snapshot::Snapshot;
use selector_heal_cli::snapshot_io::load_snapshot;
use selector_heal_cli::{AppConfig, OutputFormat};

pub struct CliContext {
    config: Arc<AppConfig>,
    config_path: Option<PathBuf>,
    output: Option<OutputFormat>,
}

impl CliContext {
    pub fn new(config: AppConfig, config_path: Option<PathBuf>, output: Option<OutputFormat>) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            output,
        }
    }

    pub fn config(&self) -> &AppConfig {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// `--output` when given, else the configured format.
    pub fn output(&self) -> OutputFormat {
        self.output.unwrap_or(self.config.output)
    }

    /// `--history` when given, else the configured history file.
    pub fn history_path(&self, explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit.or_else(|| self.config.history_path.clone())
    }

    pub async fn snapshot(&self, path: &Path) -> Result<Snapshot> {
        load_snapshot(path)
            .await
            .with_context(|| format!("loading snapshot {}", path.display()))
    }
}

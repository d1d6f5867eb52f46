use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use selector_heal_cli::AppConfig;
use tokio::fs;

use crate::cli::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration, environment overrides included
    Show,

    /// Validate the configuration file
    Validate,

    /// Print the configuration file location
    Path,
}

pub async fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            match ctx.config_path() {
                Some(path) => println!("Current configuration ({}):", path.display()),
                None => println!("Current configuration (defaults):"),
            }
            print!("{}", ctx.config().to_yaml()?);
        }
        ConfigAction::Validate => validate_config_file(ctx).await?,
        ConfigAction::Path => match ctx.config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("(none)"),
        },
    }

    Ok(())
}

async fn validate_config_file(ctx: &CliContext) -> Result<()> {
    let exists = match ctx.config_path() {
        Some(path) => fs::try_exists(path).await.unwrap_or(false),
        None => false,
    };
    match ctx.config_path() {
        Some(path) if exists => {
            let raw = fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            AppConfig::from_yaml(&raw)
                .and_then(|config| config.validate())
                .with_context(|| format!("validating {}", path.display()))?;
            println!("Configuration file {} is valid", path.display());
        }
        Some(path) => println!(
            "No configuration file at {}; defaults are valid",
            path.display()
        ),
        None => println!("No configuration file; defaults are valid"),
    }
    Ok(())
}

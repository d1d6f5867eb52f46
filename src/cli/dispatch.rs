use super::candidates::cmd_candidates;
use super::config::cmd_config;
use super::env::CliArgs;
use super::heal::cmd_heal;
use super::history::cmd_history;
use super::selectors::cmd_selectors;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Heal(args) => cmd_heal(args, ctx).await,
        Commands::Candidates(args) => cmd_candidates(args, ctx).await,
        Commands::Selectors(args) => cmd_selectors(args, ctx).await,
        Commands::History(args) => cmd_history(args, ctx).await,
        Commands::Config(args) => cmd_config(args, ctx).await,
    }
}

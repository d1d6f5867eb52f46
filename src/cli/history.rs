use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use locator_heal::{HealSource, HealingHistory, HealingResult, LocatorStrategy};
use selector_heal_cli::report::HistoryReport;
use selector_heal_cli::snapshot_io::{load_history, save_history};
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::print_report;

#[derive(Args, Clone, Debug)]
pub struct HistoryArgs {
    /// Healing history file (overrides `history_path`)
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    #[command(subcommand)]
    pub action: HistoryAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum HistoryAction {
    /// Show every recorded decision
    List,

    /// Record a locator as a confirmed replacement
    Accept {
        #[arg(long)]
        locator: String,

        /// Page url the decision applies to
        #[arg(long)]
        url: String,

        #[arg(long)]
        selector: String,

        #[arg(long, value_parser = parse_strategy)]
        strategy: LocatorStrategy,

        #[arg(long, default_value_t = 1.0)]
        score: f64,
    },

    /// Record a locator as wrong so it is never proposed again
    Reject {
        #[arg(long)]
        locator: String,

        #[arg(long)]
        url: String,

        #[arg(long)]
        selector: String,
    },
}

pub async fn cmd_history(args: HistoryArgs, ctx: &CliContext) -> Result<()> {
    let path = ctx
        .history_path(args.history)
        .ok_or_else(|| anyhow!("no history file: pass --history or set history_path"))?;
    let history = load_history(&path).await?;

    match args.action {
        HistoryAction::List => {
            let report = HistoryReport {
                records: history.records(),
            };
            return print_report(ctx.output(), &report);
        }
        HistoryAction::Accept {
            locator,
            url,
            selector,
            strategy,
            score,
        } => {
            if !(0.0..=1.0).contains(&score) {
                return Err(anyhow!("score must be within 0..=1, got {score}"));
            }
            history.record_accepted(
                &locator,
                &url,
                HealingResult {
                    selector: selector.clone(),
                    score,
                    strategy,
                    source: HealSource::Local,
                },
            );
            info!(%locator, %url, %selector, "Recorded accepted locator");
        }
        HistoryAction::Reject {
            locator,
            url,
            selector,
        } => {
            history.record_rejected(&locator, &url, &selector);
            info!(%locator, %url, %selector, "Recorded rejected locator");
        }
    }

    save_history(&path, &history).await?;
    println!("Saved healing history to {}", path.display());
    Ok(())
}

fn parse_strategy(raw: &str) -> Result<LocatorStrategy, String> {
    LocatorStrategy::all()
        .into_iter()
        .find(|strategy| strategy.name() == raw)
        .ok_or_else(|| {
            let known: Vec<&str> = LocatorStrategy::all().iter().map(|s| s.name()).collect();
            format!("unknown strategy {raw:?}, expected one of {}", known.join(", "))
        })
}

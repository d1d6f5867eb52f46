use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use locator_heal::metrics;
use locator_heal::{
    HealingHistory, HealingOrchestrator, HistoryAwareHealer, RecordingObserver, SelfHealer,
};
use selector_heal_cli::report::HealReport;
use selector_heal_cli::snapshot_io::{load_history, save_history};
use tokio::time::timeout;
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::print_report;

#[derive(Args, Clone, Debug)]
pub struct HealArgs {
    /// Locator that no longer matches, as `#id`
    #[arg(long)]
    pub locator: String,

    /// Snapshot taken while the locator still worked
    #[arg(long, value_name = "FILE")]
    pub baseline: PathBuf,

    /// Snapshot of the page as it is now
    #[arg(long, value_name = "FILE")]
    pub current: PathBuf,

    /// Keep at most N results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Include pipeline trace events in the output
    #[arg(long)]
    pub trace: bool,

    /// Healing history file (overrides `history_path`)
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Record the top result as accepted in the history
    #[arg(long)]
    pub accept_top: bool,
}

pub async fn cmd_heal(args: HealArgs, ctx: &CliContext) -> Result<()> {
    let baseline = ctx.snapshot(&args.baseline).await?;
    let current = ctx.snapshot(&args.current).await?;
    let baseline_url = baseline.url.clone();
    let current_url = current.url.clone();

    let mut options = ctx.config().heal.clone();
    if let Some(limit) = args.limit {
        options.max_results = Some(limit);
    }
    options.validate()?;

    let recorder = args.trace.then(|| Arc::new(RecordingObserver::new()));
    let mut orchestrator = HealingOrchestrator::with_options(options);
    if let Some(recorder) = &recorder {
        orchestrator = orchestrator.with_observer(recorder.clone());
    }

    let history_path = ctx.history_path(args.history.clone());
    if args.accept_top && history_path.is_none() {
        bail!("--accept-top needs --history or history_path in the configuration");
    }
    let history = match &history_path {
        Some(path) => Some(Arc::new(load_history(path).await?)),
        None => None,
    };
    let healer: Arc<dyn SelfHealer> = match &history {
        Some(history) => Arc::new(HistoryAwareHealer::new(
            Arc::new(orchestrator),
            history.clone(),
        )),
        None => Arc::new(orchestrator),
    };

    let started = Instant::now();
    let task = {
        let locator = args.locator.clone();
        tokio::task::spawn_blocking(move || healer.heal(&locator, &baseline, &current))
    };
    let joined = match ctx.config().timeout_ms {
        Some(ms) => timeout(Duration::from_millis(ms), task)
            .await
            .map_err(|_| anyhow!("healing {} timed out after {} ms", args.locator, ms))?,
        None => task.await,
    };
    let results = joined.context("healing task failed")?;
    let elapsed = started.elapsed();

    if args.accept_top {
        if let (Some(history), Some(path), Some(top)) = (&history, &history_path, results.first()) {
            history.record_accepted(&args.locator, &current_url, top.clone());
            save_history(path, history).await?;
            info!(selector = %top.selector, path = %path.display(), "Recorded accepted locator");
        }
    }

    let report = HealReport {
        locator: args.locator,
        baseline_url,
        current_url,
        duration_ms: elapsed.as_secs_f64() * 1000.0,
        results,
        events: recorder.as_ref().map(|recorder| recorder.events()),
        metrics: args.trace.then(metrics::snapshot),
    };
    print_report(ctx.output(), &report)
}

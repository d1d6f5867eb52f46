use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use locator_heal::{parse_id_locator, HealingOrchestrator};
use selector_heal_cli::report::{node_label, CandidateReport, CandidateRow};

use crate::cli::context::CliContext;
use crate::cli::output::print_report;

#[derive(Args, Clone, Debug)]
pub struct CandidatesArgs {
    /// Locator that no longer matches, as `#id`
    #[arg(long)]
    pub locator: String,

    #[arg(long, value_name = "FILE")]
    pub baseline: PathBuf,

    #[arg(long, value_name = "FILE")]
    pub current: PathBuf,
}

pub async fn cmd_candidates(args: CandidatesArgs, ctx: &CliContext) -> Result<()> {
    let id = parse_id_locator(&args.locator).ok_or_else(|| {
        anyhow!(
            "unsupported locator {:?}: only #id locators can be resolved",
            args.locator
        )
    })?;

    let baseline = ctx
        .snapshot(&args.baseline)
        .await?
        .tree()
        .context("flattening baseline snapshot")?;
    let current = ctx
        .snapshot(&args.current)
        .await?
        .tree()
        .context("flattening current snapshot")?;

    let reference_id = baseline
        .find_by_id(id)
        .ok_or_else(|| anyhow!("{} not found in baseline snapshot", args.locator))?;
    let reference = baseline.node(reference_id);

    let orchestrator = HealingOrchestrator::with_options(ctx.config().heal.clone());
    let threshold = orchestrator.options().min_candidate_score;
    let candidates = orchestrator
        .score_candidates(reference, &current)
        .into_iter()
        .map(|candidate| CandidateRow {
            node: candidate.node.to_string(),
            label: node_label(current.node(candidate.node)),
            score: candidate.score,
            kept: candidate.score >= threshold,
            matched: candidate.matched,
        })
        .collect();

    let report = CandidateReport {
        locator: args.locator,
        reference: node_label(reference),
        min_candidate_score: threshold,
        candidates,
    };
    print_report(ctx.output(), &report)
}

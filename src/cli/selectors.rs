use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use locator_heal::synthesize;
use selector_heal_cli::report::{node_label, SelectorReport};

use crate::cli::context::CliContext;
use crate::cli::output::print_report;

#[derive(Args, Clone, Debug)]
pub struct SelectorsArgs {
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Element id (without `#`)
    #[arg(long)]
    pub id: String,
}

pub async fn cmd_selectors(args: SelectorsArgs, ctx: &CliContext) -> Result<()> {
    let tree = ctx
        .snapshot(&args.snapshot)
        .await?
        .tree()
        .context("flattening snapshot")?;
    let id = args.id.trim_start_matches('#');
    let node = tree
        .find_by_id(id)
        .ok_or_else(|| anyhow!("no element with id {:?} in {}", id, args.snapshot.display()))?;

    let report = SelectorReport {
        node: node.to_string(),
        label: node_label(tree.node(node)),
        selectors: synthesize(&tree, node),
    };
    print_report(ctx.output(), &report)
}

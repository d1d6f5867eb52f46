mod cli;

use anyhow::Result;

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(cli::app::run());
    // A heal abandoned by its timeout is still running on the blocking pool.
    runtime.shutdown_background();
    outcome
}

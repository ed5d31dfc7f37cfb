//! holmes-push CLI: upload a list file or a directory of samples to Holmes-Storage.

use anyhow::Result;
use holmes_push::engine::arg_parser::Cli;
use holmes_push::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse_args();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}

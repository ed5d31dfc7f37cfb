//! CLI command handler: merge config layers, set up logging and Ctrl+C, run the upload.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::engine::tools::normalize_base_url;
use crate::pipeline::run_pipeline;
use crate::utils::config::PackagePaths;
use crate::utils::push_toml::{apply_file_to_opts, load_push_toml};
use crate::utils::{apply_env_to_opts, load_dotenv, setup_logging};
use crate::{Opts, RunSummary};

/// Build [`Opts`]: defaults → config file → environment → CLI flags.
pub fn setup_opts(cli: &Cli, cwd: &Path) -> Result<Opts> {
    let mut opts = Opts::default();

    let config_path = match &cli.config {
        Some(p) => {
            if !p.is_file() {
                anyhow::bail!("Config file not found: {}", p.display());
            }
            Some(p.clone())
        }
        None => Some(cwd.join(PackagePaths::get().config_filename())).filter(|p| p.is_file()),
    };
    if let Some(path) = &config_path {
        let file = load_push_toml(path)?;
        apply_file_to_opts(&file, &mut opts);
    }

    load_dotenv(cwd)?;
    apply_env_to_opts(&mut opts);
    apply_cli_to_opts(cli, &mut opts);

    opts.upload.storage_url = normalize_base_url(&opts.upload.storage_url).unwrap_or_default();
    opts.upload.cfs_url = opts.upload.cfs_url.as_deref().and_then(normalize_base_url);
    Ok(opts)
}

fn apply_cli_to_opts(cli: &Cli, opts: &mut Opts) {
    if let Some(ref p) = cli.file {
        opts.list_file = Some(p.clone());
    }
    if let Some(ref p) = cli.dir {
        opts.dir = Some(p.clone());
    }
    if let Some(ref s) = cli.storage {
        opts.upload.storage_url = s.clone();
    }
    if let Some(ref s) = cli.cfs {
        opts.upload.cfs_url = Some(s.clone());
    }
    if let Some(ref s) = cli.mime {
        opts.mime_filter = s.clone();
    }
    if let Some(ref s) = cli.comment {
        opts.upload.comment = s.clone();
    }
    if let Some(ref s) = cli.src {
        opts.upload.source = s.clone();
    }
    if let Some(ref s) = cli.uid {
        opts.upload.user_id = s.clone();
    }
    if let Some(n) = cli.workers {
        opts.workers = n;
    }
    if let Some(b) = cli.rec {
        opts.recursive = b;
    }
    if let Some(b) = cli.insecure {
        opts.upload.insecure = b;
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    if let Some(b) = cli.follow_links {
        opts.follow_links = b;
    }
    if let Some(b) = cli.fail_fast {
        opts.fail_fast = b;
    }
    if let Some(secs) = cli.timeout {
        opts.upload.timeout = Some(Duration::from_secs(secs));
    }
    if let Some(b) = cli.verbose {
        opts.verbose = b;
    }
}

/// Run an upload from the command line. Fails when any sample did not make it.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("read working directory")?;
    let opts = setup_opts(cli, &cwd)?;
    setup_logging(opts.verbose);
    info!("Running...");

    if !opts.has_work() {
        warn!("Nothing to upload: pass --file and/or --dir.");
        return Ok(());
    }

    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_requested_handler = Arc::clone(&cancel_requested);
    ctrlc::set_handler(move || {
        if cancel_requested_handler.swap(true, Ordering::Relaxed) {
            // second Ctrl+C exits without waiting for in-flight requests
            warn!("Interrupted again, exiting");
            std::process::exit(130);
        }
        warn!("Cancelling: finishing in-flight uploads (Ctrl+C again to exit now)");
    })
    .context("set Ctrl+C handler")?;

    let summary = run_pipeline(&opts, Some(Arc::clone(&cancel_requested)))?;
    report_summary(&summary, opts.verbose);
    if cancel_requested.load(Ordering::Relaxed) {
        anyhow::bail!(
            "Upload cancelled by user; {} queued samples were not sent",
            summary.skipped
        );
    }
    if let Some(msg) = &summary.producer_error {
        anyhow::bail!("{}", msg);
    }
    if !summary.is_success() {
        anyhow::bail!(
            "{} of {} samples were not stored",
            summary.failed + summary.rejected,
            summary.dispatched
        );
    }
    Ok(())
}

fn report_summary(summary: &RunSummary, verbose: bool) {
    info!(
        "Done: {} dispatched, {} uploaded, {} rejected, {} failed, {} skipped",
        summary.dispatched, summary.uploaded, summary.rejected, summary.failed, summary.skipped
    );
    if !summary.failures.is_empty() {
        warn!("{} samples were not stored", summary.failures.len());
        if verbose {
            for (reference, reason) in &summary.failures {
                eprintln!("  not stored: {} ({})", reference, reason);
            }
        }
    }
    debug!("{:?}", summary);
}

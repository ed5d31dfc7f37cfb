use anyhow::Result;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::copier::copy_sample;
use crate::engine::tools::canonicalize_root;
use crate::utils::fd_limit::cap_workers;
use crate::{Opts, RunSummary};

use super::context::{
    Dispatcher, PipelineChannels, UploadFn, WalkContext, WorkerHandles, create_pipeline_channels,
};
use super::counter::WorkCounter;
use super::list::read_sample_list;
use super::walk::walk_samples;
use super::workers::{WorkerOpts, spawn_upload_workers};

/// Upload everything `opts` points at to Holmes-Storage.
/// `cancel`: when set to true, producers stop and workers drain the queue without uploading.
pub fn run_pipeline(opts: &Opts, cancel: Option<Arc<AtomicBool>>) -> Result<RunSummary> {
    if opts.upload.storage_url.trim().is_empty() {
        anyhow::bail!("No Holmes-Storage URL: pass --storage (or set it in the config file)");
    }
    let upload_opts = Arc::new(opts.upload.clone());
    debug!("Uploading to {}", upload_opts.samples_endpoint());
    let upload: UploadFn = Arc::new(move |reference: &str| copy_sample(&upload_opts, reference));
    run_pipeline_with(opts, upload, cancel)
}

/// Same as [`run_pipeline`] with a caller-provided upload function (one call per sample).
///
/// Starts the workers, runs the producers (list file, then directory), waits until the work
/// counter drains, then closes the queue, joins the workers and aggregates the outcomes.
pub fn run_pipeline_with(
    opts: &Opts,
    upload: UploadFn,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<RunSummary> {
    let num_workers = cap_workers(opts.workers);
    debug!("Upload workers: {}", num_workers);

    let PipelineChannels {
        sample_tx,
        sample_rx,
        outcome_tx,
        outcome_rx,
    } = create_pipeline_channels();
    let counter = Arc::new(WorkCounter::new());

    let worker_opts = WorkerOpts {
        fail_fast: opts.fail_fast,
        cancel: cancel.clone(),
    };
    let worker_handles = spawn_upload_workers(
        &sample_rx,
        &outcome_tx,
        &counter,
        upload,
        num_workers,
        &worker_opts,
    );
    // Workers own the remaining receivers/senders; the queue closes when the dispatcher drops.
    drop(sample_rx);
    drop(outcome_tx);

    let mut dispatcher = Dispatcher::new(sample_tx, Arc::clone(&counter), cancel.clone());
    let producer_error = run_producers(opts, &mut dispatcher)
        .err()
        .map(|e| format!("{:#}", e));
    if let Some(msg) = &producer_error {
        error!("{}", msg);
    }
    if dispatcher.is_cancelled() {
        warn!("Cancel requested; waiting for in-flight uploads to finish");
    }
    let dispatched = dispatcher.dispatched();

    counter.wait();
    debug!("main: work counter drained after {} samples", dispatched);
    drop(dispatcher);
    shutdown_workers(worker_handles);
    let cancelled = cancel.is_some_and(|c| c.load(Ordering::Relaxed));

    let mut summary = RunSummary {
        dispatched,
        cancelled,
        producer_error,
        ..Default::default()
    };
    for outcome in outcome_rx.iter() {
        summary.record(outcome);
    }
    Ok(summary)
}

/// Dispatch the list file, then the directory. Stops at the first producer error.
fn run_producers(opts: &Opts, dispatcher: &mut Dispatcher) -> Result<()> {
    if let Some(list) = &opts.list_file {
        let n = read_sample_list(list, |reference| dispatcher.dispatch(reference))?;
        info!("Queued {} samples from {}", n, list.display());
    }
    if dispatcher.is_cancelled() {
        return Ok(());
    }
    if let Some(dir) = &opts.dir {
        let root = canonicalize_root(dir)?;
        let ctx = WalkContext::new(root, opts);
        let stats = walk_samples(&ctx, |path| {
            match path.into_os_string().into_string() {
                Ok(reference) => dispatcher.dispatch(reference),
                Err(raw) => {
                    warn!("Skipping non UTF-8 path {}", PathBuf::from(raw).display());
                    true
                }
            }
        })?;
        info!(
            "Walked {}: {} files, {} queued, {} skipped, {} unreadable",
            ctx.root.display(),
            stats.files,
            stats.dispatched,
            stats.skipped,
            stats.sniff_errors
        );
    }
    Ok(())
}

/// Join worker threads after the queue has been closed.
pub fn shutdown_workers(worker_handles: WorkerHandles) {
    for h in worker_handles {
        let _ = h.join();
    }
}

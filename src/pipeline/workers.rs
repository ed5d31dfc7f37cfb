use crossbeam_channel::{Receiver, Sender};
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::{SampleRef, UploadOutcome};

use super::context::{UploadFn, WorkerHandles};
use super::counter::WorkCounter;

/// Marks one unit done even if the upload panics, so the main thread never waits forever.
struct DoneOnDrop<'a>(&'a WorkCounter);

impl Drop for DoneOnDrop<'_> {
    fn drop(&mut self) {
        self.0.done();
    }
}

/// Worker settings shared by the whole pool.
#[derive(Clone)]
pub struct WorkerOpts {
    pub fail_fast: bool,
    /// Once set, queued references are drained without uploading.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl WorkerOpts {
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Relaxed))
    }
}

/// Single upload worker: take references from sample_rx, upload, report on outcome_tx, mark done.
/// With `fail_fast`, the first failure ends the process like a fatal log.
fn upload_worker_loop(
    worker_id: usize,
    sample_rx: Receiver<SampleRef>,
    outcome_tx: Sender<UploadOutcome>,
    counter: Arc<WorkCounter>,
    upload: UploadFn,
    opts: WorkerOpts,
) {
    while let Ok(reference) = sample_rx.recv() {
        let _done = DoneOnDrop(&counter);
        if opts.is_cancelled() {
            debug!("worker {}: cancelled, dropping {}", worker_id, reference);
            let _ = outcome_tx.send(UploadOutcome::Cancelled { reference });
            continue;
        }
        debug!("worker {}: working on {}", worker_id, reference);
        let outcome = upload(&reference);
        if opts.fail_fast && let UploadOutcome::Failed { reference, error } = &outcome {
            error!("ERROR: {}: {}", reference, error);
            std::process::exit(1);
        }
        let _ = outcome_tx.send(outcome);
    }
    debug!("worker {}: channel closed, exiting", worker_id);
}

/// Spawn `num_workers` upload workers sharing one receiver. Workers exit once every sender
/// of `sample_rx` is dropped and the queue is empty.
pub fn spawn_upload_workers(
    sample_rx: &Receiver<SampleRef>,
    outcome_tx: &Sender<UploadOutcome>,
    counter: &Arc<WorkCounter>,
    upload: UploadFn,
    num_workers: usize,
    opts: &WorkerOpts,
) -> WorkerHandles {
    (0..num_workers)
        .map(|worker_id| {
            let sample_rx = sample_rx.clone();
            let outcome_tx = outcome_tx.clone();
            let counter = Arc::clone(counter);
            let upload = Arc::clone(&upload);
            let opts = opts.clone();
            thread::spawn(move || {
                upload_worker_loop(worker_id, sample_rx, outcome_tx, counter, upload, opts)
            })
        })
        .collect()
}

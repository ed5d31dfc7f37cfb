//! Pipeline context: channels, the dispatcher used by producers, and walk settings.

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crate::{Opts, SampleRef, UploadOutcome};

use super::counter::WorkCounter;

/// Uploads one reference and reports what happened. Called concurrently from every worker.
pub type UploadFn = Arc<dyn Fn(&str) -> UploadOutcome + Send + Sync>;

/// Settings the directory walk needs, taken from [`Opts`].
#[derive(Clone, Debug)]
pub struct WalkContext {
    /// Canonicalized root directory.
    pub root: PathBuf,
    pub recursive: bool,
    pub follow_links: bool,
    pub mime_filter: String,
    pub exclude: Vec<String>,
}

impl WalkContext {
    pub fn new(root: PathBuf, opts: &Opts) -> Self {
        Self {
            root,
            recursive: opts.recursive,
            follow_links: opts.follow_links,
            mime_filter: opts.mime_filter.clone(),
            exclude: opts.exclude.clone(),
        }
    }
}

/// Channels for the pool: references in, outcomes out. Both unbounded so producers never block.
pub struct PipelineChannels {
    pub sample_tx: Sender<SampleRef>,
    pub sample_rx: Receiver<SampleRef>,
    pub outcome_tx: Sender<UploadOutcome>,
    pub outcome_rx: Receiver<UploadOutcome>,
}

pub fn create_pipeline_channels() -> PipelineChannels {
    let (sample_tx, sample_rx) = unbounded::<SampleRef>();
    let (outcome_tx, outcome_rx) = unbounded::<UploadOutcome>();
    PipelineChannels {
        sample_tx,
        sample_rx,
        outcome_tx,
        outcome_rx,
    }
}

/// Handles returned by [`spawn_upload_workers`](super::spawn_upload_workers): join after the
/// dispatcher is dropped and the counter has drained.
pub type WorkerHandles = Vec<JoinHandle<()>>;

/// Producer side of the pool. Every reference goes through [`Dispatcher::dispatch`].
pub struct Dispatcher {
    sample_tx: Sender<SampleRef>,
    counter: Arc<WorkCounter>,
    cancel: Option<Arc<AtomicBool>>,
    dispatched: usize,
}

impl Dispatcher {
    pub fn new(
        sample_tx: Sender<SampleRef>,
        counter: Arc<WorkCounter>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            sample_tx,
            counter,
            cancel,
            dispatched: 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Relaxed))
    }

    /// Count the reference as outstanding, then hand it to the workers.
    /// Returns false when producers should stop (cancelled, or every worker is gone).
    pub fn dispatch(&mut self, reference: SampleRef) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.counter.add(1);
        if self.sample_tx.send(reference).is_err() {
            self.counter.done();
            return false;
        }
        self.dispatched += 1;
        true
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched
    }
}

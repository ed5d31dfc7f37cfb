//! Pipeline components: work counter, worker pool, producers (list file, directory walk), orchestrator.

pub mod context;
pub mod counter;
pub mod list;
pub mod orchestrator;
pub mod walk;
pub mod workers;

pub use context::{
    Dispatcher, PipelineChannels, UploadFn, WalkContext, WorkerHandles, create_pipeline_channels,
};
pub use counter::WorkCounter;
pub use list::{read_references, read_sample_list};
pub use orchestrator::{run_pipeline, run_pipeline_with, shutdown_workers};
pub use walk::{WalkOutcome, WalkStats, run_walk_loop, to_outcome_walkdir, walk_samples};
pub use workers::{WorkerOpts, spawn_upload_workers};

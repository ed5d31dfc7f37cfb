//! holmes-push: batch uploader of malware samples to Holmes-Storage

pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;

/// Result alias used by public holmes-push API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: upload every sample `opts` points at (list file, then directory).
///
/// Individual upload failures do not stop the run; they are counted in the returned
/// [`RunSummary`]. Errors are returned only for setup problems (missing storage URL) and
/// are otherwise recorded in [`RunSummary::producer_error`].
///
/// ```ignore
/// let mut opts = holmes_push::Opts::default();
/// opts.dir = Some("samples".into());
/// opts.upload.storage_url = "http://storage:8016".into();
/// let summary = holmes_push::push_samples(&opts)?;
/// assert!(summary.is_success());
/// ```
pub fn push_samples(opts: &Opts) -> Result<RunSummary> {
    let config_str = format!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    debug!("{}", config_str);
    pipeline::run_pipeline(opts, None)
}

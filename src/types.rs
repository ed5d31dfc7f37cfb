//! Public and internal types for the holmes-push API and pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// A sample reference as given on a list line or produced by the directory walk.
///
/// Either a local file path or an encoded CRITs document id (see [`crate::engine::doc_id`]).
pub type SampleRef = String;

/// Submission metadata attached to every upload as multipart form fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionMeta {
    pub user_id: String,
    pub source: String,
    /// Basename of the sample reference.
    pub name: String,
    /// Submission time, RFC 3339 with offset.
    pub date: String,
    pub comment: String,
}

impl SubmissionMeta {
    /// Form fields keyed by their wire name. Keys are unique by construction.
    pub fn to_fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("user_id".to_string(), self.user_id.clone()),
            ("source".to_string(), self.source.clone()),
            ("name".to_string(), self.name.clone()),
            ("date".to_string(), self.date.clone()),
            ("comment".to_string(), self.comment.clone()),
        ])
    }
}

/// Result of one upload attempt, as reported by a worker.
#[derive(Clone, Debug)]
pub enum UploadOutcome {
    /// The storage server answered. `status` may still be a non-2xx rejection.
    Uploaded {
        reference: SampleRef,
        status: u16,
        body: String,
    },
    /// Resolving, building or sending the request failed.
    Failed { reference: SampleRef, error: String },
    /// Dequeued after a cancel request; nothing was sent.
    Cancelled { reference: SampleRef },
}

impl UploadOutcome {
    pub fn reference(&self) -> &str {
        match self {
            UploadOutcome::Uploaded { reference, .. }
            | UploadOutcome::Failed { reference, .. }
            | UploadOutcome::Cancelled { reference } => reference,
        }
    }

    /// True for a 2xx answer from the storage server.
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { status, .. } if (200..300).contains(status))
    }
}

/// Aggregate of a whole run, built by the orchestrator after the work counter drains.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub dispatched: usize,
    pub uploaded: usize,
    /// Server answered with a non-2xx status.
    pub rejected: usize,
    pub failed: usize,
    /// Queued but not uploaded because of a cancel request.
    pub skipped: usize,
    /// A cancel was requested at some point during the run.
    pub cancelled: bool,
    /// First list/walk error; no further producers ran after it.
    pub producer_error: Option<String>,
    /// References whose upload did not succeed, with the reason.
    pub failures: Vec<(SampleRef, String)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.rejected == 0 && self.failed == 0 && !self.cancelled && self.producer_error.is_none()
    }

    pub(crate) fn record(&mut self, outcome: UploadOutcome) {
        match outcome {
            UploadOutcome::Uploaded { status, .. } if (200..300).contains(&status) => {
                self.uploaded += 1;
            }
            UploadOutcome::Uploaded {
                reference, status, ..
            } => {
                self.rejected += 1;
                self.failures.push((reference, format!("HTTP {status}")));
            }
            UploadOutcome::Failed { reference, error } => {
                self.failed += 1;
                self.failures.push((reference, error));
            }
            UploadOutcome::Cancelled { .. } => {
                self.skipped += 1;
            }
        }
    }
}

/// Settings for talking to Holmes-Storage and the CRITs file server. Immutable after startup.
#[derive(Clone, Debug)]
pub struct UploadOpts {
    /// Base URL of Holmes-Storage, e.g. `http://storage:8080`. Trailing `/` trimmed.
    pub storage_url: String,
    /// Base URL of the CRITs file server used as fallback. Trailing `/` trimmed.
    pub cfs_url: Option<String>,
    pub user_id: String,
    pub source: String,
    pub comment: String,
    /// Disable TLS certificate validation.
    pub insecure: bool,
    /// Per-request timeout. None = wait forever.
    pub timeout: Option<Duration>,
}

impl Default for UploadOpts {
    fn default() -> Self {
        Self {
            storage_url: String::new(),
            cfs_url: None,
            user_id: crate::utils::config::DEFAULT_USER_ID.to_string(),
            source: String::new(),
            comment: String::new(),
            insecure: false,
            timeout: None,
        }
    }
}

impl UploadOpts {
    /// Endpoint that receives the sample PUTs.
    pub fn samples_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.storage_url.trim_end_matches('/'),
            crate::utils::config::WireNames::SAMPLES_PATH
        )
    }

    /// CFS download URL for a hex document id, if a file server is configured.
    pub fn cfs_download_url(&self, hex_id: &str) -> Option<String> {
        self.cfs_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(|u| format!("{}/{}", u.trim_end_matches('/'), hex_id))
    }
}

/// Full options for one run (CLI, config file, or lib caller).
#[derive(Clone, Debug)]
pub struct Opts {
    /// List of sample references, one per line.
    pub list_file: Option<PathBuf>,
    /// Directory of samples to upload.
    pub dir: Option<PathBuf>,
    /// Descend into subdirectories of `dir`.
    pub recursive: bool,
    /// Content-type substring filter for directory mode. Empty = everything.
    pub mime_filter: String,
    /// Exclude patterns (glob syntax) for directory mode.
    pub exclude: Vec<String>,
    /// Follow symbolic links to directories while walking.
    pub follow_links: bool,
    /// Worker thread count.
    pub workers: usize,
    /// Terminate the process on the first failed upload.
    pub fail_fast: bool,
    pub verbose: bool,
    pub upload: UploadOpts,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            list_file: None,
            dir: None,
            recursive: false,
            mime_filter: String::new(),
            exclude: Vec::new(),
            follow_links: false,
            workers: crate::utils::config::DEFAULT_WORKERS,
            fail_fast: false,
            verbose: false,
            upload: UploadOpts::default(),
        }
    }
}

impl Opts {
    /// True if there is at least one source of samples.
    pub fn has_work(&self) -> bool {
        self.list_file.is_some() || self.dir.is_some()
    }
}

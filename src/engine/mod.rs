//! Engine module: CLI, sample resolution, request building and upload

pub mod arg_parser;
pub mod cli;
pub mod copier;
pub mod doc_id;
pub mod request;
pub mod sniff;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::{Cli, normalize_legacy_flags};
pub use cli::{handle_run, setup_opts};
pub use copier::{CopyError, copy_sample, format_date, http_client, submission_meta, try_copy_sample};
pub use doc_id::{DocumentId, IdError};
pub use request::{
    RequestError, SampleContent, SampleOrigin, UploadRequest, build_request, download_from_cfs,
    resolve_sample,
};
pub use sniff::{matches_filter, sniff_bytes, sniff_file};
pub use tools::{glob_match, normalize_base_url, reference_basename, should_include_in_walk};

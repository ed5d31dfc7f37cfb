pub mod config;
pub mod env;
pub mod fd_limit;
pub mod logger;
pub(crate) mod push_toml;

pub use config::*;
pub use env::{apply_env_to_opts, load_dotenv};
pub use fd_limit::{FDS_PER_WORKER, cap_workers, max_open_fds, max_workers_by_fd_limit};
pub use logger::setup_logging;

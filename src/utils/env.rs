//! Endpoint overrides from the environment: process env → `.env` in the working directory.

use anyhow::{Context, Result};
use std::path::Path;

use crate::Opts;
use crate::utils::config::EnvKeys;

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Load `.env` from `dir` if present (never overrides variables already set in the process).
pub fn load_dotenv(dir: &Path) -> Result<()> {
    let env_path = dir.join(".env");
    if env_path.is_file() {
        dotenvy::from_path(&env_path).with_context(|| format!("load {}", env_path.display()))?;
    }
    Ok(())
}

/// Apply `HOLMES_STORAGE` / `HOLMES_CFS` to opts when set. Call after the config file, before CLI.
pub fn apply_env_to_opts(opts: &mut Opts) {
    if let Some(storage) = non_empty_var(EnvKeys::STORAGE) {
        opts.upload.storage_url = storage;
    }
    if let Some(cfs) = non_empty_var(EnvKeys::CFS) {
        opts.upload.cfs_url = Some(cfs);
    }
}

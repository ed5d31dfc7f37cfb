//! Application configuration constants.
//! Defaults, wire names and tuning in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!("{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Config file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Defaults ----

/// User ID sent when none is configured.
pub const DEFAULT_USER_ID: &str = "-1";

/// Worker thread count when none is configured.
pub const DEFAULT_WORKERS: usize = 1;

// ---- Environment ----

/// Environment variables read after `.env` is loaded. They override the config file, not the CLI.
pub struct EnvKeys;

impl EnvKeys {
    pub const STORAGE: &'static str = "HOLMES_STORAGE";
    pub const CFS: &'static str = "HOLMES_CFS";
}

// ---- Wire format ----

/// Names used on the Holmes-Storage multipart upload.
pub struct WireNames;

impl WireNames {
    /// Path appended to the storage base URL.
    pub const SAMPLES_PATH: &'static str = "/samples/";
    /// Multipart field carrying the file content.
    pub const SAMPLE_FIELD: &'static str = "sample";
    /// Content type of the file part.
    pub const SAMPLE_CONTENT_TYPE: &'static str = "application/octet-stream";
}

// ---- Sniffing ----

/// Content-type sniffing limits and fallbacks.
pub struct SniffConsts;

impl SniffConsts {
    /// Bytes read from the head of a file for magic detection (8 KB).
    pub const HEADER_LEN: usize = 8 * 1024;
    pub const EMPTY: &'static str = "application/x-empty";
    pub const TEXT: &'static str = "text/plain";
    pub const BINARY: &'static str = "application/octet-stream";
}

//! Load `holmes-push.toml` (CLI only). Lib callers build [`Opts`] directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Opts;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PushToml {
    #[serde(default)]
    upload: UploadSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct UploadSection {
    storage: Option<String>,
    cfs: Option<String>,
    uid: Option<String>,
    src: Option<String>,
    comment: Option<String>,
    mime: Option<String>,
    file: Option<String>,
    dir: Option<String>,
    rec: Option<bool>,
    workers: Option<usize>,
    insecure: Option<bool>,
    timeout: Option<u64>,
    exclude: Option<Vec<String>>,
    follow_links: Option<bool>,
    fail_fast: Option<bool>,
    verbose: Option<bool>,
}

/// Load the config file at `path`. A file that exists but does not parse is an error.
pub(crate) fn load_push_toml(path: &Path) -> Result<PushToml> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    parse_push_toml(&s).with_context(|| format!("parse config {}", path.display()))
}

pub(crate) fn parse_push_toml(s: &str) -> std::result::Result<PushToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $($opts_field:ident).+) => {
        if let Some(ref v) = $sec.$sec_field {
            $opts.$($opts_field).+ = v.clone();
        }
    };
}

/// Apply file config to opts (only set fields present in the file). Call before env and CLI.
pub(crate) fn apply_file_to_opts(file: &PushToml, opts: &mut Opts) {
    let sec = &file.upload;
    apply_file_opt!(sec, opts, storage => upload.storage_url);
    if let Some(ref cfs) = sec.cfs {
        opts.upload.cfs_url = Some(cfs.clone());
    }
    apply_file_opt!(sec, opts, uid => upload.user_id);
    apply_file_opt!(sec, opts, src => upload.source);
    apply_file_opt!(sec, opts, comment => upload.comment);
    apply_file_opt!(sec, opts, mime => mime_filter);
    if let Some(ref p) = sec.file {
        opts.list_file = Some(PathBuf::from(p));
    }
    if let Some(ref p) = sec.dir {
        opts.dir = Some(PathBuf::from(p));
    }
    apply_file_opt!(sec, opts, rec => recursive);
    apply_file_opt!(sec, opts, workers => workers);
    apply_file_opt!(sec, opts, insecure => upload.insecure);
    if let Some(secs) = sec.timeout {
        opts.upload.timeout = Some(Duration::from_secs(secs));
    }
    apply_file_opt!(sec, opts, exclude => exclude);
    apply_file_opt!(sec, opts, follow_links => follow_links);
    apply_file_opt!(sec, opts, fail_fast => fail_fast);
    apply_file_opt!(sec, opts, verbose => verbose);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_present_fields() {
        let file = parse_push_toml(
            r#"
            [upload]
            storage = "http://storage:8080"
            workers = 4
            rec = true
            timeout = 30
            "#,
        )
        .unwrap();
        let mut opts = Opts::default();
        opts.upload.source = "kept".to_string();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.upload.storage_url, "http://storage:8080");
        assert_eq!(opts.workers, 4);
        assert!(opts.recursive);
        assert_eq!(opts.upload.timeout, Some(Duration::from_secs(30)));
        assert_eq!(opts.upload.source, "kept");
        assert_eq!(opts.upload.user_id, "-1");
    }

    #[test]
    fn test_missing_section_is_empty() {
        let file = parse_push_toml("").unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert!(opts.upload.storage_url.is_empty());
        assert!(!opts.has_work());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_push_toml("[upload]\nstorge = \"typo\"\n").is_err());
    }
}

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Upload samples to Holmes-Storage from a list file, a directory, or a CRITs file server.
#[derive(Clone, Debug, Parser)]
#[command(name = "holmes-push")]
#[command(
    about = "Upload samples to Holmes-Storage from a list file, a directory, or a CRITs file server."
)]
pub struct Cli {
    /// List of samples (MD5, SHAx, CRITs ID) to upload. Files are first searched locally; if not found and --cfs is set, they are taken from there.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Full URL to your CRITs file server, used as a fallback.
    #[arg(long, value_name = "URL")]
    pub cfs: Option<String>,

    /// Full URL to your Holmes-Storage server, i.e. 'http://storage:8080'.
    #[arg(long, value_name = "URL")]
    pub storage: Option<String>,

    /// Only upload files whose detected mime-type contains this substring.
    #[arg(long, value_name = "PATTERN")]
    pub mime: Option<String>,

    /// Directory of samples to upload.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Comment of submitter.
    #[arg(long)]
    pub comment: Option<String>,

    /// Source information for the files.
    #[arg(long)]
    pub src: Option<String>,

    /// User ID of submitter. Default: -1.
    #[arg(long)]
    pub uid: Option<String>,

    /// Number of parallel workers. Default: 1.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Iterate the directory given with --dir recursively.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub rec: Option<bool>,

    /// Disable certificate checking.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub insecure: Option<bool>,

    /// Exclude patterns (glob syntax) in directory mode. Can specify multiple: -e pattern1 pattern2
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Follow symbolic links to directories while walking.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Stop the whole run at the first failed upload.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub fail_fast: Option<bool>,

    /// Per-request timeout in seconds. Default: no timeout.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,

    /// Config file. Default: holmes-push.toml in the working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

/// Long options that may also be spelled with a single dash (`-file list.txt`, `-rec`).
const LEGACY_FLAGS: &[&str] = &[
    "file", "cfs", "storage", "mime", "dir", "comment", "src", "uid", "workers", "rec", "insecure",
];

impl Cli {
    /// Parse from the process arguments, accepting single-dash long flags.
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_legacy_flags(std::env::args_os()))
    }
}

/// Rewrite `-name` / `-name=value` into `--name` / `--name=value` for the known long flags.
/// Stops at a bare `--`; everything else passes through untouched.
pub fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;
    for arg in args {
        if passthrough {
            out.push(arg);
            continue;
        }
        let rewritten = arg.to_str().and_then(|s| {
            if s == "--" {
                passthrough = true;
                return None;
            }
            let rest = s.strip_prefix('-').filter(|r| !r.starts_with('-'))?;
            let name = rest.split('=').next().unwrap_or(rest);
            LEGACY_FLAGS
                .contains(&name)
                .then(|| OsString::from(format!("--{rest}")))
        });
        out.push(rewritten.unwrap_or(arg));
    }
    out
}

use clap::Parser;
use holmes_push::engine::{Cli, setup_opts};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn cli(args: &[&str]) -> Cli {
    let mut full = vec!["holmes-push"];
    full.extend_from_slice(args);
    Cli::try_parse_from(full).unwrap()
}

// --- defaults ---

#[test]
fn test_defaults_without_config_file() {
    let cwd = TempDir::new().unwrap();
    let opts = setup_opts(&cli(&["--storage", "http://storage:8016/"]), cwd.path()).unwrap();
    assert_eq!(opts.upload.storage_url, "http://storage:8016");
    assert_eq!(opts.upload.user_id, "-1");
    assert_eq!(opts.upload.cfs_url, None);
    assert_eq!(opts.upload.timeout, None);
    assert_eq!(opts.workers, 1);
    assert!(!opts.recursive);
    assert!(!opts.upload.insecure);
    assert!(!opts.has_work());
}

// --- config file layering ---

#[test]
fn test_config_file_in_cwd_is_picked_up() {
    let cwd = TempDir::new().unwrap();
    fs::write(
        cwd.path().join("holmes-push.toml"),
        "[upload]\nstorage = \"http://from-file:8016\"\nworkers = 6\nrec = true\nsrc = \"feed\"\n",
    )
    .unwrap();
    let opts = setup_opts(&cli(&["--dir", "samples"]), cwd.path()).unwrap();
    assert_eq!(opts.upload.storage_url, "http://from-file:8016");
    assert_eq!(opts.workers, 6);
    assert!(opts.recursive);
    assert_eq!(opts.upload.source, "feed");
    assert_eq!(opts.dir, Some(PathBuf::from("samples")));
}

#[test]
fn test_cli_overrides_config_file() {
    let cwd = TempDir::new().unwrap();
    fs::write(
        cwd.path().join("holmes-push.toml"),
        "[upload]\nstorage = \"http://from-file:8016\"\nworkers = 6\nrec = true\n",
    )
    .unwrap();
    let opts = setup_opts(
        &cli(&[
            "--storage",
            "http://from-cli:8016",
            "--workers",
            "2",
            "--rec",
            "false",
            "--timeout",
            "15",
        ]),
        cwd.path(),
    )
    .unwrap();
    assert_eq!(opts.upload.storage_url, "http://from-cli:8016");
    assert_eq!(opts.workers, 2);
    assert!(!opts.recursive);
    assert_eq!(opts.upload.timeout, Some(Duration::from_secs(15)));
}

#[test]
fn test_explicit_config_path() {
    let cwd = TempDir::new().unwrap();
    let cfg = cwd.path().join("elsewhere.toml");
    fs::write(&cfg, "[upload]\ncfs = \"http://crits/files/\"\nexclude = [\"*.txt\"]\n").unwrap();
    let opts = setup_opts(&cli(&["--config", cfg.to_str().unwrap()]), cwd.path()).unwrap();
    assert_eq!(opts.upload.cfs_url.as_deref(), Some("http://crits/files"));
    assert_eq!(opts.exclude, vec!["*.txt".to_string()]);
}

#[test]
fn test_explicit_config_must_exist() {
    let cwd = TempDir::new().unwrap();
    let err = setup_opts(&cli(&["--config", "/no/such/holmes-push.toml"]), cwd.path()).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_broken_config_is_an_error() {
    let cwd = TempDir::new().unwrap();
    fs::write(cwd.path().join("holmes-push.toml"), "[upload]\nworkers = \"many\"\n").unwrap();
    assert!(setup_opts(&cli(&[]), cwd.path()).is_err());
}

#[test]
fn test_blank_cfs_is_none() {
    let cwd = TempDir::new().unwrap();
    let opts = setup_opts(&cli(&["--cfs", "  "]), cwd.path()).unwrap();
    assert_eq!(opts.upload.cfs_url, None);
}

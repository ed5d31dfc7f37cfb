use holmes_push::Opts;
use holmes_push::engine::tools::canonicalize_root;
use holmes_push::pipeline::{WalkContext, WalkOutcome, WalkStats, run_walk_loop, walk_samples};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Layout:
///   a.bin        binary
///   doc.pdf      PDF magic
///   notes.txt    text
///   x/b.bin      binary
///   x/c.pdf      PDF magic
fn sample_tree() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("a.bin"), [0x01u8, 0x02, 0x00, 0x03, 0xff]).unwrap();
    fs::write(root.join("doc.pdf"), b"%PDF-1.4\n1 0 obj\n").unwrap();
    fs::write(root.join("notes.txt"), b"not a sample\n").unwrap();
    fs::create_dir(root.join("x")).unwrap();
    fs::write(root.join("x").join("b.bin"), [0x7fu8, 0x00, 0x10]).unwrap();
    fs::write(root.join("x").join("c.pdf"), b"%PDF-1.7\n").unwrap();
    let canonical = canonicalize_root(root).unwrap();
    (dir, canonical)
}

fn walk(root: &Path, opts: &Opts) -> (Vec<PathBuf>, WalkStats) {
    let ctx = WalkContext::new(root.to_path_buf(), opts);
    let mut seen = Vec::new();
    let stats = walk_samples(&ctx, |p| {
        seen.push(p);
        true
    })
    .unwrap();
    (seen, stats)
}

fn rel(root: &Path, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

// --- recursion ---

#[test]
fn test_walk_non_recursive_stays_in_root() {
    let (_dir, root) = sample_tree();
    let (seen, stats) = walk(&root, &Opts::default());
    assert_eq!(rel(&root, &seen), vec!["a.bin", "doc.pdf", "notes.txt"]);
    assert_eq!(stats.files, 3);
    assert_eq!(stats.dispatched, 3);
    assert_eq!(stats.skipped, 0);
}

#[test]
fn test_walk_recursive_descends() {
    let (_dir, root) = sample_tree();
    let opts = Opts {
        recursive: true,
        ..Default::default()
    };
    let (seen, _) = walk(&root, &opts);
    assert_eq!(
        rel(&root, &seen),
        vec!["a.bin", "doc.pdf", "notes.txt", "x/b.bin", "x/c.pdf"]
    );
}

#[test]
fn test_walk_dispatches_absolute_paths() {
    let (_dir, root) = sample_tree();
    let (seen, _) = walk(&root, &Opts::default());
    assert!(seen.iter().all(|p| p.is_absolute()));
}

// --- content filter ---

#[test]
fn test_walk_mime_filter() {
    let (_dir, root) = sample_tree();
    let opts = Opts {
        recursive: true,
        mime_filter: "pdf".to_string(),
        ..Default::default()
    };
    let (seen, stats) = walk(&root, &opts);
    assert_eq!(rel(&root, &seen), vec!["doc.pdf", "x/c.pdf"]);
    assert_eq!(stats.files, 5);
    assert_eq!(stats.dispatched, 2);
    assert_eq!(stats.skipped, 3);
}

#[test]
fn test_walk_filter_uses_content_not_extension() {
    let (_dir, root) = sample_tree();
    fs::write(root.join("renamed.txt"), b"%PDF-1.5\n").unwrap();
    let opts = Opts {
        mime_filter: "application/pdf".to_string(),
        ..Default::default()
    };
    let (seen, _) = walk(&root, &opts);
    assert_eq!(rel(&root, &seen), vec!["doc.pdf", "renamed.txt"]);
}

#[test]
fn test_walk_filter_matching_nothing() {
    let (_dir, root) = sample_tree();
    let opts = Opts {
        recursive: true,
        mime_filter: "video/".to_string(),
        ..Default::default()
    };
    let (seen, stats) = walk(&root, &opts);
    assert!(seen.is_empty());
    assert_eq!(stats.skipped, 5);
}

// --- exclude ---

#[test]
fn test_walk_exclude_by_name() {
    let (_dir, root) = sample_tree();
    let opts = Opts {
        recursive: true,
        exclude: vec!["*.txt".to_string()],
        ..Default::default()
    };
    let (seen, stats) = walk(&root, &opts);
    assert_eq!(
        rel(&root, &seen),
        vec!["a.bin", "doc.pdf", "x/b.bin", "x/c.pdf"]
    );
    assert_eq!(stats.files, 4);
}

#[test]
fn test_walk_exclude_directory_prunes_subtree() {
    let (_dir, root) = sample_tree();
    let opts = Opts {
        recursive: true,
        exclude: vec!["x".to_string()],
        ..Default::default()
    };
    let (seen, _) = walk(&root, &opts);
    assert_eq!(rel(&root, &seen), vec!["a.bin", "doc.pdf", "notes.txt"]);
}

// --- stopping / errors ---

#[test]
fn test_walk_stops_when_callback_refuses() {
    let (_dir, root) = sample_tree();
    let ctx = WalkContext::new(root.clone(), &Opts::default());
    let mut seen = Vec::new();
    let stats = walk_samples(&ctx, |p| {
        seen.push(p);
        seen.len() < 2
    })
    .unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(stats.dispatched, 1);
}

#[test]
fn test_walk_missing_root_fails() {
    let dir = TempDir::new().unwrap();
    let ctx = WalkContext::new(dir.path().join("gone"), &Opts::default());
    let err = walk_samples(&ctx, |_| true).unwrap_err();
    assert!(err.to_string().contains("walk error"));
}

#[test]
fn test_canonicalize_root_rejects_file() {
    let (_dir, root) = sample_tree();
    assert!(canonicalize_root(&root.join("a.bin")).is_err());
    assert!(canonicalize_root(&root.join("missing")).is_err());
}

#[cfg(unix)]
#[test]
fn test_walk_symlink_to_file_is_a_sample() {
    let (_dir, root) = sample_tree();
    std::os::unix::fs::symlink(root.join("doc.pdf"), root.join("link.pdf")).unwrap();
    let opts = Opts {
        mime_filter: "pdf".to_string(),
        ..Default::default()
    };
    let (seen, _) = walk(&root, &opts);
    assert_eq!(rel(&root, &seen), vec!["doc.pdf", "link.pdf"]);
}

// --- run_walk_loop ---

#[test]
fn test_walk_loop_unreadable_file_is_skipped() {
    let (_dir, root) = sample_tree();
    let gone = root.join("vanished.bin");
    let outcomes = vec![
        WalkOutcome::File(root.join("a.bin")),
        WalkOutcome::File(gone),
        WalkOutcome::Other,
        WalkOutcome::File(root.join("doc.pdf")),
    ];
    let ctx = WalkContext::new(root.clone(), &Opts::default());
    let mut seen = Vec::new();
    let stats = run_walk_loop(&ctx, outcomes.into_iter(), |p| {
        seen.push(p);
        true
    })
    .unwrap();
    assert_eq!(stats.sniff_errors, 1);
    assert_eq!(stats.files, 3);
    assert_eq!(stats.dispatched, 2);
    assert_eq!(rel(&root, &seen), vec!["a.bin", "doc.pdf"]);
}

#[test]
fn test_walk_loop_traversal_error_aborts_after_earlier_dispatches() {
    let (_dir, root) = sample_tree();
    let locked = root.join("locked");
    let outcomes = vec![
        WalkOutcome::File(root.join("a.bin")),
        WalkOutcome::Err {
            msg: "permission denied".to_string(),
            path: Some(locked.clone()),
        },
        WalkOutcome::File(root.join("doc.pdf")),
    ];
    let ctx = WalkContext::new(root.clone(), &Opts::default());
    let mut seen = Vec::new();
    let err = run_walk_loop(&ctx, outcomes.into_iter(), |p| {
        seen.push(p);
        true
    })
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("walk error"));
    assert!(msg.contains("permission denied"));
    assert!(msg.contains(&locked.display().to_string()));
    assert_eq!(rel(&root, &seen), vec!["a.bin"]);
}

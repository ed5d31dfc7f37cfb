//! Directory walk: visit files under the root, sniff their content type, dispatch the ones that
//! match the filter. A traversal error aborts the walk; a sniff error only skips the file.

use anyhow::Result;
use log::{debug, info, warn};
use std::path::PathBuf;

use crate::engine::sniff::{matches_filter, sniff_file};
use crate::engine::tools::should_include_in_walk;

use super::context::WalkContext;

/// One result from the directory walk.
pub enum WalkOutcome {
    /// A regular file (or a symlink to one).
    File(PathBuf),
    /// Directory or anything else that is not uploaded.
    Other,
    Err { msg: String, path: Option<PathBuf> },
}

/// Counters for one walk, logged when it finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub files: usize,
    pub dispatched: usize,
    pub skipped: usize,
    pub sniff_errors: usize,
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => {
            let ft = entry.file_type();
            if ft.is_file() || (ft.is_symlink() && entry.path().is_file()) {
                WalkOutcome::File(entry.into_path())
            } else {
                WalkOutcome::Other
            }
        }
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

/// Non-recursive walks stop at depth 1: the root is entered, its subdirectories are not.
fn walkdir_iter(ctx: &WalkContext) -> impl Iterator<Item = WalkOutcome> + '_ {
    let mut walker = walkdir::WalkDir::new(&ctx.root)
        .follow_links(ctx.follow_links)
        .sort_by_file_name();
    if !ctx.recursive {
        walker = walker.max_depth(1);
    }
    walker
        .into_iter()
        .filter_entry(move |e| {
            e.depth() == 0 || should_include_in_walk(e.path(), &ctx.root, &ctx.exclude)
        })
        .map(to_outcome_walkdir)
}

/// Walk `ctx.root` and call `on_sample` for every file whose content type matches the filter.
/// `on_sample` returns false to stop the walk early (e.g. cancelled).
pub fn walk_samples<F>(ctx: &WalkContext, on_sample: F) -> Result<WalkStats>
where
    F: FnMut(PathBuf) -> bool,
{
    run_walk_loop(ctx, walkdir_iter(ctx), on_sample)
}

/// Consume `iter`: classify each file, log the decision, hand matches to `on_sample`.
/// The first traversal error ends the loop and is returned.
pub fn run_walk_loop<I, F>(ctx: &WalkContext, iter: I, mut on_sample: F) -> Result<WalkStats>
where
    I: Iterator<Item = WalkOutcome>,
    F: FnMut(PathBuf) -> bool,
{
    let mut stats = WalkStats::default();
    for outcome in iter {
        match outcome {
            WalkOutcome::File(path) => {
                stats.files += 1;
                let mimetype = match sniff_file(&path) {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("mimetype error (skipping {}): {}", path.display(), e);
                        stats.sniff_errors += 1;
                        continue;
                    }
                };
                if matches_filter(&mimetype, &ctx.mime_filter) {
                    info!("Adding {} ({})", path.display(), mimetype);
                    if !on_sample(path) {
                        debug!("walk stopped by dispatcher");
                        break;
                    }
                    stats.dispatched += 1;
                } else {
                    info!("Skipping {} ({})", path.display(), mimetype);
                    stats.skipped += 1;
                }
            }
            WalkOutcome::Other => {}
            WalkOutcome::Err { msg, path } => {
                let at = path
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| ctx.root.display().to_string());
                anyhow::bail!("walk error at {}: {}", at, msg);
            }
        }
    }
    debug!("walk of {} done: {:?}", ctx.root.display(), stats);
    Ok(stats)
}

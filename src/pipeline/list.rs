//! Sample list file: one reference per line.

use anyhow::{Context, Result};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::SampleRef;

/// Read references from `path` and hand each to `on_sample`. Returns how many were handed over.
pub fn read_sample_list<F>(path: &Path, on_sample: F) -> Result<usize>
where
    F: FnMut(SampleRef) -> bool,
{
    let file = File::open(path)
        .with_context(|| format!("Couldn't open file containing sample list {}", path.display()))?;
    read_references(file, on_sample)
        .with_context(|| format!("read sample list {}", path.display()))
}

/// Line-by-line reader behind [`read_sample_list`]. `\n` and `\r\n` endings are both accepted;
/// blank lines are skipped. `on_sample` returns false to stop early.
pub fn read_references<R, F>(reader: R, mut on_sample: F) -> Result<usize>
where
    R: Read,
    F: FnMut(SampleRef) -> bool,
{
    let mut count = 0_usize;
    for line in BufReader::new(reader).lines() {
        let reference = line?;
        if reference.trim().is_empty() {
            continue;
        }
        if !on_sample(reference) {
            debug!("list reading stopped by dispatcher after {} samples", count);
            break;
        }
        count += 1;
    }
    Ok(count)
}

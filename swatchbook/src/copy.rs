use std::fs;
use std::path::Path;

use swatch::error;
use swatch::error::{Chainable, Fault, Result};
use swatch::value::Sink;

use crate::config::CopyRule;

/// Name of the file holding the time of the last successful build.
pub const LATEST_CHANGE: &str = "latest-change.txt";

/// Copies every rule's source below `root` to its destination below
/// `public`, byte for byte. Missing sources are skipped.
pub fn copy_all(root: &Path, public: &Path, rules: &[CopyRule]) -> Result<usize> {
    let mut copied = 0;
    for rule in rules {
        let (from, to) = (root.join(&rule.from), public.join(&rule.to));
        if !from.is_file() {
            tracing::debug!(from = %from.display(), "copy source does not exist; skipping");
            continue;
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)
                .chain_with(|| error!("failed to create copy destination", "directory" => parent.display()))
                .fault(Fault::OutputWrite)?;
        }

        fs::copy(&from, &to)
            .chain_with(|| error! {
                "failed to copy file",
                "from" => from.display(),
                "to" => to.display(),
            })
            .fault(Fault::OutputWrite)?;

        copied += 1;
    }

    Ok(copied)
}

/// Records `timestamp` in [`LATEST_CHANGE`] inside `public`, which must exist.
pub fn stamp(public: &Path, timestamp: i64) -> Result<()> {
    if !public.is_dir() {
        return Err(error!("public directory does not exist", "path" => public.display()))
            .fault(Fault::OutputWrite);
    }

    public.join(LATEST_CHANGE).write(&timestamp.to_string())
}

use std::path::{Path, PathBuf};

use swatch::err;
use swatch::error::Result;

/// Resolves `path` against `root`. If `must_exist`, the result must be an
/// existing directory. Otherwise the result is `None` when nothing is there.
#[track_caller]
pub fn dircheck<P: AsRef<Path>>(root: &Path, path: P, must_exist: bool) -> Result<Option<PathBuf>> {
    let path = root.join(path);
    match (path.exists(), path.is_dir(), must_exist) {
        (_, true, _) => Ok(Some(path)),
        (false, _, false) => Ok(None),
        (true, false, _) => err! {
            "path must point to a directory",
            "path is not a directory" => path.display(),
        },
        (false, _, true) => err! {
            "path must point to an existing directory",
            "path does not exist" => path.display(),
        },
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Chainable, Result};
use crate::index::PatternIndex;
use crate::value::Source;

/// Maps template names to template source.
pub trait Loader: Send + Sync + 'static {
    /// Returns the source of `name`, or `None` if the loader has no template
    /// by that name.
    fn load(&self, name: &str) -> Result<Option<String>>;
}

/// Resolves pattern templates by canonical id or by `type-name` shorthand.
/// Hidden entries resolve like any other, so they can be included.
#[derive(Debug, Clone)]
pub struct PatternLoader {
    index: Arc<PatternIndex>,
}

impl PatternLoader {
    pub fn new(index: Arc<PatternIndex>) -> Self {
        PatternLoader { index }
    }
}

impl Loader for PatternLoader {
    fn load(&self, name: &str) -> Result<Option<String>> {
        let Some(entry) = self.index.resolve(name) else {
            return Ok(None);
        };

        entry.path.as_ref().read()
            .chain_with(|| error! {
                "failed to load pattern template",
                "pattern" => entry.id,
                "source" => entry.source_path.display(),
            })
            .map(Some)
    }
}

/// Resolves templates as relative paths below a list of directories, the
/// first directory containing the name winning.
#[derive(Debug, Clone)]
pub struct DirLoader {
    roots: Vec<PathBuf>,
}

impl DirLoader {
    pub fn new<I: IntoIterator<Item = PathBuf>>(roots: I) -> Self {
        DirLoader { roots: roots.into_iter().collect() }
    }
}

impl Loader for DirLoader {
    fn load(&self, name: &str) -> Result<Option<String>> {
        if Path::new(name).is_absolute() || name.split(['/', '\\']).any(|part| part == "..") {
            return err!("template names may not leave the template root", "name" => name);
        }

        for root in &self.roots {
            let path = root.join(name);
            if path.is_file() {
                return path.as_path().read().map(Some);
            }
        }

        Ok(None)
    }
}

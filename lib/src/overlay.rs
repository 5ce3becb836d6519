//! Data templates are rendered with.
//!
//! Author data comes from one global document plus optional per-pattern JSON
//! files sitting next to templates. The engine derives two more pieces of
//! data, demo list items and links to every pattern page, and keeps those in
//! a [`Reserved`] namespace of their own so they can never collide with, or be
//! clobbered by, author keys.

use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{Fault, Result, Chainable};
use crate::fstree::EntryId;
use crate::ident::Identifier;
use crate::index::{PatternEntry, PatternIndex};
use crate::templating::RESERVED_NAMESPACE;
use crate::value::{Dict, Format, Json, Source, Value};

/// Keys of the generated demo lists; the `k`-th key holds `k` items.
pub const LIST_KEYS: [&str; 10] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// Engine-generated data, exposed to templates under
/// [`RESERVED_NAMESPACE`](crate::templating::RESERVED_NAMESPACE).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reserved {
    #[serde(rename = "listItems")]
    pub list_items: Dict,
    /// Pattern id or unambiguous `type-name` shorthand to page URL.
    pub link: Dict,
}

/// Where the resolver finds its input.
#[derive(Debug, Clone, Copy)]
pub struct DataSources<'a> {
    /// The global data document. May not exist.
    pub global: &'a Path,
    /// A JSON array of demo list items. May not exist.
    pub list_items: &'a Path,
    /// Prefix of every generated pattern URL.
    pub url_root: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataOverlay {
    pub global: Arc<Dict>,
    pub reserved: Reserved,
    /// Overrides applied when a pattern is rendered as a page of its own,
    /// keyed by the pattern's template name (its canonical id).
    pub per_pattern: FxHashMap<Arc<str>, Arc<Dict>>,
}

impl DataOverlay {
    pub fn resolve(index: &PatternIndex, sources: DataSources<'_>) -> Result<Self> {
        Self::resolve_with(index, sources, &mut rand::rng())
    }

    /// Like [`DataOverlay::resolve()`] with an explicit source of randomness
    /// for the demo lists.
    pub fn resolve_with<R>(index: &PatternIndex, sources: DataSources<'_>, rng: &mut R) -> Result<Self>
        where R: Rng + ?Sized
    {
        let global = read_dict(sources.global)?.unwrap_or_default();
        if global.contains_key(RESERVED_NAMESPACE) {
            tracing::warn!(key = RESERVED_NAMESPACE, path = %sources.global.display(),
                "global data defines the reserved namespace key; it hides engine data in templates");
        }

        let list_items = match sources.list_items.read_if_exists()? {
            Some(string) => {
                let items = Json::read::<_, Value>(string)
                    .chain_with(|| error!("invalid list item data", "path" => sources.list_items.display()))
                    .fault(Fault::SourceData)?;

                list_items(demo_source(items, sources.list_items)?, rng)
            }
            None => Dict::new(),
        };

        Ok(DataOverlay {
            global: Arc::new(global),
            reserved: Reserved { list_items, link: links(index, sources.url_root) },
            per_pattern: per_pattern(index)?,
        })
    }

    /// The context `entry` is rendered with as a page of its own: global data
    /// with the entry's overrides on top.
    pub fn context_for(&self, entry: &PatternEntry) -> Value {
        Value::overlay(&self.global, self.per_pattern.get(&entry.id))
    }
}

/// Parses the JSON object at `path`, or `None` if there's no file there.
fn read_dict(path: &Path) -> Result<Option<Dict>> {
    let Some(string) = path.read_if_exists()? else {
        tracing::debug!(path = %path.display(), "no data document; using empty data");
        return Ok(None);
    };

    let value = Json::read::<_, Value>(string)
        .chain_with(|| error!("invalid data document", "path" => path.display()))
        .fault(Fault::SourceData)?;

    match value.into_dict() {
        Ok(dict) => Ok(Some(Arc::unwrap_or_clone(dict))),
        Err(v) => err! {
            "data document must be a JSON object",
            "path" => path.display(),
            "found" => v.kind(),
        }.fault(Fault::SourceData),
    }
}

fn demo_source(value: Value, path: &Path) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(Arc::unwrap_or_clone(items)),
        Value::Dict(dict) => Ok(dict.values().cloned().collect()),
        v => err! {
            "list item data must be a JSON array",
            "path" => path.display(),
            "found" => v.kind(),
        }.fault(Fault::SourceData),
    }
}

/// For every `k` in `1..=10` with `k <= items.len()`, shuffles all of `items`
/// anew and keeps the first `k` under the `k`-th word key. Keys for sizes the
/// source can't fill are left out.
pub fn list_items<R: Rng + ?Sized>(mut items: Vec<Value>, rng: &mut R) -> Dict {
    let mut lists = Dict::new();
    for (i, key) in LIST_KEYS.iter().enumerate() {
        let size = i + 1;
        if size > items.len() {
            tracing::debug!(available = items.len(), "not enough list items for `{key}`");
            break;
        }

        items.shuffle(rng);
        lists.insert((*key).into(), items[..size].iter().cloned().collect());
    }

    lists
}

fn links(index: &PatternIndex, url_root: &str) -> Dict {
    let mut links = Dict::new();
    for entry in index.public_entries() {
        let url: Value = entry.url(url_root).into();
        let shorthand = entry.ident.shorthand();
        if shorthand != *entry.id && index.is_unambiguous(&shorthand) {
            links.insert(shorthand.into(), url.clone());
        }

        links.insert(entry.id.clone(), url);
    }

    links
}

/// Finds `.json` files laid out like templates whose identifier matches an
/// indexed entry of the same type.
fn per_pattern(index: &PatternIndex) -> Result<FxHashMap<Arc<str>, Arc<Dict>>> {
    let tree = &index.tree;
    let mut overrides = FxHashMap::default();
    for pattern_type in &index.types {
        // Data sits where the type's templates do.
        let dirs: Vec<EntryId> = if pattern_type.is_flat() {
            vec![pattern_type.dir]
        } else {
            pattern_type.subtypes.iter().map(|s| s.dir).collect()
        };

        for dir in dirs {
            for file in tree.files_with_ext(dir, "json") {
                let entry = Identifier::parse(file.relative_path())
                    .and_then(|ident| index.get(pattern_type.key(), &ident.canonical_id()));

                let Some(entry) = entry else {
                    tracing::debug!(path = %file.path.display(), "data file matches no pattern");
                    continue;
                };

                let data = read_dict(&file.path)?.unwrap_or_default();
                overrides.insert(entry.id.clone(), Arc::new(data));
            }
        }
    }

    Ok(overrides)
}

#[cfg(test)] static_assertions::assert_impl_all!(DataOverlay: Send, Sync);

use std::path::{Path, PathBuf};
use std::sync::Arc;

use derive_more::Debug;
use rustc_hash::FxHashMap;

use crate::error::{Fault, Result, Chainable};
use crate::fstree::{Entry, EntryId, FsTree};
use crate::ident::{Identifier, Segment};

/// One renderable template file.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    pub ident: Identifier,
    /// `ident.canonical_id()`, computed once.
    pub id: Arc<str>,
    /// Path relative to the patterns root with every prefix intact.
    pub source_path: PathBuf,
    /// Absolute path of the template file.
    pub path: Arc<Path>,
    /// Hidden entries can be included by other patterns but are never
    /// rendered, listed, or aggregated on their own.
    pub partial: bool,
}

impl PatternEntry {
    pub fn type_key(&self) -> &str {
        self.ident.type_key()
    }

    pub fn output_path(&self) -> String {
        self.ident.output_path()
    }

    pub fn url(&self, root: &str) -> String {
        self.ident.url(root)
    }

    /// Title-cased display name of the template.
    pub fn title(&self) -> String {
        self.ident.name.title()
    }

    /// `true` if the entry belongs to the subtype with clean name `subtype`.
    pub fn in_subtype(&self, subtype: &str) -> bool {
        self.ident.subtype.as_ref().map_or(false, |s| &*s.clean == subtype)
    }
}

/// A second-level grouping directory.
#[derive(Debug, Clone)]
pub struct PatternSubType {
    pub segment: Segment,
    pub dir: EntryId,
}

/// A top-level category directory, along with everything found inside it.
#[derive(Debug, Clone)]
pub struct PatternType {
    pub segment: Segment,
    pub dir: EntryId,
    /// Empty for a flat type.
    pub subtypes: Vec<PatternSubType>,
    /// In discovery order: by subtype, then by file name.
    pub entries: Vec<Arc<PatternEntry>>,
}

impl PatternType {
    /// The clean name the type is indexed by.
    pub fn key(&self) -> &str {
        &self.segment.clean
    }

    pub fn is_flat(&self) -> bool {
        self.subtypes.is_empty()
    }

    pub fn is_hidden(&self) -> bool {
        self.segment.is_hidden()
    }

    /// Entries of `subtype` in discovery order.
    pub fn entries_in<'a>(&'a self, subtype: &'a str) -> impl Iterator<Item = &'a Arc<PatternEntry>> + 'a {
        self.entries.iter().filter(move |e| e.in_subtype(subtype))
    }
}

/// Every pattern in the source tree, addressable by type and canonical id.
///
/// Built once per run by [`PatternIndex::build()`] and never mutated after.
#[derive(Debug)]
pub struct PatternIndex {
    #[debug(ignore)]
    pub tree: Arc<FsTree>,
    pub template_ext: Arc<str>,
    pub types: Vec<PatternType>,
    by_type: FxHashMap<Arc<str>, usize>,
    by_id: FxHashMap<Arc<str>, Arc<PatternEntry>>,
    /// `None` when more than one entry shares the shorthand.
    by_shorthand: FxHashMap<Arc<str>, Option<Arc<PatternEntry>>>,
}

impl PatternIndex {
    /// Walks the patterns root, indexing every file with extension
    /// `template_ext`.
    pub fn build<P: AsRef<Path>>(root: P, template_ext: &str) -> Result<Self> {
        let tree = FsTree::build(root.as_ref())
            .chain_with(|| "failed to scan the patterns directory")?;

        Self::from_tree(Arc::new(tree), template_ext)
    }

    pub fn from_tree(tree: Arc<FsTree>, template_ext: &str) -> Result<Self> {
        let mut index = PatternIndex {
            tree: tree.clone(),
            template_ext: template_ext.into(),
            types: vec![],
            by_type: FxHashMap::default(),
            by_id: FxHashMap::default(),
            by_shorthand: FxHashMap::default(),
        };

        for dir in tree.dirs(tree.root_id()) {
            index.add_type(dir)?;
        }

        for (shorthand, entry) in &index.by_shorthand {
            if entry.is_none() {
                tracing::warn!(%shorthand, "shorthand is shared by several patterns; use the full id");
            }
        }

        tracing::debug!(types = index.types.len(), patterns = index.by_id.len(), "indexed patterns");
        Ok(index)
    }

    fn add_type(&mut self, dir: &Entry) -> Result<()> {
        let segment = Segment::new(&dir.file_name);
        if let Some(&i) = self.by_type.get(&*segment.clean) {
            let existing = &self.tree[self.types[i].dir];
            return err! {
                "two pattern type directories share a name",
                "type" => segment.clean,
                "first directory" => existing.path.display(),
                "second directory" => dir.path.display(),
            }.fault(Fault::IdentifierCollision);
        }

        let (tree, ext) = (self.tree.clone(), self.template_ext.clone());
        let subtypes: Vec<_> = tree.dirs(dir.id)
            .map(|sub| PatternSubType { segment: Segment::new(&sub.file_name), dir: sub.id })
            .collect();

        for (i, subtype) in subtypes.iter().enumerate() {
            let clean = &subtype.segment.clean;
            if let Some(first) = subtypes[..i].iter().find(|s| &s.segment.clean == clean) {
                return err! {
                    "two pattern subtype directories share a name",
                    "type" => segment.clean,
                    "subtype" => clean,
                    "first directory" => tree[first.dir].path.display(),
                    "second directory" => tree[subtype.dir].path.display(),
                }.fault(Fault::IdentifierCollision);
            }
        }

        let mut entries = vec![];
        if subtypes.is_empty() {
            for file in tree.files_with_ext(dir.id, &ext) {
                entries.push(self.add_entry(file)?);
            }
        } else {
            for stray in tree.files_with_ext(dir.id, &ext) {
                tracing::warn!(path = %stray.path.display(),
                    "ignoring template placed beside subtype directories");
            }

            for subtype in &subtypes {
                for file in tree.files_with_ext(subtype.dir, &ext) {
                    entries.push(self.add_entry(file)?);
                }
            }
        }

        self.by_type.insert(segment.clean.clone(), self.types.len());
        self.types.push(PatternType { segment, dir: dir.id, subtypes, entries });
        Ok(())
    }

    fn add_entry(&mut self, file: &Entry) -> Result<Arc<PatternEntry>> {
        let source_path = file.relative_path().to_path_buf();
        let Some(ident) = Identifier::parse(&source_path) else {
            return err! {
                "pattern path is not of the form type/[subtype/]name",
                "path" => file.path.display(),
            };
        };

        let entry = Arc::new(PatternEntry {
            id: ident.canonical_id().into(),
            partial: ident.is_hidden(),
            path: file.path.clone(),
            source_path,
            ident,
        });

        if let Some(existing) = self.by_id.get(&entry.id) {
            return err! {
                "two patterns normalize to the same identifier",
                "identifier" => entry.id,
                "first source" => existing.source_path.display(),
                "second source" => entry.source_path.display(),
            }.fault(Fault::IdentifierCollision);
        }

        tracing::debug!(id = %entry.id, source = %entry.source_path.display(), partial = entry.partial);
        self.by_id.insert(entry.id.clone(), entry.clone());
        self.by_shorthand.entry(entry.ident.shorthand().into())
            .and_modify(|slot| *slot = None)
            .or_insert_with(|| Some(entry.clone()));

        Ok(entry)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// The type indexed by clean name `key`.
    pub fn pattern_type(&self, key: &str) -> Option<&PatternType> {
        self.by_type.get(key).map(|&i| &self.types[i])
    }

    /// The entry of type `type_key` with canonical id `id`.
    pub fn get(&self, type_key: &str, id: &str) -> Option<&Arc<PatternEntry>> {
        self.by_id.get(id).filter(|e| e.type_key() == type_key)
    }

    /// The entry with canonical id `id`, of any type.
    pub fn find(&self, id: &str) -> Option<&Arc<PatternEntry>> {
        self.by_id.get(id)
    }

    /// Resolves a name the way partial includes do: canonical id first, then
    /// an unambiguous `type-name` shorthand.
    pub fn resolve(&self, name: &str) -> Option<&Arc<PatternEntry>> {
        self.by_id.get(name)
            .or_else(|| self.by_shorthand.get(name)?.as_ref())
    }

    /// `true` if `shorthand` names exactly one entry.
    pub fn is_unambiguous(&self, shorthand: &str) -> bool {
        matches!(self.by_shorthand.get(shorthand), Some(Some(_)))
    }

    /// Every entry, in discovery order.
    pub fn entries(&self) -> impl Iterator<Item = &Arc<PatternEntry>> {
        self.types.iter().flat_map(|t| t.entries.iter())
    }

    /// Every entry that gets a page of its own.
    pub fn public_entries(&self) -> impl Iterator<Item = &Arc<PatternEntry>> {
        self.entries().filter(|e| !e.partial)
    }
}

#[cfg(test)] static_assertions::assert_impl_all!(PatternIndex: Send, Sync);

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    fn touch(root: &Path, path: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn index_scenario() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "01-atoms/buttons.mustache");
        touch(dir.path(), "02-molecules/forms/login-form.mustache");

        let index = PatternIndex::build(dir.path(), "mustache").unwrap();
        let keys: Vec<_> = index.types.iter().map(|t| t.key()).collect();
        assert_eq!(keys, ["atoms", "molecules"]);

        let login = index.get("molecules", "molecules-forms-login-form").unwrap();
        assert_eq!(login.source_path, Path::new("02-molecules/forms/login-form.mustache"));
        assert_eq!(login.output_path(), "molecules-forms-login-form/molecules-forms-login-form.html");
        assert!(index.get("atoms", "molecules-forms-login-form").is_none());

        let buttons = index.find("atoms-buttons").unwrap();
        assert_eq!(buttons.output_path(), "atoms-buttons/atoms-buttons.html");
        assert!(index.pattern_type("atoms").unwrap().is_flat());
        assert!(!index.pattern_type("molecules").unwrap().is_flat());
    }

    #[test]
    fn hidden_entries_are_indexed_as_partials() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "01-atoms/forms/_label.mustache");
        touch(dir.path(), "01-atoms/forms/input.mustache");
        touch(dir.path(), "01-atoms/_scratch/thing.mustache");

        let index = PatternIndex::build(dir.path(), "mustache").unwrap();
        assert!(index.find("atoms-forms-_label").unwrap().partial);
        assert!(index.find("atoms-_scratch-thing").unwrap().partial);
        assert!(!index.find("atoms-forms-input").unwrap().partial);

        let public: Vec<_> = index.public_entries().map(|e| &*e.id).collect();
        assert_eq!(public, ["atoms-forms-input"]);
    }

    #[test]
    fn collisions_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "01-atoms/01-button.mustache");
        touch(dir.path(), "01-atoms/02-button.mustache");

        let error = PatternIndex::build(dir.path(), "mustache").unwrap_err();
        assert_eq!(error.fault(), Some(Fault::IdentifierCollision));
        assert!(error.to_string().contains("atoms-button"));

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "01-atoms/a.mustache");
        touch(dir.path(), "atoms/b.mustache");
        let error = PatternIndex::build(dir.path(), "mustache").unwrap_err();
        assert_eq!(error.fault(), Some(Fault::IdentifierCollision));
    }

    #[test]
    fn subtype_collisions_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "02-molecules/01-forms/login.mustache");
        touch(dir.path(), "02-molecules/forms/search.mustache");

        let error = PatternIndex::build(dir.path(), "mustache").unwrap_err();
        assert_eq!(error.fault(), Some(Fault::IdentifierCollision));

        let message = error.to_string();
        assert!(message.contains("01-forms"));
        assert!(message.contains(&*dir.path().join("02-molecules/forms").display().to_string()));
    }

    #[test]
    fn shorthand_resolution() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "02-molecules/forms/search.mustache");
        touch(dir.path(), "02-molecules/nav/search.mustache");
        touch(dir.path(), "02-molecules/nav/menu.mustache");

        let index = PatternIndex::build(dir.path(), "mustache").unwrap();
        assert_eq!(&*index.resolve("molecules-menu").unwrap().id, "molecules-nav-menu");
        assert_eq!(&*index.resolve("molecules-nav-menu").unwrap().id, "molecules-nav-menu");
        assert!(index.resolve("molecules-search").is_none());
        assert!(!index.is_unambiguous("molecules-search"));
        assert!(index.resolve("molecules-forms-search").is_some());
    }

    #[test]
    fn other_files_and_strays_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "02-molecules/stray.mustache");
        touch(dir.path(), "02-molecules/forms/login.mustache");
        touch(dir.path(), "02-molecules/forms/login.json");
        touch(dir.path(), "02-molecules/forms/deep/ignored.mustache");

        let index = PatternIndex::build(dir.path(), "mustache").unwrap();
        let ids: Vec<_> = index.entries().map(|e| &*e.id).collect();
        assert_eq!(ids, ["molecules-forms-login"]);
    }
}

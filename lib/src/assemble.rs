//! Drives a build from source tree to written pages.
//!
//! ```text
//!              +----------> DataOverlay --+
//!              |                          |
//! PatternIndex +                          +--> patterns --> view-alls --> index + style guide
//!              |                          |
//!              +----------> NavTree ------+
//! ```
//!
//! Each rendering phase asks [`EngineInit`] for new engines; nothing rendered
//! by one phase can leak into the next.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Chainable, Fault, Result};
use crate::index::{PatternEntry, PatternIndex};
use crate::nav::{is_page_type, Bucket, NavItem, NavTree};
use crate::overlay::{DataOverlay, DataSources};
use crate::templating::{DirLoader, Engine, EngineInit, PatternLoader};
use crate::value::{Sink, Source};

/// Where the site index is written, relative to the public root.
pub const INDEX_PATH: &str = "index.html";

/// Where the style guide is written, relative to the public root.
pub const STYLEGUIDE_PATH: &str = "styleguide/html/styleguide.html";

/// Destination of rendered pages.
pub trait Output: Debug {
    /// Writes `contents` to `path`, relative to the output root.
    fn write(&self, path: &str, contents: &str) -> Result<()>;
}

/// Writes pages below a directory, creating directories as needed.
#[derive(Debug, Clone)]
pub struct DirOutput {
    pub root: PathBuf,
}

impl DirOutput {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DirOutput { root: root.into() }
    }
}

impl Output for DirOutput {
    fn write(&self, path: &str, contents: &str) -> Result<()> {
        self.root.join(path).write(contents)
    }
}

/// Locations of a project's sources.
#[derive(Debug, Clone)]
pub struct Layout {
    pub patterns: PathBuf,
    pub data: PathBuf,
    pub chrome: PathBuf,
    pub url_root: String,
    pub template_ext: String,
}

impl Layout {
    pub fn global_data(&self) -> PathBuf {
        self.data.join("data.json")
    }

    pub fn list_items(&self) -> PathBuf {
        self.data.join("listitems.json")
    }
}

/// The directory holding the site's own templates: the index, the style
/// guide, the view-all page, and the fragments wrapped around every pattern.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub root: PathBuf,
}

impl Chrome {
    pub const INDEX: &'static str = "index.html";
    pub const STYLEGUIDE: &'static str = "styleguide.html";
    pub const VIEW_ALL: &'static str = "viewall.html";

    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Chrome { root: root.into() }
    }

    /// Chrome templates resolve against the root, then its `partials/`.
    pub fn loader(&self) -> DirLoader {
        DirLoader::new([self.root.clone(), self.root.join("partials")])
    }

    /// The header and footer wrapped around every pattern page. A missing
    /// fragment reads as empty.
    pub fn header_footer(&self) -> Result<(String, String)> {
        let dir = self.root.join("pattern-header-footer");
        let read = |name: &str| -> Result<String> {
            Ok(dir.join(name).as_path().read_if_exists()?.unwrap_or_default())
        };

        Ok((read("header.html")?, read("footer.html")?))
    }
}

/// Metadata about the build itself, exposed to the index page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildInfo {
    /// Unix timestamp of the build.
    pub timestamp: i64,
    pub content_port: Option<u16>,
    pub nav_port: Option<u16>,
}

impl BuildInfo {
    pub fn now() -> Self {
        BuildInfo { timestamp: chrono::Utc::now().timestamp(), ..Default::default() }
    }
}

/// A rendered pattern as listed on aggregate pages.
#[derive(Debug, Clone, Serialize)]
pub struct Partial {
    pub id: Arc<str>,
    pub title: String,
    pub url: String,
    pub markup: String,
}

#[derive(Serialize)]
struct ViewAllContext<'a> {
    pattern_type: &'a str,
    pattern_subtype: &'a str,
    partials: Vec<Partial>,
}

#[derive(Serialize)]
struct IndexContext<'a> {
    buckets: &'a [Bucket],
    pattern_paths: BTreeMap<&'a str, String>,
    build: &'a BuildInfo,
}

#[derive(Serialize)]
struct StyleGuideContext {
    partials: Vec<Partial>,
}

/// What a finished build wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub patterns: usize,
    pub view_alls: usize,
}

/// Renders a resolved project with engines built by `E`.
pub struct Assembler<E: EngineInit> {
    pub index: Arc<PatternIndex>,
    pub overlay: DataOverlay,
    pub nav: NavTree,
    pub chrome: Chrome,
    pub url_root: String,
    pub build: BuildInfo,
    _engine: PhantomData<fn() -> E>,
}

impl<E: EngineInit> Assembler<E> {
    pub fn new(index: Arc<PatternIndex>, overlay: DataOverlay, nav: NavTree, chrome: Chrome) -> Self {
        Assembler {
            index, overlay, nav, chrome,
            url_root: "/".into(),
            build: BuildInfo::now(),
            _engine: PhantomData,
        }
    }

    /// Indexes the patterns in `layout`, then resolves data and navigation.
    pub fn load(layout: &Layout) -> Result<Self> {
        let index = PatternIndex::build(&layout.patterns, &layout.template_ext)?;
        tracing::info!(patterns = index.len(), root = %layout.patterns.display(), "indexed patterns");

        let (global, list_items) = (layout.global_data(), layout.list_items());
        let sources = DataSources { global: &global, list_items: &list_items, url_root: &layout.url_root };
        let overlay = DataOverlay::resolve(&index, sources)?;
        let nav = NavTree::build(&index, &layout.url_root);

        let mut assembler = Self::new(Arc::new(index), overlay, nav, Chrome::new(layout.chrome.clone()));
        assembler.url_root = layout.url_root.clone();
        Ok(assembler)
    }

    pub fn with_build(mut self, build: BuildInfo) -> Self {
        self.build = build;
        self
    }

    /// Runs every phase in order, stopping at the first failure.
    pub fn assemble<O: Output + ?Sized>(&self, output: &O) -> Result<Summary> {
        let patterns = self.render_patterns(output)?;
        let view_alls = self.render_view_alls(output)?;
        self.render_main_pages(output)?;
        Ok(Summary { patterns, view_alls })
    }

    fn pattern_engine(&self) -> E::Engine {
        E::init(PatternLoader::new(self.index.clone()), &self.overlay.reserved)
    }

    fn chrome_engine(&self) -> E::Engine {
        E::init(self.chrome.loader(), &self.overlay.reserved)
    }

    fn render_entry(&self, engine: &E::Engine, entry: &PatternEntry) -> Result<String> {
        engine.render(&entry.id, &self.overlay.context_for(entry))
            .chain_with(|| error! {
                "failed to render pattern",
                "pattern" => entry.id,
                "source" => entry.source_path.display(),
            })
            .fault(Fault::TemplateRender)
    }

    fn render_chrome<C: Serialize>(&self, engine: &E::Engine, name: &str, context: &C) -> Result<String> {
        engine.render(name, context)
            .chain_with(|| error! {
                "failed to render site template",
                "template" => name,
                "template root" => self.chrome.root.display(),
            })
            .fault(Fault::TemplateRender)
    }

    fn partial(&self, engine: &E::Engine, entry: &PatternEntry) -> Result<Partial> {
        Ok(Partial {
            id: entry.id.clone(),
            title: entry.title(),
            url: entry.url(&self.url_root),
            markup: self.render_entry(engine, entry)?,
        })
    }

    /// Renders every visible pattern to a page of its own.
    pub fn render_patterns<O: Output + ?Sized>(&self, output: &O) -> Result<usize> {
        let engine = self.pattern_engine();
        let (header, footer) = self.chrome.header_footer()?;

        let mut count = 0;
        for entry in self.index.public_entries() {
            let markup = self.render_entry(&engine, entry)?;
            output.write(&entry.output_path(), &format!("{header}\n{markup}\n{footer}"))?;
            count += 1;
        }

        tracing::info!(count, "rendered pattern pages");
        Ok(count)
    }

    /// Renders one aggregate page per view-all node in the nav tree.
    pub fn render_view_alls<O: Output + ?Sized>(&self, output: &O) -> Result<usize> {
        let chrome = self.chrome_engine();
        let patterns = self.pattern_engine();

        let mut count = 0;
        for node in self.nav.view_alls() {
            let NavItem::ViewAll { pattern_type, pattern_subtype, path, .. } = node else {
                continue;
            };

            let entries = self.index.pattern_type(pattern_type)
                .into_iter()
                .flat_map(move |t| t.entries_in(pattern_subtype))
                .filter(|e| !e.partial);

            let partials = entries
                .map(|entry| self.partial(&patterns, entry))
                .collect::<Result<Vec<_>>>()?;

            let context = ViewAllContext { pattern_type, pattern_subtype, partials };
            let html = self.render_chrome(&chrome, Chrome::VIEW_ALL, &context)?;
            output.write(path, &html)?;
            tracing::debug!(%path, "rendered view-all page");
            count += 1;
        }

        tracing::info!(count, "rendered view-all pages");
        Ok(count)
    }

    /// Renders the site index and the style guide.
    pub fn render_main_pages<O: Output + ?Sized>(&self, output: &O) -> Result<()> {
        let chrome = self.chrome_engine();
        let patterns = self.pattern_engine();

        let pattern_paths = self.index.public_entries()
            .map(|e| (&*e.id, path_string(&e.source_path)))
            .collect();

        let context = IndexContext { buckets: &self.nav.buckets, pattern_paths, build: &self.build };
        output.write(INDEX_PATH, &self.render_chrome(&chrome, Chrome::INDEX, &context)?)?;

        let partials = self.index.public_entries()
            .filter(|e| !is_page_type(e.type_key()))
            .map(|entry| self.partial(&patterns, entry))
            .collect::<Result<Vec<_>>>()?;

        let count = partials.len();
        let context = StyleGuideContext { partials };
        output.write(STYLEGUIDE_PATH, &self.render_chrome(&chrome, Chrome::STYLEGUIDE, &context)?)?;
        tracing::info!(patterns = count, "rendered index and style guide");
        Ok(())
    }
}

fn path_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

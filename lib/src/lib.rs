#![doc = svgbobdoc::transform!(
//! Assembles static pattern-library sites from a convention-based source tree.
//!
//! # Overview
//!
//! A pattern library is a directory of template fragments organized by
//! convention rather than configuration. Directory and file names carry
//! ordering prefixes and hidden markers; the tree's shape alone decides how
//! patterns are named, grouped, and linked:
//!
//! ```svgbob
//!  patterns/
//!   +-- 01-atoms/                         type (flat)
//!   |    +-- 01-buttons.mustache          -> atoms-buttons
//!   |    +-- 01-buttons.json              -> data for atoms-buttons
//!   +-- 02-molecules/                     type (nested)
//!        +-- 01-forms/                    subtype
//!             +-- login-form.mustache     -> molecules-forms-login-form
//!             +-- _label.mustache         -> molecules-forms-_label (hidden)
//! ```
//!
//! A build runs as a single linear pipeline:
//!
//! ```svgbob
//!                  +--> DataOverlay ---+
//!  +------------+  |                   |   +-----------+
//!  |PatternIndex+--+                   +-->| Assembler +--> pages
//!  +------------+  |                   |   +-----------+
//!                  +--> NavTree -------+
//! ```
//!
//!   * [`ident`] holds the naming rules: prefix stripping, hidden markers,
//!     canonical ids and output paths.
//!   * [`index`] walks the source tree into a read-only [`PatternIndex`].
//!   * [`overlay`] resolves global, per-pattern, and generated template data.
//!   * [`nav`] mirrors the index as a navigation tree with view-all nodes.
//!   * [`assemble`] renders pattern pages, view-all pages, the index, and the
//!     style guide through a pluggable [`templating`] engine.
//!
//! [`PatternIndex`]: crate::index::PatternIndex
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod fstree;
pub mod value;
pub mod ident;
pub mod index;
pub mod overlay;
pub mod nav;
pub mod templating;
pub mod assemble;

pub use assemble::{Assembler, Layout, DirOutput, Output};

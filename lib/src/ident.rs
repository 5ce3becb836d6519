//! Naming conventions of a pattern source tree.
//!
//! Every directory and template in the tree may carry an ordering prefix
//! (`02-molecules`, `00-colors`) that controls sort order on disk but is not
//! part of the name the pattern is known by. This module owns the one rule
//! that decides what counts as a prefix, and the typed parser that turns a
//! source path into an [`Identifier`].

use std::fmt;
use std::path::{Component, Path};
use std::sync::Arc;

use serde::Serialize;

/// Character that marks a file or directory as hidden.
pub const HIDDEN_MARKER: char = '_';

/// Splits the ordering prefix off of `segment`.
///
/// The prefix is everything before the first `-`. It is read leniently as an
/// integer: leading whitespace, an optional sign, then the leading run of
/// digits (`"3d"` reads as `3`, `"abc"` as `0`). It is removed, together with
/// its `-`, only when that integer is non-zero or the prefix is exactly `"00"`.
/// Otherwise `segment` is returned unchanged.
///
/// ```rust
/// use swatch::ident::normalize;
///
/// assert_eq!(normalize("02-buttons"), ("buttons", true));
/// assert_eq!(normalize("00-buttons"), ("buttons", true));
/// assert_eq!(normalize("0-buttons"), ("0-buttons", false));
/// assert_eq!(normalize("buttons"), ("buttons", false));
/// ```
pub fn normalize(segment: &str) -> (&str, bool) {
    let Some((prefix, rest)) = segment.split_once('-') else {
        return (segment, false);
    };

    if prefix == "00" || lenient_int_is_nonzero(prefix) {
        (rest, true)
    } else {
        (segment, false)
    }
}

fn lenient_int_is_nonzero(prefix: &str) -> bool {
    let digits = prefix.trim_start();
    let digits = digits.strip_prefix(['+', '-']).unwrap_or(digits);
    digits.bytes()
        .take_while(|b| b.is_ascii_digit())
        .any(|b| b != b'0')
}

/// Returns `true` if the file or directory name marks a hidden entry.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}

/// Upper-cases the first character of every space-separated word, leaving the
/// rest untouched.
pub fn title_case(words: &str) -> String {
    let mut output = String::with_capacity(words.len());
    let mut at_word_start = true;
    for c in words.chars() {
        if at_word_start {
            output.extend(c.to_uppercase());
        } else {
            output.push(c);
        }

        at_word_start = c == ' ';
    }

    output
}

/// One path segment of a pattern: a type directory, a subtype directory, or a
/// template's file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Segment {
    /// The segment exactly as it appears on disk.
    pub raw: Arc<str>,
    /// The segment with its ordering prefix removed. Hyphens are kept.
    pub clean: Arc<str>,
    pub had_prefix: bool,
}

impl Segment {
    pub fn new(raw: &str) -> Segment {
        let (clean, had_prefix) = normalize(raw);
        Segment { raw: raw.into(), clean: clean.into(), had_prefix }
    }

    /// Name for display: hyphens become spaces.
    pub fn display_name(&self) -> String {
        self.clean.replace('-', " ")
    }

    /// [`Segment::display_name()`], title-cased.
    pub fn title(&self) -> String {
        title_case(&self.display_name())
    }

    pub fn is_hidden(&self) -> bool {
        is_hidden(&self.raw)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.clean.fmt(f)
    }
}

/// The structured identity of a pattern file, recovered from its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identifier {
    pub pattern_type: Segment,
    pub subtype: Option<Segment>,
    pub name: Segment,
}

impl Identifier {
    /// Parses a path relative to the patterns root: `type/name.ext` or
    /// `type/subtype/name.ext`. The final extension of `name` is dropped.
    /// Returns `None` for any other shape.
    ///
    /// ```rust
    /// use swatch::ident::Identifier;
    ///
    /// let id = Identifier::parse("02-molecules/forms/01-login-form.mustache").unwrap();
    /// assert_eq!(id.canonical_id(), "molecules-forms-login-form");
    /// assert_eq!(id.shorthand(), "molecules-login-form");
    /// assert_eq!(id.output_path(), "molecules-forms-login-form/molecules-forms-login-form.html");
    ///
    /// assert!(Identifier::parse("loose.mustache").is_none());
    /// ```
    pub fn parse<P: AsRef<Path>>(relative: P) -> Option<Identifier> {
        let mut segments = Vec::with_capacity(3);
        for component in relative.as_ref().components() {
            match component {
                Component::Normal(s) => segments.push(s.to_str()?),
                Component::CurDir => continue,
                _ => return None,
            }
        }

        let stem = |file: &str| match file.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_owned(),
            _ => file.to_owned(),
        };

        match segments.as_slice() {
            [ty, file] => Some(Identifier {
                pattern_type: Segment::new(ty),
                subtype: None,
                name: Segment::new(&stem(file)),
            }),
            [ty, sub, file] => Some(Identifier {
                pattern_type: Segment::new(ty),
                subtype: Some(Segment::new(sub)),
                name: Segment::new(&stem(file)),
            }),
            _ => None,
        }
    }

    /// The key the type is indexed by: its clean name.
    pub fn type_key(&self) -> &str {
        &self.pattern_type.clean
    }

    /// Clean segments joined with `-`: `type[-subtype]-name`.
    pub fn canonical_id(&self) -> String {
        let mut id = String::from(&*self.pattern_type.clean);
        if let Some(subtype) = &self.subtype {
            id.push('-');
            id.push_str(&subtype.clean);
        }

        id.push('-');
        id.push_str(&self.name.clean);
        id
    }

    /// `type-name`, skipping the subtype: the short form partials are
    /// conventionally referenced by.
    pub fn shorthand(&self) -> String {
        format!("{}-{}", self.pattern_type.clean, self.name.clean)
    }

    /// Output location relative to the public root:
    /// `<canonical>/<canonical>.html`.
    pub fn output_path(&self) -> String {
        let id = self.canonical_id();
        format!("{id}/{id}.html")
    }

    /// The URL the rendered pattern is served at below `root`.
    pub fn url(&self, root: &str) -> String {
        join_url(root, &self.output_path())
    }

    /// `true` if any segment of the identifier is hidden.
    pub fn is_hidden(&self) -> bool {
        self.pattern_type.is_hidden()
            || self.subtype.as_ref().map_or(false, |s| s.is_hidden())
            || self.name.is_hidden()
    }
}

/// Joins `root` and a relative path with exactly one `/` between them and a
/// leading `/` on the result.
pub fn join_url(root: &str, relative: &str) -> String {
    let root = root.trim_matches('/');
    let relative = relative.trim_start_matches('/');
    match root.is_empty() {
        true => format!("/{relative}"),
        false => format!("/{root}/{relative}"),
    }
}

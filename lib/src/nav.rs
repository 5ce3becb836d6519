//! The navigation tree handed to the index page.
//!
//! ```text
//! NavTree
//!  ├── Bucket "atoms"            (flat type)
//!  │    ├── Pattern atoms-buttons
//!  │    └── Pattern atoms-links
//!  └── Bucket "molecules"        (nested type)
//!       └── Section "forms"
//!            ├── Pattern molecules-forms-login-form
//!            └── ViewAll molecules/forms
//! ```

use serde::Serialize;

use crate::index::{PatternEntry, PatternIndex, PatternType};

/// Types whose sections never get an aggregate page.
pub const NO_VIEW_ALL: [&str; 2] = ["pages", "templates"];

/// Returns `true` if entries of `type_key` are left out of aggregate pages
/// and of the style guide.
pub fn is_page_type(type_key: &str) -> bool {
    NO_VIEW_ALL.contains(&type_key)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NavTree {
    pub buckets: Vec<Bucket>,
}

/// A pattern type.
#[derive(Debug, Clone, Serialize)]
pub struct Bucket {
    /// The clean type name.
    pub id: String,
    /// Lower-case display name.
    pub name: String,
    pub title: String,
    /// Items of a flat type.
    pub items: Vec<NavItem>,
    /// Sections of a nested type.
    pub sections: Vec<Section>,
}

/// A pattern subtype.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub id: String,
    pub name: String,
    pub title: String,
    pub items: Vec<NavItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavItem {
    Pattern {
        id: String,
        title: String,
        /// Output path relative to the public root.
        path: String,
        url: String,
    },
    /// Aggregate of every visible pattern in one section.
    ViewAll {
        /// Clean type name.
        pattern_type: String,
        /// Clean subtype name.
        pattern_subtype: String,
        raw_type: String,
        raw_subtype: String,
        path: String,
        url: String,
    },
}

impl NavItem {
    fn pattern(entry: &PatternEntry, url_root: &str) -> NavItem {
        NavItem::Pattern {
            id: entry.id.to_string(),
            title: entry.title(),
            path: entry.output_path(),
            url: entry.url(url_root),
        }
    }
}

impl NavTree {
    /// Mirrors `index`, skipping hidden types, subtypes, and entries.
    pub fn build(index: &PatternIndex, url_root: &str) -> NavTree {
        let buckets = index.types.iter()
            .filter(|t| !t.is_hidden())
            .map(|t| Bucket::build(t, url_root))
            .collect();

        NavTree { buckets }
    }

    /// Every [`NavItem::ViewAll`] in the tree, in tree order.
    pub fn view_alls(&self) -> impl Iterator<Item = &NavItem> {
        self.buckets.iter()
            .flat_map(|b| b.sections.iter())
            .flat_map(|s| s.items.iter())
            .filter(|item| matches!(item, NavItem::ViewAll { .. }))
    }
}

impl Bucket {
    fn build(pattern_type: &PatternType, url_root: &str) -> Bucket {
        let segment = &pattern_type.segment;
        let mut bucket = Bucket {
            id: segment.clean.to_string(),
            name: segment.display_name().to_lowercase(),
            title: segment.title(),
            items: vec![],
            sections: vec![],
        };

        if pattern_type.is_flat() {
            bucket.items = pattern_type.entries.iter()
                .filter(|e| !e.partial)
                .map(|e| NavItem::pattern(e, url_root))
                .collect();

            return bucket;
        }

        for subtype in pattern_type.subtypes.iter().filter(|s| !s.segment.is_hidden()) {
            let sub = &subtype.segment;
            let mut items: Vec<_> = pattern_type.entries_in(&sub.clean)
                .filter(|e| !e.partial)
                .map(|e| NavItem::pattern(e, url_root))
                .collect();

            if !items.is_empty() && !is_page_type(&bucket.id) {
                let path = format!("{}-{}/index.html", segment.clean, sub.clean);
                items.push(NavItem::ViewAll {
                    pattern_type: segment.clean.to_string(),
                    pattern_subtype: sub.clean.to_string(),
                    raw_type: segment.raw.to_string(),
                    raw_subtype: sub.raw.to_string(),
                    url: crate::ident::join_url(url_root, &path),
                    path,
                });
            }

            bucket.sections.push(Section {
                id: sub.clean.to_string(),
                name: sub.display_name().to_lowercase(),
                title: sub.title(),
                items,
            });
        }

        bucket
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn tree(paths: &[&str]) -> NavTree {
        let dir = tempfile::tempdir().unwrap();
        for path in paths {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }

        let index = PatternIndex::build(dir.path(), "mustache").unwrap();
        NavTree::build(&index, "/")
    }

    fn ids(items: &[NavItem]) -> Vec<String> {
        items.iter().map(|item| match item {
            NavItem::Pattern { id, .. } => id.clone(),
            NavItem::ViewAll { path, .. } => format!("view all: {path}"),
        }).collect()
    }

    #[test]
    fn scenario() {
        let nav = tree(&["01-atoms/buttons.mustache", "02-molecules/forms/login-form.mustache"]);
        assert_eq!(nav.buckets.len(), 2);

        let atoms = &nav.buckets[0];
        assert_eq!((&*atoms.id, &*atoms.title), ("atoms", "Atoms"));
        assert_eq!(ids(&atoms.items), ["atoms-buttons"]);
        assert!(atoms.sections.is_empty());

        let molecules = &nav.buckets[1];
        assert_eq!(molecules.sections.len(), 1);
        assert_eq!(molecules.sections[0].id, "forms");
        assert_eq!(ids(&molecules.sections[0].items),
            ["molecules-forms-login-form", "view all: molecules-forms/index.html"]);

        let NavItem::Pattern { title, path, url, .. } = &molecules.sections[0].items[0] else {
            panic!("expected a pattern item");
        };

        assert_eq!(title, "Login Form");
        assert_eq!(path, "molecules-forms-login-form/molecules-forms-login-form.html");
        assert_eq!(url, "/molecules-forms-login-form/molecules-forms-login-form.html");
    }

    #[test]
    fn view_alls_carry_raw_and_clean_names() {
        let nav = tree(&["02-molecules/03-media-blocks/card.mustache"]);
        let view_alls: Vec<_> = nav.view_alls().collect();
        assert_eq!(view_alls, [&NavItem::ViewAll {
            pattern_type: "molecules".into(),
            pattern_subtype: "media-blocks".into(),
            raw_type: "02-molecules".into(),
            raw_subtype: "03-media-blocks".into(),
            path: "molecules-media-blocks/index.html".into(),
            url: "/molecules-media-blocks/index.html".into(),
        }]);

        let section = &nav.buckets[0].sections[0];
        assert_eq!((&*section.name, &*section.title), ("media blocks", "Media Blocks"));
    }

    #[test]
    fn pages_and_templates_get_no_view_all() {
        let nav = tree(&[
            "04-templates/layouts/home.mustache",
            "05-pages/articles/article.mustache",
            "03-organisms/global/header.mustache",
        ]);

        assert_eq!(nav.view_alls().count(), 1);
        let templates = nav.buckets.iter().find(|b| b.id == "templates").unwrap();
        assert_eq!(ids(&templates.sections[0].items), ["templates-layouts-home"]);
    }

    #[test]
    fn hidden_things_stay_out() {
        let nav = tree(&[
            "01-atoms/forms/_label.mustache",
            "01-atoms/forms/input.mustache",
            "01-atoms/_drafts/idea.mustache",
            "01-atoms/lists/_only-hidden.mustache",
            "_scratch/test/thing.mustache",
        ]);

        assert_eq!(nav.buckets.len(), 1);
        let sections: Vec<_> = nav.buckets[0].sections.iter().map(|s| &*s.id).collect();
        assert_eq!(sections, ["forms", "lists"]);
        assert_eq!(ids(&nav.buckets[0].sections[0].items),
            ["atoms-forms-input", "view all: atoms-forms/index.html"]);

        // A section left empty by hidden entries keeps no view-all.
        assert!(nav.buckets[0].sections[1].items.is_empty());
    }

    #[test]
    fn serializes_with_kinds() {
        let nav = tree(&["01-atoms/buttons.mustache"]);
        let json = serde_json::to_value(&nav).unwrap();
        assert_eq!(json["buckets"][0]["items"][0]["kind"], "pattern");
        assert_eq!(json["buckets"][0]["items"][0]["id"], "atoms-buttons");
    }
}

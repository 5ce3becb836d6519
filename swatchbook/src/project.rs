use std::path::{Path, PathBuf};

use swatch::assemble::{BuildInfo, Summary};
use swatch::error::Result;
use swatch::templating::EngineInit;
use swatch::{Assembler, DirOutput, Layout};

use crate::config::Settings;
use crate::util::dircheck;

/// A project root and its settings.
#[derive(Debug)]
pub struct Swatchbook {
    pub root: PathBuf,
    pub settings: Settings,
    pub public: PathBuf,
}

impl Swatchbook {
    pub fn new<P: AsRef<Path>>(root: P, config: &Path) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let settings = Settings::load(&root.join(config))?;
        dircheck(&root, &settings.patterns, true)?;
        dircheck(&root, &settings.data, false)?;
        dircheck(&root, &settings.chrome, false)?;

        Ok(Swatchbook { public: root.join(&settings.public), root, settings })
    }

    pub fn layout(&self) -> Layout {
        Layout {
            patterns: self.root.join(&self.settings.patterns),
            data: self.root.join(&self.settings.data),
            chrome: self.root.join(&self.settings.chrome),
            url_root: self.settings.url_root.clone(),
            template_ext: self.settings.template_ext.clone(),
        }
    }

    pub fn assembler<E: EngineInit>(&self) -> Result<Assembler<E>> {
        let mut build = BuildInfo::now();
        if let Some(sync) = self.settings.sync {
            build.content_port = sync.content_port;
            build.nav_port = sync.nav_port;
        }

        Ok(Assembler::load(&self.layout())?.with_build(build))
    }

    /// Renders the site into the public directory, copies auxiliary files, and
    /// records the build time.
    pub fn build<E: EngineInit>(&self) -> Result<Summary> {
        let assembler = self.assembler::<E>()?;
        let summary = assembler.assemble(&DirOutput::new(&self.public))?;

        let copied = crate::copy::copy_all(&self.root, &self.public, &self.settings.copies)?;
        tracing::info!(copied, "copied auxiliary files");

        crate::copy::stamp(&self.public, assembler.build.timestamp)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use swatch::templating::minijinja::MiniJinjaEngine;

    use super::*;

    fn write(root: &Path, path: &str, contents: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn builds_a_fresh_project() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "source/patterns/01-atoms/buttons.mustache", "<button>{{ label }}</button>");
        write(root, "source/data/data.json", r#"{ "label": "Go" }"#);
        write(root, "source/chrome/index.html", "{{ build.content_port }}");
        write(root, "source/chrome/viewall.html", "");
        write(root, "source/chrome/styleguide.html", "{% for p in partials %}{{ p.markup }}{% endfor %}");
        write(root, "source/css/style.css", "body{}");
        write(root, "swatch.toml", r#"
            [sync]
            content_port = 8002

            [[copy]]
            from = "source/css/style.css"
            to = "css/style.css"
        "#);

        let project = Swatchbook::new(root, Path::new("swatch.toml")).unwrap();
        let summary = project.build::<MiniJinjaEngine>().unwrap();
        assert_eq!(summary, Summary { patterns: 1, view_alls: 0 });

        let public = root.join("public");
        let read = |path: &str| fs::read_to_string(public.join(path)).unwrap();
        assert_eq!(read("atoms-buttons/atoms-buttons.html"), "\n<button>Go</button>\n");
        assert_eq!(read("index.html"), "8002");
        assert_eq!(read("styleguide/html/styleguide.html"), "<button>Go</button>");
        assert_eq!(read("css/style.css"), "body{}");
        assert!(read("latest-change.txt").parse::<i64>().is_ok());
    }

    #[test]
    fn missing_patterns_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = Swatchbook::new(dir.path(), Path::new("swatch.toml")).unwrap_err();
        assert!(error.to_string().contains("patterns"));
        assert!(dir.path().join("swatch.toml").exists());
    }
}

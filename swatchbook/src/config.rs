use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use swatch::error;
use swatch::error::{Chainable, Fault, Result};
use swatch::value::{Format, Sink, Toml};

/// Configuration written to a project that has none.
pub const DEFAULT_CONFIG: &str = include_str!("../default.toml");

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub patterns: PathBuf,
    pub data: PathBuf,
    pub chrome: PathBuf,
    pub public: PathBuf,
    pub url_root: String,
    pub template_ext: String,
    pub sync: Option<SyncPorts>,
    #[serde(rename = "copy")]
    pub copies: Vec<CopyRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SyncPorts {
    pub content_port: Option<u16>,
    pub nav_port: Option<u16>,
}

/// Copy `from`, relative to the project root, to `to`, relative to the
/// public directory.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CopyRule {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            patterns: "source/patterns".into(),
            data: "source/data".into(),
            chrome: "source/chrome".into(),
            public: "public".into(),
            url_root: "/".into(),
            template_ext: "mustache".into(),
            sync: None,
            copies: vec![],
        }
    }
}

impl Settings {
    /// Reads the settings at `path`, first seeding the file from
    /// [`DEFAULT_CONFIG`] if it doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "no configuration found; writing the default");
            path.write(DEFAULT_CONFIG)
                .chain_with(|| error! {
                    "configuration is missing and the default could not be written",
                    "path" => path.display(),
                })
                .fault(Fault::ConfigurationMissing)?;
        }

        Toml::read(path).chain_with(|| error! {
            "invalid configuration",
            "path" => path.display(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn bundled_default_matches_defaults() {
        let settings: Settings = Toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn missing_config_is_seeded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swatch.toml");

        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }

    #[test]
    fn unseedable_config_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("file"), "").unwrap();

        let error = Settings::load(&dir.path().join("file/swatch.toml")).unwrap_err();
        assert_eq!(error.fault(), Some(Fault::ConfigurationMissing));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let settings: Settings = Toml::from_str(r#"
            public = "site"

            [sync]
            content_port = 8002

            [[copy]]
            from = "source/css/style.css"
            to = "css/style.css"
        "#).unwrap();

        assert_eq!(settings.public, Path::new("site"));
        assert_eq!(settings.patterns, Path::new("source/patterns"));
        assert_eq!(settings.sync, Some(SyncPorts { content_port: Some(8002), nav_port: None }));
        assert_eq!(settings.copies[0].to, Path::new("css/style.css"));
    }
}

//! Site configuration.
//!
//! Settings come from an optional `staticsite.yaml` in the site root (or an
//! explicit file), overridden by `STATICSITE_*` environment variables.
//! Every setting has a default, so a site without a config file works.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Config file looked up in the site root when none is given.
pub const CONFIG_FILE: &str = "staticsite.yaml";

/// Prefix of environment variable overrides, e.g. `STATICSITE_KEEP_GOING`.
pub const ENV_PREFIX: &str = "STATICSITE";

/// Title used when a page's front matter does not set one.
pub const DEFAULT_TITLE: &str = "An Outline Generated HTML page.";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to encode config file path as a unicode string: {0}")]
    EncodePath(PathBuf),

    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] config::ConfigError),
}

/// Top-level site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory holding named layouts, relative to the site root
    #[serde(default = "default_layouts_dir")]
    pub layouts_dir: PathBuf,
    /// Explicit default layout file. When unset, `default.html` next to the
    /// executable is used if present, else the built-in layout.
    #[serde(default)]
    pub default_layout: Option<PathBuf>,
    /// Fallback page title
    #[serde(default = "default_title")]
    pub default_title: String,
    /// Fail a page whose front matter does not parse instead of rendering
    /// it without front matter
    #[serde(default)]
    pub strict_front_matter: bool,
    /// Keep generating other pages after one fails
    #[serde(default)]
    pub keep_going: bool,
    /// Markdown processing settings
    #[serde(default)]
    pub markdown: MarkdownConfig,
}

fn default_layouts_dir() -> PathBuf {
    PathBuf::from("_layouts")
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            layouts_dir: default_layouts_dir(),
            default_layout: None,
            default_title: default_title(),
            strict_front_matter: false,
            keep_going: false,
            markdown: MarkdownConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load the config for the site rooted at `root`.
    ///
    /// With `config_file` unset, `staticsite.yaml` in the root is read if it
    /// exists. An explicit file must exist. Relative paths are resolved
    /// against `root`.
    pub fn load(root: &Path, config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match config_file {
            Some(file) => (root.join(file), true),
            None => (root.join(CONFIG_FILE), false),
        };

        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.clone()))?;

        log::debug!("loading config from {}", path.display());
        Ok(config::Config::builder()
            .add_source(config::File::new(path_str, config::FileFormat::Yaml).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<SiteConfig>()?)
    }

    /// The layouts directory, resolved against the site root.
    pub fn layouts_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.layouts_dir)
    }

    /// The configured default layout, resolved against the site root.
    pub fn default_layout(&self, root: &Path) -> Option<PathBuf> {
        self.default_layout.as_ref().map(|path| root.join(path))
    }
}

/// Markdown processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Extensions to enable for markdown processing
    #[serde(default = "default_markdown_extensions")]
    pub extensions: Vec<String>,
    /// Append a `#` permalink to every heading
    #[serde(default)]
    pub permalinks: bool,
}

fn default_markdown_extensions() -> Vec<String> {
    vec![
        "definition_lists".to_string(),
        "footnotes".to_string(),
        "gfm".to_string(),
        "heading_attributes".to_string(),
        "strikethrough".to_string(),
        "tables".to_string(),
        "tasklists".to_string(),
    ]
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: default_markdown_extensions(),
            permalinks: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::load(dir.path(), None).unwrap();

        assert_eq!(config.layouts_dir, PathBuf::from("_layouts"));
        assert_eq!(config.default_title, DEFAULT_TITLE);
        assert!(config.default_layout.is_none());
        assert!(!config.strict_front_matter);
        assert_eq!(config.markdown.extensions.len(), 7);
    }

    #[test]
    fn test_load_from_site_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "layouts_dir: templates\ndefault_title: Notes\nstrict_front_matter: true\nmarkdown:\n  permalinks: true\n",
        )
        .unwrap();

        let config = SiteConfig::load(dir.path(), None).unwrap();

        assert_eq!(config.layouts_dir(dir.path()), dir.path().join("templates"));
        assert_eq!(config.default_title, "Notes");
        assert!(config.strict_front_matter);
        assert!(config.markdown.permalinks);
        // Unset nested fields keep their defaults
        assert_eq!(config.markdown.extensions, default_markdown_extensions());
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let result = SiteConfig::load(dir.path(), Some(Path::new("missing.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_layout_resolved_against_root() {
        let config = SiteConfig {
            default_layout: Some(PathBuf::from("layouts/base.html")),
            ..SiteConfig::default()
        };
        assert_eq!(
            config.default_layout(Path::new("/site")),
            Some(PathBuf::from("/site/layouts/base.html"))
        );
    }
}

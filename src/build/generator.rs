//! Per-page generation: markdown source in, rendered page out.

use std::io;
use std::path::{Path, PathBuf};

use tera::Context;

use super::cache::{DefaultLayout, LayoutCache};
use super::document::{FrontMatter, FrontMatterError, split_front_matter, try_split_front_matter};
use super::markdown::{ExtendedMarkdown, MarkdownError};
use super::paths::output_path;
use super::render::{LayoutError, TocEntry};
use crate::config::{MarkdownConfig, SiteConfig};

#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),

    #[error(transparent)]
    Markdown(#[from] MarkdownError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl GenerateError {
    /// Returns true if the page asked for a layout that does not exist.
    pub fn is_layout_not_found(&self) -> bool {
        matches!(self, GenerateError::Layout(LayoutError::NotFound { .. }))
    }
}

/// Renders markdown sources into pages.
///
/// Owns the layout cache, so layouts are read and compiled at most once per
/// generator.
pub struct PageGenerator {
    layouts: LayoutCache,
    markdown: MarkdownConfig,
    default_title: String,
    strict_front_matter: bool,
}

impl PageGenerator {
    /// Create a generator for the site rooted at `root`.
    pub fn new(config: &SiteConfig, root: &Path) -> Self {
        let default_layout = DefaultLayout::discover(config.default_layout(root).as_deref());
        let layouts = LayoutCache::new(config.layouts_dir(root), default_layout);
        Self::with_layouts(config, layouts)
    }

    /// Create a generator using an existing layout cache.
    pub fn with_layouts(config: &SiteConfig, layouts: LayoutCache) -> Self {
        Self {
            layouts,
            markdown: config.markdown.clone(),
            default_title: config.default_title.clone(),
            strict_front_matter: config.strict_front_matter,
        }
    }

    pub fn layouts(&self) -> &LayoutCache {
        &self.layouts
    }

    /// Generate the page for one source file.
    ///
    /// Files whose name does not end in `.md` are skipped and yield
    /// `Ok(None)`. Otherwise the page is written next to the source with an
    /// `.html` extension, replacing any existing file, and its path is
    /// returned.
    pub fn generate(&mut self, path: &Path) -> Result<Option<PathBuf>, GenerateError> {
        let Some(output) = output_path(path) else {
            log::trace!("skipping {}", path.display());
            return Ok(None);
        };

        let text = std::fs::read_to_string(path).map_err(|source| GenerateError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let html = self.render_document(&text)?;

        std::fs::write(&output, html).map_err(|source| GenerateError::Write {
            path: output.clone(),
            source,
        })?;
        log::debug!("{} -> {}", path.display(), output.display());

        Ok(Some(output))
    }

    /// Render a source document to a complete page.
    pub fn render_document(&mut self, text: &str) -> Result<String, GenerateError> {
        let split = if self.strict_front_matter {
            try_split_front_matter(text)?
        } else {
            split_front_matter(text)
        };

        let (toc, body) = ExtendedMarkdown::new(split.body, &self.markdown)?.into_parts();
        let layout = self.layouts.resolve(split.front_matter.layout())?;
        let context = self.page_context(&split.front_matter, &toc, &body);

        Ok(layout.render(&context)?)
    }

    /// Front matter fields first, then `title`, `toc` and `body` on top.
    fn page_context(&self, front_matter: &FrontMatter, toc: &[TocEntry], body: &str) -> Context {
        let mut context = Context::new();
        for (key, value) in front_matter.iter() {
            match serde_json::to_value(value) {
                Ok(value) => context.insert(key, &value),
                Err(e) => log::warn!("front matter field '{}' dropped: {}", key, e),
            }
        }

        let title = front_matter
            .title()
            .unwrap_or_else(|| self.default_title.clone());
        context.insert("title", &title);
        context.insert("toc", toc);
        context.insert("body", body);
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TITLE;

    const PAGE_LAYOUT: &str =
        "<title>{{ title }}</title>{% for e in toc %}[{{ e.level }}:{{ e.id }}]{% endfor %}{{ body | safe }}";

    struct Site {
        dir: tempfile::TempDir,
        generator: PageGenerator,
    }

    impl Site {
        fn new() -> Self {
            Self::with_config(SiteConfig::default())
        }

        fn with_config(config: SiteConfig) -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::create_dir(dir.path().join("_layouts")).unwrap();
            let layouts = LayoutCache::new(config.layouts_dir(dir.path()), DefaultLayout::Builtin);
            let generator = PageGenerator::with_layouts(&config, layouts);
            Self { dir, generator }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn write(&self, name: &str, content: &str) -> PathBuf {
            let path = self.path(name);
            std::fs::write(&path, content).unwrap();
            path
        }

        fn layout(&self, name: &str, content: &str) {
            self.write(&format!("_layouts/{}.html", name), content);
        }
    }

    #[test]
    fn test_generate_with_named_layout() {
        let mut site = Site::new();
        site.layout("page", PAGE_LAYOUT);
        let source = site.write("intro.md", "---\ntitle: Intro\nlayout: page\n---\n# Start\n\n## Next\n");

        let output = site.generator.generate(&source).unwrap();

        assert_eq!(output, Some(site.path("intro.html")));
        let html = std::fs::read_to_string(site.path("intro.html")).unwrap();
        assert!(html.starts_with("<title>Intro</title>[1:start][2:next]"));
        assert!(html.contains("<h1 id=\"start\">Start</h1>"));
    }

    #[test]
    fn test_non_markdown_skipped() {
        let mut site = Site::new();
        let source = site.write("notes.txt", "# Not markdown\n");

        assert!(site.generator.generate(&source).unwrap().is_none());
        assert!(!site.path("notes.html").exists());
    }

    #[test]
    fn test_missing_named_layout() {
        let mut site = Site::new();
        let source = site.write("page.md", "---\nlayout: doesnotexist\n---\nBody\n");

        let err = site.generator.generate(&source).unwrap_err();
        assert!(err.is_layout_not_found());
        assert!(!site.path("page.html").exists());
    }

    #[test]
    fn test_default_layout_and_fallback_title() {
        let mut site = Site::new();
        let source = site.write("plain.md", "Just text.\n");

        site.generator.generate(&source).unwrap();

        let html = std::fs::read_to_string(site.path("plain.html")).unwrap();
        assert!(html.contains(&format!("<title>{}</title>", DEFAULT_TITLE)));
        assert!(html.contains("<p>Just text.</p>"));
    }

    #[test]
    fn test_configured_fallback_title() {
        let mut site = Site::with_config(SiteConfig {
            default_title: "Untitled".to_string(),
            ..SiteConfig::default()
        });
        let html = site.generator.render_document("Body\n").unwrap();
        assert!(html.contains("<title>Untitled</title>"));
    }

    #[test]
    fn test_false_title_uses_fallback() {
        let mut site = Site::new();
        let html = site
            .generator
            .render_document("---\ntitle: false\n---\nx\n")
            .unwrap();
        assert!(html.contains(&format!("<title>{}</title>", DEFAULT_TITLE)));
    }

    #[test]
    fn test_context_precedence_and_passthrough() {
        let mut site = Site::new();
        site.layout(
            "fields",
            "{{ title }}|{{ author }}|{{ toc | length }}|{{ body | safe }}|{{ tags | join(sep=\",\") }}",
        );

        let html = site
            .generator
            .render_document(
                "---\nlayout: fields\nauthor: Ada\ntoc: nope\nbody: nope\ntags: [a, b]\n---\n# H\n",
            )
            .unwrap();

        assert_eq!(
            html,
            format!("{}|Ada|1|<h1 id=\"h\">H</h1>\n|a,b", DEFAULT_TITLE)
        );
    }

    #[test]
    fn test_render_twice_is_identical() {
        let mut site = Site::new();
        site.layout("page", PAGE_LAYOUT);
        let text = "---\nlayout: page\n---\n# A\n\n# A\n\nText with *emphasis*.\n";

        let first = site.generator.render_document(text).unwrap();
        let second = site.generator.render_document(text).unwrap();

        assert_eq!(first, second);
        assert_eq!(site.generator.layouts().len(), 1);
    }

    #[test]
    fn test_malformed_front_matter_degrades_by_default() {
        let mut site = Site::new();
        let html = site
            .generator
            .render_document("---\ntitle: [oops\n---\nStill rendered\n")
            .unwrap();

        assert!(html.contains(&format!("<title>{}</title>", DEFAULT_TITLE)));
        assert!(html.contains("<p>Still rendered</p>"));
        assert!(!html.contains("oops"));
    }

    #[test]
    fn test_malformed_front_matter_strict() {
        let mut site = Site::with_config(SiteConfig {
            strict_front_matter: true,
            ..SiteConfig::default()
        });
        let err = site
            .generator
            .render_document("---\ntitle: [oops\n---\nBody\n")
            .unwrap_err();

        assert!(matches!(err, GenerateError::FrontMatter(_)));
    }

    #[test]
    fn test_overwrites_existing_output() {
        let mut site = Site::new();
        site.write("page.html", "stale");
        let source = site.write("page.md", "Fresh\n");

        site.generator.generate(&source).unwrap();

        let html = std::fs::read_to_string(site.path("page.html")).unwrap();
        assert!(html.contains("<p>Fresh</p>"));
    }

    #[test]
    fn test_missing_source_is_read_error() {
        let mut site = Site::new();
        let missing = site.path("gone.md");
        let err = site.generator.generate(&missing).unwrap_err();
        assert!(matches!(err, GenerateError::Read { .. }));
    }
}

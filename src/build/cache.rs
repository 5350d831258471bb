//! Layout resolution and caching.
//!
//! Layouts are read and compiled the first time a page asks for them and
//! reused for the rest of the run. There is no invalidation: a cache lives
//! exactly as long as the generator that owns it.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::render::{Layout, LayoutError};

/// File extension of layout templates.
pub const LAYOUT_EXTENSION: &str = "html";

/// File name looked up next to the executable for the default layout.
pub const DEFAULT_LAYOUT_FILE: &str = "default.html";

/// Name the default layout is reported under in errors and logs.
const DEFAULT_LAYOUT_NAME: &str = "default";

/// Layout compiled into the binary, used when no default layout file exists.
const BUILTIN_DEFAULT_LAYOUT: &str = include_str!("default.html");

/// Backing store layouts are read from.
pub trait LayoutStore {
    /// Read a layout template as UTF-8 text.
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Reads layouts from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLayoutStore;

impl LayoutStore for FsLayoutStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Where the default layout comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultLayout {
    /// A template file read through the store.
    File(PathBuf),
    /// The layout compiled into the binary.
    Builtin,
}

impl DefaultLayout {
    /// Pick the default layout source.
    ///
    /// An explicitly configured path always wins, even if it does not exist
    /// (that surfaces as `LayoutError::NotFound` on first use). Otherwise
    /// `default.html` next to the installed executable is used when present,
    /// then the built-in layout.
    pub fn discover(configured: Option<&Path>) -> Self {
        if let Some(path) = configured {
            return DefaultLayout::File(path.to_path_buf());
        }

        let installed = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_LAYOUT_FILE)));
        match installed {
            Some(path) if path.is_file() => DefaultLayout::File(path),
            _ => DefaultLayout::Builtin,
        }
    }
}

/// Lazily loaded, memoized layouts.
pub struct LayoutCache {
    layouts_dir: PathBuf,
    default_source: DefaultLayout,
    store: Box<dyn LayoutStore>,
    default_layout: Option<Arc<Layout>>,
    layouts: HashMap<String, Arc<Layout>>,
}

impl LayoutCache {
    /// Create a cache reading from the filesystem.
    pub fn new(layouts_dir: PathBuf, default_source: DefaultLayout) -> Self {
        Self::with_store(layouts_dir, default_source, FsLayoutStore)
    }

    /// Create a cache reading through a custom store.
    pub fn with_store<S: LayoutStore + 'static>(
        layouts_dir: PathBuf,
        default_source: DefaultLayout,
        store: S,
    ) -> Self {
        Self {
            layouts_dir,
            default_source,
            store: Box::new(store),
            default_layout: None,
            layouts: HashMap::new(),
        }
    }

    /// Resolve a layout by name, falling back to the default layout when
    /// `name` is absent or empty.
    pub fn resolve(&mut self, name: Option<&str>) -> Result<Arc<Layout>, LayoutError> {
        match name {
            Some(name) if !name.is_empty() => self.named(name),
            _ => self.default_layout(),
        }
    }

    /// Path a named layout is loaded from.
    pub fn layout_path(&self, name: &str) -> PathBuf {
        self.layouts_dir.join(format!("{}.{}", name, LAYOUT_EXTENSION))
    }

    /// Number of named layouts compiled so far.
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    fn named(&mut self, name: &str) -> Result<Arc<Layout>, LayoutError> {
        if let Some(layout) = self.layouts.get(name) {
            log::debug!("layout '{}' served from cache", name);
            return Ok(Arc::clone(layout));
        }

        let path = self.layout_path(name);
        let layout = Arc::new(self.load(name, &path)?);
        self.layouts.insert(name.to_string(), Arc::clone(&layout));
        Ok(layout)
    }

    fn default_layout(&mut self) -> Result<Arc<Layout>, LayoutError> {
        if let Some(layout) = &self.default_layout {
            return Ok(Arc::clone(layout));
        }

        let layout = match &self.default_source {
            DefaultLayout::File(path) => self.load(DEFAULT_LAYOUT_NAME, path)?,
            DefaultLayout::Builtin => {
                log::debug!("compiling built-in default layout");
                Layout::compile(DEFAULT_LAYOUT_NAME, BUILTIN_DEFAULT_LAYOUT)?
            }
        };
        let layout = Arc::new(layout);
        self.default_layout = Some(Arc::clone(&layout));
        Ok(layout)
    }

    fn load(&self, name: &str, path: &Path) -> Result<Layout, LayoutError> {
        log::debug!("loading layout '{}' from {}", name, path.display());
        let source = self.store.read(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                LayoutError::NotFound {
                    name: name.to_string(),
                    path: path.display().to_string(),
                }
            } else {
                LayoutError::Io {
                    name: name.to_string(),
                    source: e,
                }
            }
        })?;
        Layout::compile(name, &source)
    }
}

use std::io;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;

use super::generator::{GenerateError, PageGenerator};
use super::paths::is_html;

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("failed to list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Clean {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to generate {path}: {source}")]
    Page {
        path: PathBuf,
        #[source]
        source: GenerateError,
    },
}

/// Outcome of removing generated pages.
#[derive(Debug, Default)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, io::Error)>,
}

impl CleanReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of a full site generation.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Number of stale pages removed before generating
    pub removed: usize,
    /// Pages written, in generation order
    pub pages: Vec<PathBuf>,
    /// Entries that were not markdown sources
    pub skipped: usize,
    /// Failures recorded while continuing (only in keep-going mode)
    pub failures: Vec<BuildError>,
}

impl BuildReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Generates every page of a site directory.
///
/// Only the top level of the site root is considered: sources in
/// subdirectories are not generated and pages in them are not cleaned.
pub struct Builder {
    root: PathBuf,
    keep_going: bool,
    generator: PageGenerator,
}

impl Builder {
    pub fn new(config: &SiteConfig, root: PathBuf) -> Self {
        let generator = PageGenerator::new(config, &root);
        Self::with_generator(root, config.keep_going, generator)
    }

    pub fn with_generator(root: PathBuf, keep_going: bool, generator: PageGenerator) -> Self {
        Self {
            root,
            keep_going,
            generator,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Top-level entries of the site root, sorted by name.
    fn entries(&self) -> Result<Vec<PathBuf>, BuildError> {
        let read_dir_error = |source| BuildError::ReadDir {
            path: self.root.clone(),
            source,
        };

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(read_dir_error)? {
            entries.push(entry.map_err(read_dir_error)?.path());
        }
        entries.sort();
        Ok(entries)
    }

    /// Generated pages that `clean` would remove.
    pub fn stale_pages(&self) -> Result<Vec<PathBuf>, BuildError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|path| is_html(path) && !path.is_dir())
            .collect())
    }

    /// Remove every `.html` file at the top level of the site root.
    ///
    /// A file that cannot be removed does not stop the others; it is
    /// reported in `CleanReport::failed`.
    pub fn clean(&self) -> Result<CleanReport, BuildError> {
        let mut report = CleanReport::default();
        for path in self.stale_pages()? {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    log::debug!("removed {}", path.display());
                    report.removed.push(path);
                }
                Err(e) => {
                    log::warn!("failed to remove {}: {}", path.display(), e);
                    report.failed.push((path, e));
                }
            }
        }
        Ok(report)
    }

    /// Clean, then generate a page for every markdown source in the site
    /// root.
    ///
    /// Unless keep-going is enabled, the first failure aborts the run and is
    /// returned. With keep-going, failures are recorded in the report and
    /// generation continues with the next entry.
    pub fn generate_site(&mut self) -> Result<BuildReport, BuildError> {
        let cleaned = self.clean()?;
        let mut report = BuildReport {
            removed: cleaned.removed.len(),
            ..BuildReport::default()
        };

        for (path, source) in cleaned.failed {
            self.fail(&mut report, BuildError::Clean { path, source })?;
        }

        for entry in self.entries()? {
            match self.generator.generate(&entry) {
                Ok(Some(page)) => report.pages.push(page),
                Ok(None) => report.skipped += 1,
                Err(source) => {
                    self.fail(&mut report, BuildError::Page { path: entry, source })?;
                }
            }
        }

        log::info!(
            "generated {} page(s) in {} ({} skipped, {} failed)",
            report.pages.len(),
            self.root.display(),
            report.skipped,
            report.failures.len()
        );
        Ok(report)
    }

    fn fail(&self, report: &mut BuildReport, error: BuildError) -> Result<(), BuildError> {
        if !self.keep_going {
            return Err(error);
        }
        log::error!("{}", error);
        report.failures.push(error);
        Ok(())
    }
}

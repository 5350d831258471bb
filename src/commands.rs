use std::path::{Path, PathBuf};

pub mod build;
pub mod clean;

/// Resolve the site directory argument against the current directory.
fn site_root(dir: Option<&Path>) -> std::io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match dir {
        Some(dir) if dir.is_relative() => cwd.join(dir),
        Some(dir) => dir.to_path_buf(),
        None => cwd,
    })
}

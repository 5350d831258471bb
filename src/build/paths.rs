//! Source and output path conventions.

use std::path::{Path, PathBuf};

/// Suffix of markdown source files.
pub const MARKDOWN_SUFFIX: &str = ".md";

/// Suffix of generated pages.
pub const HTML_SUFFIX: &str = ".html";

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Returns true if the file name ends in `.md`.
pub fn is_markdown(path: &Path) -> bool {
    file_name(path).is_some_and(|name| name.ends_with(MARKDOWN_SUFFIX))
}

/// Returns true if the file name ends in `.html`.
pub fn is_html(path: &Path) -> bool {
    file_name(path).is_some_and(|name| name.ends_with(HTML_SUFFIX))
}

/// The page generated for a markdown source: same directory, `.md`
/// replaced by `.html`. Returns `None` for non-markdown paths.
///
/// "notes/intro.md" -> "notes/intro.html"
pub fn output_path(source: &Path) -> Option<PathBuf> {
    let stem = file_name(source)?.strip_suffix(MARKDOWN_SUFFIX)?;
    Some(source.with_file_name(format!("{}{}", stem, HTML_SUFFIX)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown(Path::new("intro.md")));
        assert!(is_markdown(Path::new("docs/intro.md")));
        assert!(is_markdown(Path::new(".md")));
        assert!(!is_markdown(Path::new("intro.MD")));
        assert!(!is_markdown(Path::new("intro.markdown")));
        assert!(!is_markdown(Path::new("notes.txt")));
        assert!(!is_markdown(Path::new("intro.md.bak")));
    }

    #[test]
    fn test_is_html() {
        assert!(is_html(Path::new("a.html")));
        assert!(!is_html(Path::new("a.htm")));
        assert!(!is_html(Path::new("b.md")));
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("notes/intro.md")),
            Some(PathBuf::from("notes/intro.html"))
        );
        assert_eq!(
            output_path(Path::new("archive.tar.md")),
            Some(PathBuf::from("archive.tar.html"))
        );
        assert_eq!(output_path(Path::new(".md")), Some(PathBuf::from(".html")));
        assert_eq!(output_path(Path::new("notes.txt")), None);
    }
}

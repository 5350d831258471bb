//! Static site generation from a directory of markdown files.
//!
//! Each `*.md` file in the site root is split into YAML front matter and a
//! markdown body, rendered to HTML with a table of contents, wrapped in a
//! Tera layout and written next to its source as `*.html`.

pub mod build;
pub mod config;

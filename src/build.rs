mod builder;
mod cache;
mod document;
mod generator;
mod markdown;
mod paths;
mod render;

pub use builder::{BuildError, BuildReport, Builder, CleanReport};
pub use cache::{DefaultLayout, FsLayoutStore, LayoutCache, LayoutStore};
pub use document::{
    FrontMatter, FrontMatterError, SplitDocument, split_front_matter, try_split_front_matter,
};
pub use generator::{GenerateError, PageGenerator};
pub use markdown::{ExtendedMarkdown, MarkdownError};
pub use paths::{is_html, is_markdown, output_path};
pub use render::{Layout, LayoutError, TocEntry};

//! Markdown rendering with TOC extraction.
//!
//! The body is parsed once by pulldown-cmark. Every event is offered to a
//! small table of construct handlers; events none of them consume are
//! rendered by the stock pulldown-cmark HTML writer.

use std::collections::HashSet;

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use super::render::TocEntry;
use crate::config::MarkdownConfig;

#[derive(thiserror::Error, Debug)]
pub enum MarkdownError {
    #[error("invalid markdown extension: {0}")]
    InvalidExtension(String),
}

/// State shared by the construct handlers during one render.
#[derive(Debug, Default)]
pub struct RenderState {
    /// Headings seen so far, in document order
    pub toc: Vec<TocEntry>,
    /// Anchor ids handed out so far
    pub ids: AnchorIds,
}

/// What a handler did with an event.
pub enum Handled<'a> {
    /// Not interested; offer the event to the next handler.
    Pass(Event<'a>),
    /// Consumed; emit these events instead (possibly none).
    Consumed(Vec<Event<'a>>),
}

/// Intercepts specific markdown constructs before HTML rendering.
pub trait ConstructHandler<'a> {
    fn handle(&mut self, event: Event<'a>, state: &mut RenderState) -> Handled<'a>;
}

/// Markdown body processed into a table of contents and HTML.
#[derive(Debug, Clone)]
pub struct ExtendedMarkdown {
    toc: Vec<TocEntry>,
    html: String,
}

impl ExtendedMarkdown {
    /// Parse and render a markdown body.
    pub fn new(markdown: &str, config: &MarkdownConfig) -> Result<Self, MarkdownError> {
        let parsed: Vec<Event> = Parser::new_ext(markdown, parser_options(config)?).collect();

        let mut handlers = handler_table(config);
        let mut state = RenderState::default();
        reserve_explicit_ids(&parsed, &mut state.ids);

        let mut events: Vec<Event> = Vec::new();
        for event in parsed {
            dispatch(&mut handlers, event, &mut state, &mut events);
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(Self {
            toc: state.toc,
            html: html_output,
        })
    }

    /// Headings in document order.
    pub fn table_of_contents(&self) -> &[TocEntry] {
        &self.toc
    }

    /// The rendered body.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_parts(self) -> (Vec<TocEntry>, String) {
        (self.toc, self.html)
    }
}

fn parser_options(config: &MarkdownConfig) -> Result<Options, MarkdownError> {
    let mut options = Options::empty();
    for extension in &config.extensions {
        match extension.as_str() {
            "definition_lists" => options.insert(Options::ENABLE_DEFINITION_LIST),
            "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
            "gfm" => options.insert(Options::ENABLE_GFM),
            "heading_attributes" => options.insert(Options::ENABLE_HEADING_ATTRIBUTES),
            "strikethrough" => options.insert(Options::ENABLE_STRIKETHROUGH),
            "tables" => options.insert(Options::ENABLE_TABLES),
            "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
            other => return Err(MarkdownError::InvalidExtension(other.to_string())),
        }
    }
    Ok(options)
}

/// Explicit `{#id}` ids win over generated ones wherever they appear, so
/// they are all taken before any heading is processed.
fn reserve_explicit_ids(events: &[Event], ids: &mut AnchorIds) {
    for event in events {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            ids.reserve(id);
        }
    }
}

fn handler_table<'a>(config: &MarkdownConfig) -> Vec<Box<dyn ConstructHandler<'a> + 'a>> {
    let headings: Box<dyn ConstructHandler<'a> + 'a> =
        Box::new(HeadingHandler::new(config.permalinks));
    vec![headings]
}

/// Offer an event to each handler in turn. Replacement events go straight
/// to the output and are not offered again.
fn dispatch<'a>(
    handlers: &mut [Box<dyn ConstructHandler<'a> + 'a>],
    event: Event<'a>,
    state: &mut RenderState,
    out: &mut Vec<Event<'a>>,
) {
    let mut event = event;
    for handler in handlers.iter_mut() {
        match handler.handle(event, state) {
            Handled::Pass(passed) => event = passed,
            Handled::Consumed(replacement) => {
                out.extend(replacement);
                return;
            }
        }
    }
    out.push(event);
}

// =============================================================================
// Headings
// =============================================================================

/// A heading whose closing tag has not been seen yet.
struct PendingHeading<'a> {
    level: HeadingLevel,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
    /// Plain text for the TOC and the anchor id
    text: String,
    /// Inline events, rendered as the heading's content
    inner: Vec<Event<'a>>,
}

impl<'a> PendingHeading<'a> {
    fn push(&mut self, event: Event<'a>) {
        match &event {
            Event::Text(text) | Event::Code(text) => self.text.push_str(text),
            Event::SoftBreak | Event::HardBreak => self.text.push(' '),
            _ => {}
        }
        self.inner.push(event);
    }
}

/// Gives every heading an anchor id and records it in the table of contents.
pub struct HeadingHandler<'a> {
    permalinks: bool,
    pending: Option<PendingHeading<'a>>,
}

impl<'a> HeadingHandler<'a> {
    pub fn new(permalinks: bool) -> Self {
        Self {
            permalinks,
            pending: None,
        }
    }

    /// Close a heading. The inner events are returned between the opening
    /// and closing tags so the main writer renders them, keeping footnote
    /// numbering shared with the body.
    fn finish(&self, heading: PendingHeading<'a>, state: &mut RenderState) -> Vec<Event<'a>> {
        let id = match heading.id {
            Some(id) => {
                state.ids.reserve(&id);
                id
            }
            None => state.ids.unique(&heading.text),
        };

        state.toc.push(TocEntry {
            level: heading.level as u8,
            text: heading.text,
            id: id.clone(),
        });

        let class_attr = if heading.classes.is_empty() {
            String::new()
        } else {
            format!(" class=\"{}\"", html_escape(&heading.classes.join(" ")))
        };

        let extra_attrs = heading
            .attrs
            .iter()
            .map(|(k, v)| match v {
                Some(val) => format!(" {}=\"{}\"", html_escape(k), html_escape(val)),
                None => format!(" {}", html_escape(k)),
            })
            .collect::<String>();

        let permalink = if self.permalinks {
            format!(
                " <a class=\"header-anchor\" href=\"#{}\" aria-label=\"Link to this heading\">#</a>",
                html_escape(&id)
            )
        } else {
            String::new()
        };

        let level = heading.level as usize;
        let open = format!(
            "<h{} id=\"{}\"{}{}>",
            level,
            html_escape(&id),
            class_attr,
            extra_attrs
        );
        let close = format!("{}</h{}>\n", permalink, level);

        let mut events = Vec::with_capacity(heading.inner.len() + 2);
        events.push(Event::Html(CowStr::from(open)));
        events.extend(heading.inner);
        events.push(Event::Html(CowStr::from(close)));
        events
    }
}

impl<'a> ConstructHandler<'a> for HeadingHandler<'a> {
    fn handle(&mut self, event: Event<'a>, state: &mut RenderState) -> Handled<'a> {
        if let Event::Start(Tag::Heading {
            level,
            id,
            classes,
            attrs,
        }) = event
        {
            self.pending = Some(PendingHeading {
                level,
                id: id.map(|id| id.to_string()),
                classes: classes.iter().map(|c| c.to_string()).collect(),
                attrs: attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.as_ref().map(|v| v.to_string())))
                    .collect(),
                text: String::new(),
                inner: Vec::new(),
            });
            return Handled::Consumed(Vec::new());
        }

        if let Event::End(TagEnd::Heading(_)) = event {
            return match self.pending.take() {
                Some(heading) => Handled::Consumed(self.finish(heading, state)),
                None => Handled::Pass(event),
            };
        }

        match self.pending.as_mut() {
            Some(heading) => {
                heading.push(event);
                Handled::Consumed(Vec::new())
            }
            None => Handled::Pass(event),
        }
    }
}

// =============================================================================
// Anchor ids
// =============================================================================

/// Hands out unique anchor ids within one document.
#[derive(Debug, Default)]
pub struct AnchorIds {
    used: HashSet<String>,
}

impl AnchorIds {
    /// Mark an explicit id as taken. Returns false if it already was.
    pub fn reserve(&mut self, id: &str) -> bool {
        self.used.insert(id.to_string())
    }

    /// Generate an id from heading text, suffixing `-1`, `-2`, ... on repeats.
    pub fn unique(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = "section".to_string();
        }

        let mut id = base.clone();
        let mut suffix = 1;
        while self.used.contains(&id) {
            id = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        self.used.insert(id.clone());
        id
    }
}

/// Convert a string to a slug suitable for use as an HTML id.
fn slugify(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .replace(' ', "-")
        .replace(|c: char| !c.is_alphanumeric() && c != '-' && c != '_', "")
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

//! Front matter splitting.
//!
//! A source document may start with a YAML block delimited by `---` lines:
//!
//! ```markdown
//! ---
//! title: My Page
//! layout: post
//! ---
//! # Content starts here
//! ```
//!
//! The block is only recognized when the very first line is `---` and a
//! later line is exactly `---`. Anything else is treated as plain markdown.

use serde_yaml::{Mapping, Value};

/// Opening delimiter, including its newline.
const OPENING: &str = "---\n";

/// Closing delimiter, searched for anywhere after the opening one.
const CLOSING: &str = "\n---\n";

#[derive(thiserror::Error, Debug)]
pub enum FrontMatterError {
    #[error("malformed front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front matter must be a mapping of keys to values, found {0}")]
    NotAMapping(&'static str),
}

/// Front matter metadata parsed from the document.
///
/// Keys are always strings. Order follows the source block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: Mapping,
}

impl FrontMatter {
    /// The page title, if the front matter sets a non-empty one.
    ///
    /// Numbers and `true` are accepted and stringified. Empty strings,
    /// `false`, zero and `NaN` count as unset.
    pub fn title(&self) -> Option<String> {
        match self.get("title")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()) => {
                Some(n.to_string())
            }
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }

    /// The name of the layout this page asks for, if any.
    pub fn layout(&self) -> Option<&str> {
        match self.get("layout")? {
            Value::String(s) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Look up a raw field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over `(key, value)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter_map(|(key, value)| key.as_str().map(|key| (key, value)))
    }

    /// Build front matter from parsed YAML.
    ///
    /// `null` (an empty block) is empty front matter. Entries with
    /// non-string keys are dropped.
    fn from_yaml(value: Value) -> Result<Self, FrontMatterError> {
        let mapping = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            Value::Bool(_) => return Err(FrontMatterError::NotAMapping("a boolean")),
            Value::Number(_) => return Err(FrontMatterError::NotAMapping("a number")),
            Value::String(_) => return Err(FrontMatterError::NotAMapping("a string")),
            Value::Sequence(_) => return Err(FrontMatterError::NotAMapping("a sequence")),
            Value::Tagged(_) => return Err(FrontMatterError::NotAMapping("a tagged value")),
        };

        let mut fields = Mapping::with_capacity(mapping.len());
        for (key, value) in mapping {
            if key.is_string() {
                fields.insert(key, value);
            } else {
                log::warn!("ignoring front matter entry with non-string key {:?}", key);
            }
        }
        Ok(Self { fields })
    }
}

/// A source document split into its front matter and markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDocument<'a> {
    /// The parsed front matter (empty if none found)
    pub front_matter: FrontMatter,
    /// The markdown content without the front matter block
    pub body: &'a str,
}

/// Locate the front matter block.
///
/// Returns the raw YAML text and the body, or `None` when the document has
/// no complete block.
fn locate(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with(OPENING) {
        return None;
    }
    let end = text.find(CLOSING)?;

    // The YAML keeps the newline that ends its last line.
    let yaml = &text[OPENING.len()..end + 1];
    let body = &text[end + CLOSING.len()..];
    Some((yaml, body))
}

/// Split front matter from the body, failing on malformed YAML.
///
/// A document without a complete `---` block is not an error: it has empty
/// front matter and its whole text is the body.
pub fn try_split_front_matter(text: &str) -> Result<SplitDocument<'_>, FrontMatterError> {
    let Some((yaml, body)) = locate(text) else {
        return Ok(SplitDocument {
            front_matter: FrontMatter::default(),
            body: text,
        });
    };

    let value: Value = serde_yaml::from_str(yaml)?;
    Ok(SplitDocument {
        front_matter: FrontMatter::from_yaml(value)?,
        body,
    })
}

/// Split front matter from the body, degrading malformed YAML to empty
/// front matter.
///
/// The body is still split off when the block fails to parse.
pub fn split_front_matter(text: &str) -> SplitDocument<'_> {
    match try_split_front_matter(text) {
        Ok(split) => split,
        Err(e) => {
            log::warn!("{}; continuing without front matter", e);
            let body = locate(text).map(|(_, body)| body).unwrap_or(text);
            SplitDocument {
                front_matter: FrontMatter::default(),
                body,
            }
        }
    }
}

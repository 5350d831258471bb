use serde::Serialize;
use tera::{Context, Tera};

#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    #[error("layout '{name}' not found at {path}")]
    NotFound { name: String, path: String },

    #[error("failed to read layout '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template error in layout '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: tera::Error,
    },
}

/// A compiled layout template.
///
/// Each layout owns its own Tera instance holding a single template, so
/// compiling one layout never depends on the others.
pub struct Layout {
    name: String,
    tera: Tera,
}

impl Layout {
    /// Compile a layout from its template source.
    pub fn compile(name: &str, template: &str) -> Result<Self, LayoutError> {
        let mut tera = Tera::default();
        tera.add_raw_template(&template_name(name), template)
            .map_err(|source| LayoutError::Template {
                name: name.to_string(),
                source,
            })?;

        Ok(Self {
            name: name.to_string(),
            tera,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the layout with the given context.
    pub fn render(&self, context: &Context) -> Result<String, LayoutError> {
        self.tera
            .render(&template_name(&self.name), context)
            .map_err(|source| LayoutError::Template {
                name: self.name.clone(),
                source,
            })
    }
}

impl std::fmt::Debug for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layout").field("name", &self.name).finish()
    }
}

/// Templates are registered with an `.html` suffix so Tera autoescapes
/// plain context values. The page body is inserted with `| safe`.
fn template_name(name: &str) -> String {
    format!("{}.html", name)
}

/// A table of contents entry for the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// The heading level (1-6)
    pub level: u8,
    /// The heading text
    pub text: String,
    /// The heading id (for anchor links)
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_escapes_values_but_not_safe_body() {
        let layout = Layout::compile(
            "page",
            "<title>{{ title }}</title><main>{{ body | safe }}</main>",
        )
        .unwrap();

        let mut context = Context::new();
        context.insert("title", "Fish & Chips");
        context.insert("body", "<p>hi</p>");

        let html = layout.render(&context).unwrap();
        assert_eq!(
            html,
            "<title>Fish &amp; Chips</title><main><p>hi</p></main>"
        );
    }

    #[test]
    fn test_compile_error_names_layout() {
        let err = Layout::compile("broken", "{% if %}").unwrap_err();
        assert!(matches!(err, LayoutError::Template { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_render_missing_variable_is_error() {
        let layout = Layout::compile("strict", "{{ missing }}").unwrap();
        assert!(layout.render(&Context::new()).is_err());
    }
}

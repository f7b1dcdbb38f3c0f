//! Template engine seam and the `minijinja` implementation.

use std::collections::BTreeMap;
use std::fmt;

use minijinja::Environment;
use serde::Serialize;
use serde_json::Value;

/// Context passed to a template render.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext<'a> {
    /// Controller output, or the element description when there is none.
    pub data: &'a Value,
    /// Name the element was resolved under.
    pub element_name: &'a str,
    /// Query parameters of the inbound call.
    pub query: &'a BTreeMap<String, String>,
    /// Headers of the inbound call.
    pub headers: &'a BTreeMap<String, String>,
    /// URL of the inbound call.
    pub url: &'a str,
}

/// Template render failure.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TemplateError {
    /// `minijinja` syntax or evaluation error.
    #[error("{0}")]
    Jinja(#[from] minijinja::Error),

    /// Failure reported by another engine implementation.
    #[error("{0}")]
    Engine(String),
}

/// Renders template source against a [`RenderContext`].
pub trait TemplateEngine: Send + Sync {
    /// Render `source` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if the template is invalid or fails to evaluate.
    fn render(&self, source: &str, context: &RenderContext<'_>) -> Result<String, TemplateError>;
}

/// Jinja-syntax engine (`{{ data.title }}`, `{% for item in data.items %}`).
///
/// Output is not auto-escaped: templates produce markup.
pub struct JinjaEngine {
    env: Environment<'static>,
}

impl fmt::Debug for JinjaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JinjaEngine").finish_non_exhaustive()
    }
}

impl Default for JinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl JinjaEngine {
    /// Create an engine with the default environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }
}

impl TemplateEngine for JinjaEngine {
    fn render(&self, source: &str, context: &RenderContext<'_>) -> Result<String, TemplateError> {
        Ok(self.env.render_str(source, context)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn render(source: &str, data: &Value) -> Result<String, TemplateError> {
        let mut query = BTreeMap::new();
        query.insert("page".to_owned(), "2".to_owned());
        let headers = BTreeMap::new();
        let context = RenderContext {
            data,
            element_name: "infobox",
            query: &query,
            headers: &headers,
            url: "/news?page=2",
        };
        JinjaEngine::new().render(source, &context)
    }

    #[test]
    fn test_render_data_fields() {
        let out = render("<h2>{{ data.title }}</h2>", &json!({"title": "Hi"})).unwrap();
        assert_eq!(out, "<h2>Hi</h2>");
    }

    #[test]
    fn test_render_loop_and_context_fields() {
        let data = json!({"items": [{"t": "a"}, {"t": "b"}]});
        let out = render(
            "{% for item in data.items %}<i>{{ item.t }}</i>{% endfor %}|{{ elementName }}|{{ query.page }}|{{ url }}",
            &data,
        )
        .unwrap();
        assert_eq!(out, "<i>a</i><i>b</i>|infobox|2|/news?page=2");
    }

    #[test]
    fn test_render_does_not_escape_markup() {
        let out = render("{{ data.body }}", &json!({"body": "<p>x</p>"})).unwrap();
        assert_eq!(out, "<p>x</p>");
    }

    #[test]
    fn test_render_syntax_error() {
        assert!(render("{% for %}", &json!({})).is_err());
    }
}

//! Resolution of HTML embedded in structured payloads.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::document::DocumentResolver;

/// Matches at least one tag-like substring (`<p>`, `</div>`, `<!-- -->`).
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[a-zA-Z!/][^>]*>").expect("valid regex"));

/// Whether a string should be treated as embedded HTML.
#[must_use]
pub fn looks_like_html(text: &str) -> bool {
    TAG_PATTERN.is_match(text)
}

/// One step into a nested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Mapping key.
    Key(String),
    /// Sequence index.
    Index(usize),
}

/// Location of a string leaf inside a payload, used in diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyPath(Vec<PathSegment>);

impl PropertyPath {
    /// Segments from the payload root.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match segment {
                PathSegment::Key(key) => f.write_str(key)?,
                PathSegment::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

/// Restricts payload resolution to leaves at given property paths.
///
/// Paths are slash-separated (`contents/en_US/content`) and match the end
/// of a leaf's location, so `content` matches `items/3/content`. Numeric
/// segments match sequence indices. An empty filter matches every leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    paths: Vec<Vec<String>>,
}

impl PropertyFilter {
    /// Build a filter from slash-separated paths. Blank entries are ignored.
    #[must_use]
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = paths
            .into_iter()
            .map(|path| {
                path.as_ref()
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_owned)
                    .collect::<Vec<_>>()
            })
            .filter(|segments| !segments.is_empty())
            .collect();
        Self { paths }
    }

    /// Whether the filter accepts every leaf.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether a leaf at `path` should be resolved.
    #[must_use]
    pub fn matches(&self, path: &[PathSegment]) -> bool {
        if self.paths.is_empty() {
            return true;
        }
        self.paths.iter().any(|wanted| {
            wanted.len() <= path.len()
                && path[path.len() - wanted.len()..]
                    .iter()
                    .zip(wanted)
                    .all(|(segment, want)| match segment {
                        PathSegment::Key(key) => key == want,
                        PathSegment::Index(index) => want.parse::<usize>().ok() == Some(*index),
                    })
        })
    }
}

/// Walks a payload and resolves every HTML-bearing string leaf in place.
#[derive(Debug, Clone)]
pub struct PayloadResolver {
    documents: Arc<DocumentResolver>,
    filter: PropertyFilter,
}

impl PayloadResolver {
    /// Create a payload resolver that resolves every HTML-looking leaf.
    #[must_use]
    pub fn new(documents: Arc<DocumentResolver>) -> Self {
        Self {
            documents,
            filter: PropertyFilter::default(),
        }
    }

    /// Only resolve leaves accepted by `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: PropertyFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Resolve HTML strings inside `payload`; returns how many were replaced.
    ///
    /// Leaves are resolved concurrently. A leaf that fails keeps its original
    /// text and the failure is recorded in `ctx` with its property path.
    pub async fn resolve(&self, payload: &mut Value, ctx: &Arc<RequestContext>) -> usize {
        let mut leaves = Vec::new();
        collect_leaves(payload, &mut Vec::new(), &self.filter, &mut leaves);
        if leaves.is_empty() {
            return 0;
        }
        debug!(request_id = %ctx.request_id(), leaves = leaves.len(), "Resolving payload");

        let mut tasks = JoinSet::new();
        for (index, (_, text)) in leaves.iter().enumerate() {
            let html = (**text).clone();
            let documents = Arc::clone(&self.documents);
            let task_ctx = Arc::clone(ctx);
            tasks.spawn(RequestContext::scope(Arc::clone(ctx), async move {
                (index, documents.resolve(&html, &task_ctx).await)
            }));
        }

        let mut resolved = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(html))) => {
                    let (_, text) = &mut leaves[index];
                    **text = html;
                    resolved += 1;
                }
                Ok((index, Err(err))) => {
                    let path = &leaves[index].0;
                    warn!(request_id = %ctx.request_id(), %path, error = %err, "Payload leaf resolution failed");
                    ctx.add_error(format!("{path}: {err}"));
                }
                Err(err) => {
                    warn!(request_id = %ctx.request_id(), error = %err, "Payload task aborted");
                    ctx.add_error(format!("payload task aborted: {err}"));
                }
            }
        }
        resolved
    }
}

fn collect_leaves<'a>(
    value: &'a mut Value,
    path: &mut Vec<PathSegment>,
    filter: &PropertyFilter,
    out: &mut Vec<(PropertyPath, &'a mut String)>,
) {
    match value {
        Value::String(text) => {
            if looks_like_html(text) && filter.matches(path) {
                out.push((PropertyPath(path.clone()), text));
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                path.push(PathSegment::Index(index));
                collect_leaves(item, path, filter, out);
                path.pop();
            }
        }
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                path.push(PathSegment::Key(key.clone()));
                collect_leaves(item, path, filter, out);
                path.pop();
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::controller::{ControllerResult, ControllerSet, controller_fn};
    use crate::element::ElementResolver;
    use crate::template::MemoryTemplates;

    fn payload_resolver() -> PayloadResolver {
        let controllers = ControllerSet::new()
            .with_controller(
                "x-up",
                controller_fn(|element, _, _| {
                    Ok(ControllerResult::markup(format!(
                        "<b>{}</b>",
                        element.text_content().to_uppercase()
                    )))
                }),
            )
            .with_controller(
                "x-broken",
                controller_fn(|_, _, _| Err("nope".into())),
            );
        let elements = ElementResolver::new(Arc::new(controllers), Arc::new(MemoryTemplates::new()));
        PayloadResolver::new(Arc::new(DocumentResolver::new(elements)))
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("<p>x</p>"));
        assert!(looks_like_html("text with <br/> inside"));
        assert!(looks_like_html("<!-- note -->"));
        assert!(!looks_like_html("1 < 2 and 3 > 2"));
        assert!(!looks_like_html("plain"));
    }

    #[tokio::test]
    async fn test_deep_traversal_preserves_shape() {
        let resolver = payload_resolver();
        let ctx = Arc::new(RequestContext::new("/"));
        let mut payload = json!({"a": {"b": ["<p>x</p>", 42, {"c": "<i>y</i>"}]}});

        let count = resolver.resolve(&mut payload, &ctx).await;

        assert_eq!(count, 2);
        assert_eq!(
            payload,
            json!({"a": {"b": ["<p>x</p>", 42, {"c": "<i>y</i>"}]}})
        );
    }

    #[tokio::test]
    async fn test_widgets_in_leaves_are_resolved() {
        let resolver = payload_resolver();
        let ctx = Arc::new(RequestContext::new("/"));
        let mut payload = json!({
            "title": "plain <not a tag",
            "items": [{"body": "<p><x-up>hi</x-up></p>"}, {"body": "<x-up>yo</x-up>"}],
            "flag": true,
        });

        resolver.resolve(&mut payload, &ctx).await;

        assert_eq!(
            payload,
            json!({
                "title": "plain <not a tag",
                "items": [{"body": "<p><b>HI</b></p>"}, {"body": "<b>YO</b>"}],
                "flag": true,
            })
        );
    }

    #[tokio::test]
    async fn test_top_level_string() {
        let resolver = payload_resolver();
        let ctx = Arc::new(RequestContext::new("/"));
        let mut payload = json!("<x-up>a</x-up>");

        resolver.resolve(&mut payload, &ctx).await;

        assert_eq!(payload, json!("<b>A</b>"));
    }

    #[tokio::test]
    async fn test_filter_limits_leaves() {
        let resolver =
            payload_resolver().with_filter(PropertyFilter::new(["contents/en_US/content"]));
        let ctx = Arc::new(RequestContext::new("/"));
        let mut payload = json!({
            "contents": {
                "en_US": {"content": "<x-up>en</x-up>"},
                "fr_FR": {"content": "<x-up>fr</x-up>"},
            },
            "summary": "<x-up>s</x-up>",
        });

        let count = resolver.resolve(&mut payload, &ctx).await;

        assert_eq!(count, 1);
        assert_eq!(payload["contents"]["en_US"]["content"], json!("<b>EN</b>"));
        assert_eq!(payload["contents"]["fr_FR"]["content"], json!("<x-up>fr</x-up>"));
        assert_eq!(payload["summary"], json!("<x-up>s</x-up>"));
    }

    #[test]
    fn test_filter_suffix_and_index_matching() {
        let filter = PropertyFilter::new(["body", "/list/0/"]);
        let key = |k: &str| PathSegment::Key(k.to_owned());

        assert!(filter.matches(&[key("items"), PathSegment::Index(3), key("body")]));
        assert!(filter.matches(&[key("list"), PathSegment::Index(0)]));
        assert!(!filter.matches(&[key("list"), PathSegment::Index(1)]));
        assert!(!filter.matches(&[key("body"), key("title")]));
        assert!(PropertyFilter::new(Vec::<String>::new()).matches(&[]));
    }

    #[tokio::test]
    async fn test_leaf_failure_is_isolated() {
        let resolver = payload_resolver();
        let ctx = Arc::new(RequestContext::new("/"));
        let mut payload = json!({"ok": "<x-up>a</x-up>", "bad": ["<x-broken></x-broken>"]});

        let count = resolver.resolve(&mut payload, &ctx).await;

        assert_eq!(count, 2);
        assert_eq!(payload["ok"], json!("<b>A</b>"));
        assert_eq!(payload["bad"][0], json!("<x-broken></x-broken>"));
        assert_eq!(
            ctx.diagnostics().errors,
            vec!["x-broken: controller failed: nope"]
        );
    }

    #[test]
    fn test_property_path_display() {
        let path = PropertyPath(vec![
            PathSegment::Key("a".to_owned()),
            PathSegment::Index(2),
            PathSegment::Key("c".to_owned()),
        ]);
        assert_eq!(path.to_string(), "a/2/c");
        assert_eq!(PropertyPath::default().to_string(), "(root)");
    }
}

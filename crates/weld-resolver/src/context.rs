//! Request-scoped context and diagnostics.
//!
//! One [`RequestContext`] exists per inbound call. It is shared (`Arc`) with
//! every task spawned while resolving that call and is additionally installed
//! as a task-local, so helpers that were not handed the context explicitly can
//! still reach it through [`RequestContext::try_current`].

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use uuid::Uuid;

tokio::task_local! {
    static CURRENT: Arc<RequestContext>;
}

/// Notes and non-fatal errors collected while handling one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Timing and informational notes.
    pub notes: Vec<String>,
    /// Failures that were contained to one element or payload leaf.
    pub errors: Vec<String>,
}

/// Per-call request metadata plus an append-only diagnostics sink.
#[derive(Debug)]
pub struct RequestContext {
    request_id: Uuid,
    method: String,
    url: String,
    headers: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    languages: Option<Vec<String>>,
    diagnostics: Mutex<Diagnostics>,
}

impl RequestContext {
    /// Create a context for a call to `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method: "GET".to_owned(),
            url: url.into(),
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            languages: None,
            diagnostics: Mutex::new(Diagnostics::default()),
        }
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Add a header. Names are stored lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Override the language preferences derived from `Accept-Language`.
    #[must_use]
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.languages = Some(
            languages
                .into_iter()
                .map(|lang| lang.as_ref().to_ascii_lowercase())
                .collect(),
        );
        self
    }

    /// Unique id of this call (used in log fields).
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// HTTP method of the inbound call.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request URL (path and query).
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request headers keyed by lower-cased name.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Query parameters.
    #[must_use]
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Accepted languages, most preferred first.
    #[must_use]
    pub fn languages(&self) -> Vec<String> {
        match &self.languages {
            Some(languages) => languages.clone(),
            None => self
                .header("accept-language")
                .map(parse_accept_language)
                .unwrap_or_default(),
        }
    }

    /// Record an informational note.
    pub fn add_note(&self, note: impl Into<String>) {
        self.lock().notes.push(note.into());
    }

    /// Record a contained failure.
    pub fn add_error(&self, error: impl Into<String>) {
        self.lock().errors.push(error.into());
    }

    /// Snapshot of the diagnostics collected so far.
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        self.lock().clone()
    }

    /// Run `future` with `ctx` installed as the current context.
    pub async fn scope<F: Future>(ctx: Arc<Self>, future: F) -> F::Output {
        CURRENT.scope(ctx, future).await
    }

    /// The context installed by the enclosing [`RequestContext::scope`], if any.
    #[must_use]
    pub fn try_current() -> Option<Arc<Self>> {
        CURRENT.try_with(Arc::clone).ok()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Diagnostics> {
        // Appends never leave the lists half-written, so a poisoned lock is still usable.
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Parse an `Accept-Language` header into language tags ordered by quality.
///
/// Tags are lower-cased, `*` and `q=0` entries are dropped, and entries with
/// equal quality keep their header order.
#[must_use]
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut entries: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim().to_ascii_lowercase();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let quality = pieces
                .find_map(|piece| piece.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (quality > 0.0).then_some((tag, quality))
        })
        .collect();

    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.into_iter().map(|(tag, _)| tag).collect()
}

//! `filelist`: a list of downloadable files.

use async_trait::async_trait;
use serde_json::{Value, json};
use url::Url;
use weld_html::{Element, Selector};
use weld_resolver::{Controller, ControllerError, ControllerResult, RequestContext};

/// Extracts `{onCard, files: [{name, url, type}]}` from `li` entries.
///
/// `name` is the link text, `url` the last path segment of the link target
/// and `type` the entry's `data-type`. Entries without a link are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileListController;

#[async_trait]
impl Controller for FileListController {
    async fn resolve(
        &self,
        element: &mut Element,
        _element_name: &str,
        _ctx: &RequestContext,
    ) -> Result<ControllerResult, ControllerError> {
        let item = Selector::parse("li")?;
        let link = Selector::parse("a")?;
        let doc = element.document();

        let files: Vec<Value> = element
            .select(&item)
            .into_iter()
            .filter_map(|li| {
                let anchor = doc.select_first(li, &link)?;
                let href = doc.attr(anchor, "href").unwrap_or_default();
                Some(json!({
                    "name": doc.text_content(anchor).trim(),
                    "url": file_name(href),
                    "type": doc.attr(li, "data-type").unwrap_or_default(),
                }))
            })
            .collect();

        Ok(ControllerResult::data(json!({
            "onCard": element.attr("data-widget-on-card") == Some("true"),
            "files": files,
        })))
    }
}

/// Last path segment of `href`, ignoring query and fragment.
fn file_name(href: &str) -> String {
    if let Ok(url) = Url::parse(href) {
        return url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_owned();
    }
    // Relative reference.
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').next().unwrap_or_default().to_owned()
}

//! `infobox`: a highlighted box with a title.

use async_trait::async_trait;
use serde_json::json;
use weld_html::{Element, Selector};
use weld_resolver::{Controller, ControllerError, ControllerResult, RequestContext};

/// Extracts `{title, body, onCard, type}`.
///
/// The first `h1` becomes the title and is removed before the body is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct InfoboxController;

#[async_trait]
impl Controller for InfoboxController {
    async fn resolve(
        &self,
        element: &mut Element,
        _element_name: &str,
        _ctx: &RequestContext,
    ) -> Result<ControllerResult, ControllerError> {
        let heading = element.select_first(&Selector::parse("h1")?);
        let title = heading
            .map(|id| element.document().text_content(id).trim().to_owned())
            .unwrap_or_default();
        if let Some(id) = heading {
            element.remove(id);
        }

        Ok(ControllerResult::data(json!({
            "title": title,
            "body": element.inner_html().trim(),
            "onCard": element.attr("data-widget-on-card") == Some("true"),
            "type": element.attr("data-widget-conf-type").unwrap_or_default(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing;

    const SAMPLE: &str = r#"<div data-widget-type="Infobox" data-widget-on-card="true" data-widget-conf-type="warning">
    <h1>This is an Infobox</h1>
    <p>This is some content inside the infobox.</p>
</div>"#;

    #[tokio::test]
    async fn test_infobox_data() {
        let mut element = Element::from_html(SAMPLE).unwrap();
        let ctx = RequestContext::new("/");

        let result = InfoboxController
            .resolve(&mut element, "infobox", &ctx)
            .await
            .unwrap();

        assert_eq!(
            result,
            ControllerResult::Data(json!({
                "title": "This is an Infobox",
                "body": "<p>This is some content inside the infobox.</p>",
                "onCard": true,
                "type": "warning",
            }))
        );
    }

    #[tokio::test]
    async fn test_infobox_without_heading() {
        let mut element =
            Element::from_html(r#"<div data-widget-type="infobox"><p>x</p></div>"#).unwrap();
        let ctx = RequestContext::new("/");

        let result = InfoboxController
            .resolve(&mut element, "infobox", &ctx)
            .await
            .unwrap();

        assert_eq!(
            result,
            ControllerResult::Data(json!({
                "title": "",
                "body": "<p>x</p>",
                "onCard": false,
                "type": "",
            }))
        );
    }

    #[tokio::test]
    async fn test_infobox_rendered() {
        let (html, ctx) = testing::resolve(SAMPLE).await;

        assert!(ctx.diagnostics().errors.is_empty());
        assert!(html.starts_with(r#"<aside class="infobox infobox-warning infobox-card">"#));
        assert!(html.contains(r#"<h3 class="infobox-title">This is an Infobox</h3>"#));
        assert!(html.contains("<p>This is some content inside the infobox.</p>"));
        assert!(!html.contains("<h1>"));
    }
}

//! `accordion`: collapsible panels.

use async_trait::async_trait;
use serde_json::{Value, json};
use weld_html::{Element, Selector};
use weld_resolver::{Controller, ControllerError, ControllerResult, RequestContext};

/// Extracts `{items: [{title, content}]}` from `div[data-panel]` children.
///
/// Each panel holds a `div[data-title]` and a `div[data-content]`; their
/// inner markup is kept as-is. Missing parts become empty strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccordionController;

#[async_trait]
impl Controller for AccordionController {
    async fn resolve(
        &self,
        element: &mut Element,
        _element_name: &str,
        _ctx: &RequestContext,
    ) -> Result<ControllerResult, ControllerError> {
        let panel = Selector::parse("div[data-panel]")?;
        let title = Selector::parse("div[data-title]")?;
        let content = Selector::parse("div[data-content]")?;
        let doc = element.document();

        let part = |scope, selector: &Selector| {
            doc.select_first(scope, selector)
                .map(|id| doc.inner_html(id).trim().to_owned())
                .unwrap_or_default()
        };
        let items: Vec<Value> = element
            .select(&panel)
            .into_iter()
            .map(|id| {
                json!({
                    "title": part(id, &title),
                    "content": part(id, &content),
                })
            })
            .collect();

        Ok(ControllerResult::data(json!({ "items": items })))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing;

    const SAMPLE: &str = r#"<div data-widget-type="Accordion">
    <div data-panel="">
        <div data-title="">Foo</div>
        <div data-content="">This is some content for <b>foo</b>.</div>
    </div>
    <div data-panel="">
        <div data-title="">Bar</div>
        <div data-content="">This is some content for bar.</div>
    </div>
</div>"#;

    #[tokio::test]
    async fn test_accordion_items() {
        let mut element = Element::from_html(SAMPLE).unwrap();
        let ctx = RequestContext::new("/");

        let result = AccordionController
            .resolve(&mut element, "accordion", &ctx)
            .await
            .unwrap();

        assert_eq!(
            result,
            ControllerResult::Data(json!({
                "items": [
                    {"title": "Foo", "content": "This is some content for <b>foo</b>."},
                    {"title": "Bar", "content": "This is some content for bar."},
                ]
            }))
        );
    }

    #[tokio::test]
    async fn test_accordion_rendered() {
        let (html, _) = testing::resolve(SAMPLE).await;

        assert!(html.starts_with(r#"<div class="accordion">"#));
        assert_eq!(html.matches("<details").count(), 2);
        assert!(html.contains("<summary>Bar</summary>"));
    }

    #[tokio::test]
    async fn test_accordion_without_panels() {
        let mut element = Element::from_html(r#"<div data-widget-type="accordion"></div>"#).unwrap();
        let ctx = RequestContext::new("/");

        let result = AccordionController
            .resolve(&mut element, "accordion", &ctx)
            .await
            .unwrap();

        assert_eq!(result, ControllerResult::Data(json!({ "items": [] })));
    }
}

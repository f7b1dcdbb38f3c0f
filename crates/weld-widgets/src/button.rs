//! `button`: a link rendered as a `<button>`.

use async_trait::async_trait;
use weld_html::{Element, escape_attr, escape_text};
use weld_resolver::{Controller, ControllerError, ControllerResult, RequestContext};

/// Attribute holding the link target.
const HREF_ATTRIBUTE: &str = "data-widget-conf-href";

/// Turns `<div data-widget-type="button" data-widget-conf-href="URL">Label</div>`
/// into a button navigating to `URL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonController;

#[async_trait]
impl Controller for ButtonController {
    async fn resolve(
        &self,
        element: &mut Element,
        _element_name: &str,
        _ctx: &RequestContext,
    ) -> Result<ControllerResult, ControllerError> {
        let href = element.attr(HREF_ATTRIBUTE).unwrap_or_default();
        Ok(ControllerResult::markup(format!(
            r#"<button onclick="document.location='{}'">{}</button>"#,
            escape_attr(href),
            escape_text(element.text_content().trim())
        )))
    }
}

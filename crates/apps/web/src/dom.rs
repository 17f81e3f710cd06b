//! DOM-backed implementation of the scroll surface.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Window};

use motion::scroll::ScrollSurface;

/// Wraps the window, body and the scrolled content element.
pub struct DomScrollSurface {
    window: Window,
    body: HtmlElement,
    content: HtmlElement,
}

impl DomScrollSurface {
    /// Look up the content element once at construction. A page without it
    /// is a deployment error; fail fast with a descriptive error instead of
    /// animating a missing element.
    pub fn attach(
        window: &Window,
        document: &Document,
        content_id: &str,
    ) -> Result<Self, JsValue> {
        let content = document
            .get_element_by_id(content_id)
            .ok_or_else(|| JsValue::from_str(&format!("missing #{content_id} content element")))?
            .dyn_into::<HtmlElement>()?;
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document body missing"))?;

        Ok(Self {
            window: window.clone(),
            body,
            content,
        })
    }
}

impl ScrollSurface for DomScrollSurface {
    fn content_rect_height(&self) -> f64 {
        self.content.get_bounding_client_rect().height()
    }

    fn content_client_height(&self) -> f64 {
        f64::from(self.content.client_height())
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn set_body_height(&mut self, px: f64) {
        let _ = self.body.style().set_property("height", &format!("{px}px"));
    }

    fn set_content_offset(&mut self, px: f64) {
        let _ = self
            .content
            .style()
            .set_property("transform", &format!("translateY({px}px)"));
    }
}

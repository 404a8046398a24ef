//! Floating tooltip owned by one graph instance.
//!
//! The element is appended to `document.body` so it can overflow the canvas
//! container, and removed again when the [`Tooltip`] is dropped.

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use super::state::TooltipContent;
use crate::error::{GraphError, Result};

const OFFSET_PX: f64 = 12.0;

const STYLE: &str = "position: fixed; pointer-events: none; z-index: 1000; display: none; \
	max-width: 320px; padding: 6px 8px; border-radius: 4px; font: 12px sans-serif; \
	color: #fff; background: rgba(20, 20, 40, 0.92); box-shadow: 0 2px 8px rgba(0, 0, 0, 0.4);";

pub struct Tooltip {
	document: Document,
	element: HtmlElement,
}

impl Tooltip {
	pub fn attach() -> Result<Self> {
		let document = web_sys::window()
			.ok_or(GraphError::NoWindow)?
			.document()
			.ok_or(GraphError::NoDocument)?;
		let body = document.body().ok_or(GraphError::NoDocument)?;
		let element: HtmlElement = document
			.create_element("div")?
			.dyn_into()
			.map_err(|_| GraphError::Dom("tooltip is not an HtmlElement".into()))?;
		element.set_class_name("triple-graph-tooltip");
		element.set_attribute("style", STYLE)?;
		body.append_child(&element)?;
		Ok(Self { document, element })
	}

	/// Shows `content` next to the pointer. `origin` is the canvas' client
	/// offset, since tooltip coordinates are canvas-relative.
	pub fn show(&self, content: &TooltipContent, origin: (f64, f64)) -> Result<()> {
		self.element.set_inner_html("");
		self.append_line(&content.label, "font-weight: bold;")?;
		self.append_line(content.node_type.as_str(), "opacity: 0.7; margin-bottom: 4px;")?;
		for (key, value) in &content.properties {
			self.append_line(&format!("{key}: {value}"), "")?;
		}
		let style = self.element.style();
		style.set_property("left", &format!("{}px", origin.0 + content.x + OFFSET_PX))?;
		style.set_property("top", &format!("{}px", origin.1 + content.y + OFFSET_PX))?;
		style.set_property("display", "block")?;
		Ok(())
	}

	pub fn hide(&self) {
		let _ = self.element.style().set_property("display", "none");
	}

	fn append_line(&self, text: &str, style: &str) -> Result<()> {
		let line = self.document.create_element("div")?;
		line.set_text_content(Some(text));
		if !style.is_empty() {
			line.set_attribute("style", style)?;
		}
		self.element.append_child(&line)?;
		Ok(())
	}
}

impl Drop for Tooltip {
	fn drop(&mut self) {
		self.element.remove();
	}
}

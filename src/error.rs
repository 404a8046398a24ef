//! Error type for graph setup and configuration.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures surfaced at the component boundary.
///
/// Malformed triples are not errors: the ingestor drops them. An empty graph
/// is not an error either.
#[derive(Debug, Error)]
pub enum GraphError {
	/// No `window` global, e.g. when running outside a browser.
	#[error("no browser window available")]
	NoWindow,

	/// No `document` or `document.body`.
	#[error("no document body available")]
	NoDocument,

	/// The canvas `NodeRef` was not mounted when setup ran.
	#[error("canvas element is not mounted")]
	CanvasUnavailable,

	/// `canvas.getContext("2d")` returned null or a non-2d context.
	#[error("2d rendering context unavailable")]
	ContextUnavailable,

	/// A DOM call threw.
	#[error("DOM operation failed: {0}")]
	Dom(String),

	/// Triple or config JSON could not be parsed.
	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),

	/// JSON parsed but had the wrong top-level shape.
	#[error("expected a JSON array of triple records, found {0}")]
	NotAnArray(&'static str),

	/// Config JSON was not an object.
	#[error("expected a JSON object of config sections, found {0}")]
	NotAnObject(&'static str),
}

impl From<JsValue> for GraphError {
	fn from(value: JsValue) -> Self {
		GraphError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}

/// Convenience alias used across the crate.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;

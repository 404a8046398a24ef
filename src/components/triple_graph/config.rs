//! Tunables for layout, viewport and display.
//!
//! Every field has a default, so a host may pass a partial JSON document and
//! only override what it cares about.

use serde::Deserialize;
use serde_json::Value;

use super::ingest::kind_of;
use crate::error::{GraphError, Result};

/// All tunables of one graph view.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct GraphConfig {
	/// Force simulation parameters.
	#[serde(default)]
	pub layout: LayoutConfig,

	/// Zoom factors, scale bounds and transition timing.
	#[serde(default)]
	pub viewport: ViewportConfig,

	/// Drawing and pointer tolerances.
	#[serde(default)]
	pub display: DisplayConfig,
}

impl GraphConfig {
	/// Parses a JSON object, filling missing sections and fields with defaults.
	///
	/// Anything but a top-level object is rejected; serde would otherwise
	/// read an array positionally as `[layout, viewport, display]`.
	pub fn from_json(text: &str) -> Result<Self> {
		match serde_json::from_str::<Value>(text)? {
			value @ Value::Object(_) => Ok(serde_json::from_value(value)?),
			other => Err(GraphError::NotAnObject(kind_of(&other))),
		}
	}
}

/// Force simulation parameters, d3-force compatible.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LayoutConfig {
	/// Rest length of the link force.
	#[serde(default = "default_link_distance")]
	pub link_distance: f64,

	/// Many-body strength; negative repels.
	#[serde(default = "default_charge_strength")]
	pub charge_strength: f64,

	/// Fraction of the mean offset removed per tick by centering.
	#[serde(default = "default_center_strength")]
	pub center_strength: f64,

	/// Per-node collision radius.
	#[serde(default = "default_collision_radius")]
	pub collision_radius: f64,

	/// Alpha below which the simulation stops ticking.
	#[serde(default = "default_alpha_min")]
	pub alpha_min: f64,

	/// Per-tick approach of alpha toward its target.
	#[serde(default = "default_alpha_decay")]
	pub alpha_decay: f64,

	/// Fraction of velocity lost per tick.
	#[serde(default = "default_velocity_decay")]
	pub velocity_decay: f64,

	/// Alpha target held while a node is dragged.
	#[serde(default = "default_drag_alpha_target")]
	pub drag_alpha_target: f64,

	/// Alpha applied on drag release and on resize.
	#[serde(default = "default_reheat_alpha")]
	pub reheat_alpha: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			link_distance: default_link_distance(),
			charge_strength: default_charge_strength(),
			center_strength: default_center_strength(),
			collision_radius: default_collision_radius(),
			alpha_min: default_alpha_min(),
			alpha_decay: default_alpha_decay(),
			velocity_decay: default_velocity_decay(),
			drag_alpha_target: default_drag_alpha_target(),
			reheat_alpha: default_reheat_alpha(),
		}
	}
}

fn default_link_distance() -> f64 {
	100.0
}

fn default_charge_strength() -> f64 {
	-300.0
}

fn default_center_strength() -> f64 {
	1.0
}

fn default_collision_radius() -> f64 {
	30.0
}

fn default_alpha_min() -> f64 {
	0.001
}

// Cools from 1.0 to alpha_min in ~300 ticks.
fn default_alpha_decay() -> f64 {
	1.0 - default_alpha_min().powf(1.0 / 300.0)
}

fn default_velocity_decay() -> f64 {
	0.4
}

fn default_drag_alpha_target() -> f64 {
	0.3
}

fn default_reheat_alpha() -> f64 {
	0.3
}

/// Viewport zoom behavior.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ViewportConfig {
	/// Scale multiplier of the zoom-in button.
	#[serde(default = "default_zoom_in_factor")]
	pub zoom_in_factor: f64,

	/// Scale multiplier of the zoom-out button.
	#[serde(default = "default_zoom_out_factor")]
	pub zoom_out_factor: f64,

	/// Lower scale bound.
	#[serde(default = "default_min_scale")]
	pub min_scale: f64,

	/// Upper scale bound.
	#[serde(default = "default_max_scale")]
	pub max_scale: f64,

	/// Duration of button-driven zoom/reset animations.
	#[serde(default = "default_transition_ms")]
	pub transition_ms: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			zoom_in_factor: default_zoom_in_factor(),
			zoom_out_factor: default_zoom_out_factor(),
			min_scale: default_min_scale(),
			max_scale: default_max_scale(),
			transition_ms: default_transition_ms(),
		}
	}
}

fn default_zoom_in_factor() -> f64 {
	1.3
}

fn default_zoom_out_factor() -> f64 {
	0.7
}

fn default_min_scale() -> f64 {
	0.1
}

fn default_max_scale() -> f64 {
	10.0
}

fn default_transition_ms() -> f64 {
	300.0
}

/// Drawing and pointer tolerances.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DisplayConfig {
	/// Hovered nodes render (and hit-test) at `size * hover_scale`.
	#[serde(default = "default_hover_scale")]
	pub hover_scale: f64,

	/// Node labels longer than this many characters are truncated.
	#[serde(default = "default_max_label_len")]
	pub max_label_len: usize,

	/// Pointer travel in px below which a press/release counts as a click.
	#[serde(default = "default_click_slop")]
	pub click_slop: f64,

	/// Canvas fill color.
	#[serde(default = "default_background")]
	pub background: String,
}

impl Default for DisplayConfig {
	fn default() -> Self {
		Self {
			hover_scale: default_hover_scale(),
			max_label_len: default_max_label_len(),
			click_slop: default_click_slop(),
			background: default_background(),
		}
	}
}

fn default_hover_scale() -> f64 {
	1.5
}

fn default_max_label_len() -> usize {
	20
}

fn default_click_slop() -> f64 {
	3.0
}

fn default_background() -> String {
	"#1a1a2e".to_string()
}

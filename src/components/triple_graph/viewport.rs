//! Pan/zoom transform applied on top of the layout.
//!
//! Button-driven changes (zoom in/out, reset) animate toward a target with a
//! cubic ease-out. Pointer-driven changes (wheel, drag-pan) apply at once and
//! cancel any running animation.

use super::config::ViewportConfig;
use super::simulation::Point;

pub(crate) fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// `screen = graph * k + (x, y)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
	/// Horizontal offset in screen px.
	pub x: f64,
	/// Vertical offset in screen px.
	pub y: f64,
	/// Scale.
	pub k: f64,
}

impl Default for Transform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl Transform {
	/// No pan, unit scale.
	pub const IDENTITY: Transform = Transform {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	/// Graph point to screen point.
	pub fn apply(&self, p: Point) -> Point {
		Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	/// Screen point to graph point.
	pub fn invert(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Scales by `factor` keeping screen point `(cx, cy)` fixed.
	fn scaled_about(self, cx: f64, cy: f64, factor: f64, min: f64, max: f64) -> Self {
		let k = (self.k * factor).clamp(min, max);
		let ratio = k / self.k;
		Self {
			x: cx - (cx - self.x) * ratio,
			y: cy - (cy - self.y) * ratio,
			k,
		}
	}

	fn lerp(self, to: Transform, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

#[derive(Clone, Debug)]
struct Transition {
	from: Transform,
	to: Transform,
	elapsed: f64,
}

/// Current transform plus any button-driven animation in flight.
#[derive(Clone, Debug)]
pub struct Viewport {
	current: Transform,
	transition: Option<Transition>,
	config: ViewportConfig,
	width: f64,
	height: f64,
}

impl Viewport {
	/// Identity view of a `width` x `height` surface.
	pub fn new(width: f64, height: f64, config: &ViewportConfig) -> Self {
		Self {
			current: Transform::IDENTITY,
			transition: None,
			config: config.clone(),
			width,
			height,
		}
	}

	/// Transform to draw with this frame.
	pub fn transform(&self) -> Transform {
		self.current
	}

	/// Where the transform ends up once any animation finishes.
	pub fn target(&self) -> Transform {
		self.transition.as_ref().map_or(self.current, |t| t.to)
	}

	/// Whether a zoom or reset is still easing.
	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	/// Animated zoom by the configured zoom-in factor.
	pub fn zoom_in(&mut self) {
		self.zoom_by(self.config.zoom_in_factor);
	}

	/// Animated zoom by the configured zoom-out factor.
	pub fn zoom_out(&mut self) {
		self.zoom_by(self.config.zoom_out_factor);
	}

	/// Animated zoom about the surface center.
	pub fn zoom_by(&mut self, factor: f64) {
		let to = self.target().scaled_about(
			self.width / 2.0,
			self.height / 2.0,
			factor,
			self.config.min_scale,
			self.config.max_scale,
		);
		self.animate_to(to);
	}

	/// Animated return to the identity transform.
	pub fn reset(&mut self) {
		self.animate_to(Transform::IDENTITY);
	}

	/// Immediate zoom about a pointer position.
	pub fn wheel_zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.transition = None;
		self.current = self.current.scaled_about(
			sx,
			sy,
			factor,
			self.config.min_scale,
			self.config.max_scale,
		);
	}

	/// Immediate translation by a screen-space delta.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.transition = None;
		self.current.x += dx;
		self.current.y += dy;
	}

	/// Steps a running animation by `dt_ms` milliseconds.
	pub fn advance(&mut self, dt_ms: f64) {
		let Some(transition) = self.transition.as_mut() else {
			return;
		};
		transition.elapsed += dt_ms.max(0.0);
		let t = transition.elapsed / self.config.transition_ms;
		if t >= 1.0 {
			self.current = transition.to;
			self.transition = None;
		} else {
			self.current = transition.from.lerp(transition.to, ease_out_cubic(t));
		}
	}

	/// Moves the zoom anchor to the new surface center.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Inverse of [`Viewport::graph_to_screen`].
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		self.current.invert(sx, sy)
	}

	/// Applies the current transform.
	pub fn graph_to_screen(&self, p: Point) -> Point {
		self.current.apply(p)
	}

	fn animate_to(&mut self, to: Transform) {
		if self.config.transition_ms <= 0.0 {
			self.current = to;
			self.transition = None;
			return;
		}
		self.transition = Some(Transition {
			from: self.current,
			to,
			elapsed: 0.0,
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn viewport() -> Viewport {
		Viewport::new(800.0, 600.0, &ViewportConfig::default())
	}

	fn settle(v: &mut Viewport) {
		v.advance(10_000.0);
	}

	#[test]
	fn zoom_buttons_animate_instead_of_jumping() {
		let mut v = viewport();
		v.zoom_in();
		assert_eq!(v.transform(), Transform::IDENTITY);
		assert!(v.is_animating());
		v.advance(100.0);
		let mid = v.transform().k;
		assert!(mid > 1.0 && mid < 1.3);
		settle(&mut v);
		assert!(!v.is_animating());
		assert!((v.transform().k - 1.3).abs() < 1e-12);
	}

	#[test]
	fn zoom_keeps_surface_center_fixed() {
		let mut v = viewport();
		let before = v.screen_to_graph(400.0, 300.0);
		v.zoom_in();
		settle(&mut v);
		let after = v.screen_to_graph(400.0, 300.0);
		assert!(before.distance(after) < 1e-9);
	}

	#[test]
	fn zoom_in_then_reciprocal_zoom_out_restores_scale() {
		let mut v = viewport();
		v.zoom_by(1.3);
		v.zoom_by(1.0 / 1.3);
		settle(&mut v);
		assert!((v.transform().k - 1.0).abs() < 1e-9);
		assert!(v.transform().x.abs() < 1e-9);
	}

	#[test]
	fn default_buttons_compose_from_target() {
		let mut v = viewport();
		v.zoom_in();
		v.zoom_out();
		assert!((v.target().k - 1.3 * 0.7).abs() < 1e-12);
	}

	#[test]
	fn reset_always_yields_identity() {
		let mut v = viewport();
		v.pan_by(120.0, -40.0);
		v.wheel_zoom(10.0, 10.0, -1.0);
		v.zoom_in();
		v.reset();
		settle(&mut v);
		assert_eq!(v.transform(), Transform::IDENTITY);
	}

	#[test]
	fn scale_is_clamped() {
		let mut v = viewport();
		for _ in 0..100 {
			v.wheel_zoom(0.0, 0.0, -1.0);
		}
		assert_eq!(v.transform().k, 10.0);
		for _ in 0..100 {
			v.zoom_out();
		}
		settle(&mut v);
		assert!((v.transform().k - 0.1).abs() < 1e-12);
	}

	#[test]
	fn pointer_gestures_apply_immediately_and_cancel_animation() {
		let mut v = viewport();
		v.zoom_in();
		v.pan_by(5.0, 7.0);
		assert!(!v.is_animating());
		assert_eq!(v.transform(), Transform { x: 5.0, y: 7.0, k: 1.0 });

		let anchor = v.screen_to_graph(200.0, 100.0);
		v.wheel_zoom(200.0, 100.0, 1.0);
		assert!((v.transform().k - 0.9).abs() < 1e-12);
		assert!(anchor.distance(v.screen_to_graph(200.0, 100.0)) < 1e-9);
	}

	#[test]
	fn zero_duration_transitions_are_instant() {
		let config = ViewportConfig {
			transition_ms: 0.0,
			..ViewportConfig::default()
		};
		let mut v = Viewport::new(800.0, 600.0, &config);
		v.zoom_in();
		assert!(!v.is_animating());
		assert!((v.transform().k - 1.3).abs() < 1e-12);
	}

	#[test]
	fn transform_round_trips_points() {
		let t = Transform { x: 30.0, y: -12.0, k: 2.5 };
		let p = Point::new(7.0, 9.0);
		let s = t.apply(p);
		assert!(t.invert(s.x, s.y).distance(p) < 1e-12);
	}
}

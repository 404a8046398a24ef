use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::simulation::Point;
use super::state::GraphView;
use super::types::NodeType;
use super::viewport::ease_out_cubic;

const EDGE_RGB: &str = "100, 180, 255";

/// Global display toggles. Neither affects layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
	/// Draw node and edge labels.
	pub show_labels: bool,
	/// Show the hover tooltip.
	pub show_tooltips: bool,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			show_labels: true,
			show_tooltips: true,
		}
	}
}

/// Fill color for a node category.
pub fn node_color(node_type: NodeType) -> &'static str {
	match node_type {
		NodeType::Person => "#1f77b4",
		NodeType::Company => "#ff7f0e",
		NodeType::Product => "#2ca02c",
		NodeType::Document => "#d62728",
		NodeType::Unknown => "#7f7f7f",
	}
}

/// Shortens `label` to `max` characters plus `...`.
pub fn truncate_label(label: &str, max: usize) -> String {
	match label.char_indices().nth(max) {
		Some((cut, _)) => format!("{}...", &label[..cut]),
		None => label.to_owned(),
	}
}

/// Paints one frame of `view`.
pub fn render(view: &GraphView, options: RenderOptions, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(&view.config.display.background);
	ctx.fill_rect(0.0, 0.0, view.width, view.height);
	if view.graph.is_empty() {
		return;
	}
	let transform = view.viewport.transform();
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	draw_edges(view, options, ctx);
	draw_nodes(view, options, ctx);
	ctx.restore();
}

fn draw_edges(view: &GraphView, options: RenderOptions, ctx: &CanvasRenderingContext2d) {
	let k = view.viewport.transform().k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(view.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(view.hover.level);
	let focus = view.hover.focus();

	for edge in &view.graph.edges {
		let (Some(s), Some(d)) = (
			view.graph.index_of(&edge.source),
			view.graph.index_of(&edge.target),
		) else {
			continue;
		};
		let (Some(a), Some(b)) = (view.snapshot.get(s), view.snapshot.get(d)) else {
			continue;
		};

		// Only edges touching the focused node brighten.
		let touches_focus = focus.is_some_and(|f| f == s || f == d);
		let (edge_alpha, arrow_alpha, width) = if touches_focus {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};

		ctx.set_stroke_style_str(&format!("rgba({EDGE_RGB}, {edge_alpha})"));
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		if s == d {
			let r = view.display_radius(s);
			ctx.begin_path();
			let _ = ctx.arc(a.x + r, a.y - r, r, 0.0, 2.0 * PI);
			ctx.stroke();
			let _ = ctx.set_line_dash(&js_sys::Array::new());
			if options.show_labels {
				draw_edge_label(ctx, &edge.label, Point::new(a.x + 2.0 * r, a.y - 2.0 * r), k);
			}
			continue;
		}

		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = dx.hypot(dy);
		let (rs, rt) = (view.display_radius(s), view.display_radius(d));
		if dist < rs + rt {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
			continue;
		}

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(a.x + ux * rs, a.y + uy * rs);
		ctx.line_to(b.x - ux * (rt + arrow_size), b.y - uy * (rt + arrow_size));
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&format!("rgba({EDGE_RGB}, {arrow_alpha})"));
		let (tip_x, tip_y) = (b.x - ux * rt, b.y - uy * rt);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		if options.show_labels {
			draw_edge_label(ctx, &edge.label, Point::new(a.x + dx / 2.0, a.y + dy / 2.0), k);
		}
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_edge_label(ctx: &CanvasRenderingContext2d, label: &str, at: Point, k: f64) {
	ctx.set_fill_style_str("rgba(180, 210, 255, 0.8)");
	ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
	ctx.set_text_align("center");
	let _ = ctx.fill_text(label, at.x, at.y - 3.0 / k);
	ctx.set_text_align("start");
}

/// How one node is painted this frame.
struct NodeStyle {
	alpha: f64,
	radius: f64,
	/// Outer radius and peak alpha of the glow halo.
	glow: Option<(f64, f64)>,
	outline: bool,
	label_alpha: f64,
}

fn node_style(view: &GraphView, idx: usize, t: f64) -> NodeStyle {
	let radius = view.display_radius(idx);
	let size = view.graph.nodes[idx].size;
	let lit = t > 0.01;
	match view.hover.focus() {
		None => NodeStyle {
			alpha: 1.0,
			radius,
			glow: None,
			outline: false,
			label_alpha: 0.8,
		},
		Some(focus) if focus == idx => NodeStyle {
			alpha: 1.0,
			radius,
			glow: lit.then(|| (size * (1.8 + 1.2 * t), 0.35 * t)),
			outline: lit,
			label_alpha: 1.0,
		},
		Some(_) if view.is_highlighted(idx) => NodeStyle {
			alpha: 1.0,
			radius: size * (1.0 + 0.2 * t),
			glow: lit.then(|| (size * (1.4 + 0.6 * t), 0.2 * t)),
			outline: false,
			label_alpha: 1.0,
		},
		Some(_) => {
			let alpha = 1.0 - 0.7 * t;
			NodeStyle {
				alpha,
				radius: radius * (1.0 - 0.15 * t),
				glow: None,
				outline: false,
				label_alpha: alpha * 0.8,
			}
		}
	}
}

fn draw_nodes(view: &GraphView, options: RenderOptions, ctx: &CanvasRenderingContext2d) {
	let t = ease_out_cubic(view.hover.level);
	let k = view.viewport.transform().k;
	let max_label = view.config.display.max_label_len;

	// Highlighted nodes paint last so they sit on top.
	let (lit, dim): (Vec<usize>, Vec<usize>) = (0..view.graph.nodes.len())
		.partition(|&idx| view.has_active_highlight() && view.is_highlighted(idx));

	for idx in dim.into_iter().chain(lit) {
		let Some(p) = view.snapshot.get(idx) else {
			continue;
		};
		let node = &view.graph.nodes[idx];
		let style = node_style(view, idx, t);

		if let Some((outer, alpha)) = style.glow {
			draw_glow(ctx, p, style.radius * 0.3, outer, alpha);
		}

		ctx.set_global_alpha(style.alpha);
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, style.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node_color(node.node_type));
		ctx.fill();
		ctx.set_global_alpha(1.0);
		draw_selection_ring(view, idx, p, style.radius, ctx);

		if style.outline {
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, style.radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		if options.show_labels {
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", style.label_alpha));
			ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
			let _ = ctx.fill_text(
				&truncate_label(&node.label, max_label),
				p.x + style.radius + 3.0,
				p.y + 3.0,
			);
		}
	}
}

fn draw_glow(ctx: &CanvasRenderingContext2d, p: Point, inner: f64, outer: f64, alpha: f64) {
	let Ok(gradient) = ctx.create_radial_gradient(p.x, p.y, inner, p.x, p.y, outer) else {
		return;
	};
	let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {alpha})"));
	let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
	let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
	ctx.begin_path();
	let _ = ctx.arc(p.x, p.y, outer, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

fn draw_selection_ring(
	view: &GraphView,
	idx: usize,
	p: Point,
	radius: f64,
	ctx: &CanvasRenderingContext2d,
) {
	if view.selected != Some(idx) {
		return;
	}
	let k = view.viewport.transform().k;
	ctx.begin_path();
	let _ = ctx.arc(p.x, p.y, radius + 4.0 / k, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str("#ffd166");
	ctx.set_line_width(2.0 / k);
	ctx.stroke();
}

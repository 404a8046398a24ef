use log::debug;

use super::config::GraphConfig;
use super::simulation::{LayoutSnapshot, Point, Simulation};
use super::types::{GraphData, NodeIdx, NodeType};
use super::viewport::Viewport;

/// Screen-space distance within which a press lands on an edge.
pub const EDGE_HIT_TOLERANCE: f64 = 4.0;

/// Seconds the pointer must rest on a node before the highlight grows.
const HOVER_DWELL_S: f64 = 0.08;
const FADE_IN_RATE: f64 = 1.8;
const FADE_OUT_RATE: f64 = 1.26;

/// Outcome of a pointer sequence, forwarded to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionEvent {
	/// Press and release on the same node without dragging.
	NodeClicked(NodeIdx),
	/// Press and release on an edge, by index into [`GraphData::edges`].
	EdgeClicked(usize),
	/// Press and release on empty space.
	BackgroundClicked,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct DragState {
	pub(crate) node: Option<NodeIdx>,
	start: Point,
	moved: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct PanState {
	active: bool,
	start: Point,
	last: Point,
	moved: bool,
	pressed_edge: Option<usize>,
}

/// Hovered node plus a highlight level in `[0, 1]` that eases in and out.
#[derive(Clone, Debug, Default)]
pub(crate) struct HoverState {
	pub(crate) node: Option<NodeIdx>,
	/// Last hovered node, kept until its highlight has faded.
	pub(crate) fading: Option<NodeIdx>,
	pub(crate) level: f64,
	dwell: f64,
}

impl HoverState {
	/// Node whose neighborhood is currently highlighted.
	pub(crate) fn focus(&self) -> Option<NodeIdx> {
		self.node.or(self.fading)
	}

	fn enter(&mut self, node: Option<NodeIdx>) {
		if self.node.is_none() {
			self.dwell = 0.0;
		}
		self.fading = if node.is_none() { self.node } else { None };
		self.node = node;
	}

	fn advance(&mut self, dt: f64) {
		let (target, rate) = match self.node {
			Some(_) => {
				self.dwell = (self.dwell + dt).min(HOVER_DWELL_S);
				if self.dwell < HOVER_DWELL_S {
					return;
				}
				(1.0, FADE_IN_RATE)
			}
			None => (0.0, FADE_OUT_RATE),
		};
		self.level += (target - self.level) * (rate * dt).min(1.0);
		if self.node.is_none() && self.level < 0.01 {
			self.level = 0.0;
			self.fading = None;
		}
	}
}

/// What the tooltip shows for the hovered node.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipContent {
	/// Node label.
	pub label: String,
	/// Inferred node category.
	pub node_type: NodeType,
	/// Literal properties, sorted by key.
	pub properties: Vec<(String, String)>,
	/// Pointer x on the canvas.
	pub x: f64,
	/// Pointer y on the canvas.
	pub y: f64,
}

/// Graph, layout, viewport and pointer state for one triple batch.
pub struct GraphView {
	/// Graph being shown.
	pub graph: GraphData,
	/// Live layout.
	pub simulation: Simulation,
	/// Pan and zoom.
	pub viewport: Viewport,
	/// Positions drawn this frame.
	pub snapshot: LayoutSnapshot,
	/// Last clicked node, cleared by a background click.
	pub selected: Option<NodeIdx>,
	pub(crate) drag: DragState,
	pub(crate) pan: PanState,
	pub(crate) hover: HoverState,
	pub(crate) pointer: Option<Point>,
	pub(crate) width: f64,
	pub(crate) height: f64,
	pub(crate) flow_time: f64,
	pub(crate) config: GraphConfig,
}

impl GraphView {
	/// Seeds a fresh layout for `graph` on a `width` x `height` surface.
	pub fn new(graph: GraphData, width: f64, height: f64, config: &GraphConfig) -> Self {
		let simulation = Simulation::new(&graph, width, height, &config.layout);
		let snapshot = simulation.snapshot();
		Self {
			graph,
			simulation,
			viewport: Viewport::new(width, height, &config.viewport),
			snapshot,
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			selected: None,
			pointer: None,
			width,
			height,
			flow_time: 0.0,
			config: config.clone(),
		}
	}

	/// Rendered radius of a node in graph units.
	pub fn display_radius(&self, idx: NodeIdx) -> f64 {
		let size = self.graph.nodes.get(idx).map_or(0.0, |n| n.size);
		if self.hover.node == Some(idx) {
			size * self.config.display.hover_scale
		} else {
			size
		}
	}

	/// Topmost node under a screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeIdx> {
		let transform = self.viewport.transform();
		let pointer = Point::new(sx, sy);
		(0..self.graph.nodes.len()).rev().find(|&idx| {
			self.snapshot.get(idx).is_some_and(|p| {
				transform.apply(p).distance(pointer) < self.display_radius(idx) * transform.k
			})
		})
	}

	/// Topmost edge whose screen segment passes within [`EDGE_HIT_TOLERANCE`].
	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let transform = self.viewport.transform();
		let pointer = Point::new(sx, sy);
		(0..self.graph.edges.len()).rev().find(|&i| {
			let edge = &self.graph.edges[i];
			let ends = self
				.graph
				.index_of(&edge.source)
				.zip(self.graph.index_of(&edge.target))
				.and_then(|(s, t)| Some((self.snapshot.get(s)?, self.snapshot.get(t)?)));
			ends.is_some_and(|(a, b)| {
				segment_distance(pointer, transform.apply(a), transform.apply(b))
					<= EDGE_HIT_TOLERANCE
			})
		})
	}

	/// Starts a node drag on a node, otherwise a pan.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		let at = Point::new(sx, sy);
		self.pointer = Some(at);
		if let Some(idx) = self.node_at_position(sx, sy) {
			self.drag = DragState {
				node: Some(idx),
				start: at,
				moved: false,
			};
			if let Some(p) = self.simulation.position(idx) {
				self.simulation.pin(idx, p.x, p.y);
			}
			let target = self.config.layout.drag_alpha_target;
			self.simulation.set_alpha_target(target);
			self.simulation.reheat(target);
			debug!("drag start on node {idx}");
		} else {
			self.pan = PanState {
				active: true,
				start: at,
				last: at,
				moved: false,
				pressed_edge: self.edge_at_position(sx, sy),
			};
		}
	}

	/// Drags, pans or updates hover.
	///
	/// A pressed node stays where it was until the pointer leaves the click
	/// slop, so a click never nudges it. From then on the node is pinned to
	/// the pointer on every move.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		let at = Point::new(sx, sy);
		self.pointer = Some(at);
		let slop = self.config.display.click_slop;

		if let Some(idx) = self.drag.node {
			self.drag.moved |= at.distance(self.drag.start) > slop;
			if self.drag.moved {
				let p = self.viewport.screen_to_graph(sx, sy);
				self.simulation.pin(idx, p.x, p.y);
				self.sync();
			}
		} else if self.pan.active {
			self.viewport.pan_by(sx - self.pan.last.x, sy - self.pan.last.y);
			self.pan.last = at;
			self.pan.moved |= at.distance(self.pan.start) > slop;
		} else {
			let hovered = self.node_at_position(sx, sy);
			self.set_hover(hovered);
		}
	}

	/// Ends a drag or pan and reports a click if the pointer stayed put.
	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Option<InteractionEvent> {
		self.pointer = Some(Point::new(sx, sy));
		if let Some(idx) = self.drag.node {
			let clicked = !self.drag.moved;
			self.release_drag();
			if clicked {
				self.selected = Some(idx);
				return Some(InteractionEvent::NodeClicked(idx));
			}
			return None;
		}
		if !self.pan.active {
			return None;
		}
		let pan = std::mem::take(&mut self.pan);
		if pan.moved {
			return None;
		}
		match pan.pressed_edge {
			Some(edge) if self.edge_at_position(sx, sy) == Some(edge) => {
				Some(InteractionEvent::EdgeClicked(edge))
			}
			_ => {
				self.selected = None;
				Some(InteractionEvent::BackgroundClicked)
			}
		}
	}

	/// Cancels any drag or pan and clears hover.
	pub fn pointer_leave(&mut self) {
		self.release_drag();
		self.pan = PanState::default();
		self.pointer = None;
		self.set_hover(None);
	}

	/// Zooms about the pointer.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		self.viewport.wheel_zoom(sx, sy, delta_y);
	}

	/// True while a node is held.
	pub fn is_dragging(&self) -> bool {
		self.drag.node.is_some()
	}

	/// Node under the pointer, if any.
	pub fn hovered(&self) -> Option<NodeIdx> {
		self.hover.node
	}

	fn release_drag(&mut self) {
		if let Some(idx) = self.drag.node.take() {
			self.simulation.unpin(idx);
			self.simulation.set_alpha_target(0.0);
			self.simulation.reheat(self.config.layout.reheat_alpha);
			debug!("drag end on node {idx}");
		}
		self.drag = DragState::default();
	}

	/// Moves hover to `node`. Leaving a node lets its highlight fade out.
	pub fn set_hover(&mut self, node: Option<NodeIdx>) {
		if self.hover.node != node {
			self.hover.enter(node);
		}
	}

	/// Whether `idx` is the focused node or one of its neighbors.
	pub fn is_highlighted(&self, idx: NodeIdx) -> bool {
		self.hover
			.focus()
			.is_some_and(|focus| focus == idx || self.graph.are_adjacent(focus, idx))
	}

	/// Whether `idx` is hovered or still fading from hover.
	pub fn is_hovered(&self, idx: NodeIdx) -> bool {
		self.hover.focus() == Some(idx)
	}

	/// Whether a highlight is shown or fading.
	pub fn has_active_highlight(&self) -> bool {
		self.hover.focus().is_some()
	}

	/// Content for the hovered node, positioned at the pointer.
	pub fn tooltip(&self) -> Option<TooltipContent> {
		let idx = self.hover.node?;
		let pointer = self.pointer?;
		let node = self.graph.nodes.get(idx)?;
		Some(TooltipContent {
			label: node.label.clone(),
			node_type: node.node_type,
			properties: node
				.properties
				.iter()
				.map(|(k, v)| (k.clone(), v.clone()))
				.collect(),
			x: pointer.x,
			y: pointer.y,
		})
	}

	/// One frame: a simulation step if still warm, viewport animation, and
	/// the hover fade.
	pub fn tick(&mut self, dt_ms: f64) {
		if self.simulation.is_running() {
			self.simulation.tick();
		}
		self.viewport.advance(dt_ms);
		self.sync();

		let dt = dt_ms / 1000.0;
		self.flow_time += dt;
		self.hover.advance(dt);
	}

	/// Resizes to `width` x `height` if that differs from the current
	/// surface. Returns whether anything changed.
	pub fn fit(&mut self, width: f64, height: f64) -> bool {
		if (width, height) == (self.width, self.height) {
			return false;
		}
		self.resize(width, height);
		true
	}

	/// Resizes the surface and re-centers the running layout.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.viewport.resize(width, height);
		self.simulation.set_center(width / 2.0, height / 2.0);
		self.simulation.reheat(self.config.layout.reheat_alpha);
	}

	/// Refreshes the snapshot if the simulation has moved on.
	pub fn sync(&mut self) {
		if self.simulation.snapshot().version != self.snapshot.version {
			self.snapshot = self.simulation.snapshot();
		}
	}
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len2 = dx * dx + dy * dy;
	if len2 == 0.0 {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
	p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

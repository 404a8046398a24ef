use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info, warn};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent, ResizeObserver, WheelEvent,
	Window,
};

use super::builder::build_graph;
use super::config::GraphConfig;
use super::ingest::ingest;
use super::render::{self, RenderOptions};
use super::state::{GraphView, InteractionEvent};
use super::tooltip::Tooltip;
use super::types::{Edge, GraphData, Node};
use crate::error::{GraphError, Result};

type EngineSlot = StoredValue<Option<GraphEngine>, LocalStorage>;

/// Explicit size, or `None` to follow the container.
#[derive(Clone, Copy, Debug)]
struct SurfaceSize {
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
}

impl SurfaceSize {
	fn measure(self, canvas: &HtmlCanvasElement) -> (f64, f64) {
		if self.fullscreen {
			if let Some(window) = web_sys::window() {
				let dim = |v: std::result::Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
				if let (Some(w), Some(h)) = (dim(window.inner_width()), dim(window.inner_height())) {
					return (w, h);
				}
			}
		}
		let parent = canvas.parent_element();
		(
			self.width.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_width() as f64)
					.filter(|&w| w > 0.0)
					.unwrap_or(800.0)
			}),
			self.height.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_height() as f64)
					.filter(|&h| h > 0.0)
					.unwrap_or(600.0)
			}),
		)
	}
}

/// Keeps `requestAnimationFrame` going until dropped.
struct AnimationLoop {
	frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
	handle: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
	fn start(window: &Window, mut on_frame: impl FnMut(f64) + 'static) -> Result<Self> {
		let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
		let handle = Rc::new(Cell::new(None));
		let (frame_inner, handle_inner) = (frame.clone(), handle.clone());

		*frame.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			on_frame(timestamp);
			let next = match (web_sys::window(), frame_inner.borrow().as_ref()) {
				(Some(window), Some(cb)) => window
					.request_animation_frame(cb.as_ref().unchecked_ref())
					.ok(),
				_ => None,
			};
			handle_inner.set(next);
		}));

		if let Some(ref cb) = *frame.borrow() {
			handle.set(Some(
				window.request_animation_frame(cb.as_ref().unchecked_ref())?,
			));
		}
		Ok(Self { frame, handle })
	}
}

impl Drop for AnimationLoop {
	fn drop(&mut self) {
		if let (Some(window), Some(id)) = (web_sys::window(), self.handle.take()) {
			let _ = window.cancel_animation_frame(id);
		}
		// Breaks the closure's reference to its own cell.
		self.frame.borrow_mut().take();
	}
}

/// A window event listener removed on drop.
struct WindowListener {
	window: Window,
	event: &'static str,
	callback: Closure<dyn FnMut()>,
}

impl WindowListener {
	fn add(window: &Window, event: &'static str, f: impl FnMut() + 'static) -> Result<Self> {
		let callback = Closure::<dyn FnMut()>::new(f);
		window.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
		Ok(Self {
			window: window.clone(),
			event,
			callback,
		})
	}
}

impl Drop for WindowListener {
	fn drop(&mut self) {
		let _ = self
			.window
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

/// Watches an element's box and disconnects on drop.
struct SizeObserver {
	observer: ResizeObserver,
	_callback: Closure<dyn FnMut()>,
}

impl SizeObserver {
	fn observe(target: &Element, f: impl FnMut() + 'static) -> Result<Self> {
		let callback = Closure::<dyn FnMut()>::new(f);
		let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
		observer.observe(target);
		Ok(Self {
			observer,
			_callback: callback,
		})
	}
}

impl Drop for SizeObserver {
	fn drop(&mut self) {
		self.observer.disconnect();
	}
}

/// Everything one mounted graph owns. Dropping it stops the frame loop,
/// detaches the resize listener and observer, and removes the tooltip.
struct GraphEngine {
	view: GraphView,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	tooltip: Tooltip,
	size: SurfaceSize,
	last_frame: Option<f64>,
	frames: Option<AnimationLoop>,
	_resize: WindowListener,
	_container: Option<SizeObserver>,
}

impl GraphEngine {
	fn mount(
		slot: EngineSlot,
		canvas: HtmlCanvasElement,
		graph: GraphData,
		config: &GraphConfig,
		size: SurfaceSize,
		options: impl Fn() -> RenderOptions + 'static,
	) -> Result<()> {
		let window = web_sys::window().ok_or(GraphError::NoWindow)?;
		let (w, h) = size.measure(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")?
			.ok_or(GraphError::ContextUnavailable)?
			.dyn_into()
			.map_err(|_| GraphError::ContextUnavailable)?;
		let tooltip = Tooltip::attach()?;
		let refit = move || {
			let _ = slot.try_update_value(|engine| {
				if let Some(engine) = engine.as_mut() {
					engine.fit_to_container();
				}
			});
		};
		let resize = WindowListener::add(&window, "resize", refit)?;
		// Panels and split panes change the container without a window resize.
		let container = canvas
			.parent_element()
			.map(|parent| SizeObserver::observe(&parent, refit))
			.transpose()?;

		info!(
			"mounting graph: {} nodes, {} edges on {w}x{h}",
			graph.nodes.len(),
			graph.edges.len()
		);
		slot.set_value(Some(GraphEngine {
			view: GraphView::new(graph, w, h, config),
			canvas,
			ctx,
			tooltip,
			size,
			last_frame: None,
			frames: None,
			_resize: resize,
			_container: container,
		}));

		let frames = AnimationLoop::start(&window, move |timestamp| {
			let options = options();
			let _ = slot.try_update_value(|engine| {
				if let Some(engine) = engine.as_mut() {
					engine.frame(timestamp, options);
				}
			});
		})?;
		slot.update_value(|engine| {
			if let Some(engine) = engine.as_mut() {
				engine.frames = Some(frames);
			}
		});
		Ok(())
	}

	fn frame(&mut self, timestamp: f64, options: RenderOptions) {
		let dt = self
			.last_frame
			.map_or(16.0, |last| (timestamp - last).clamp(0.0, 100.0));
		self.last_frame = Some(timestamp);
		self.view.tick(dt);
		render::render(&self.view, options, &self.ctx);

		let content = self
			.view
			.tooltip()
			.filter(|_| options.show_tooltips && !self.view.is_dragging());
		match content {
			Some(content) => {
				let rect = self.canvas.get_bounding_client_rect();
				if let Err(err) = self.tooltip.show(&content, (rect.left(), rect.top())) {
					warn!("tooltip update failed: {err}");
				}
			}
			None => self.tooltip.hide(),
		}
	}

	fn fit_to_container(&mut self) {
		let (w, h) = self.size.measure(&self.canvas);
		if self.view.fit(w, h) {
			self.canvas.set_width(w as u32);
			self.canvas.set_height(h as u32);
		}
	}
}

fn with_view(slot: EngineSlot, f: impl FnOnce(&mut GraphView)) {
	let _ = slot.try_update_value(|engine| {
		if let Some(engine) = engine.as_mut() {
			f(&mut engine.view);
		}
	});
}

/// Host-facing payload of an [`InteractionEvent`].
enum HostEvent {
	Select(Option<Node>),
	Edge(Edge),
}

impl HostEvent {
	fn resolve(graph: &GraphData, event: InteractionEvent) -> Option<Self> {
		match event {
			InteractionEvent::NodeClicked(idx) => {
				graph.nodes.get(idx).cloned().map(|n| HostEvent::Select(Some(n)))
			}
			InteractionEvent::BackgroundClicked => Some(HostEvent::Select(None)),
			InteractionEvent::EdgeClicked(idx) => graph.edges.get(idx).cloned().map(HostEvent::Edge),
		}
	}
}

/// Interactive node-link view of a triple batch.
///
/// `on_node_click` receives `None` when the background is clicked.
#[component]
pub fn TripleGraph(
	/// Raw triple records; a change rebuilds the graph and layout.
	#[prop(into)]
	triples: Signal<Vec<Value>>,
	/// Count shown in the corner badge.
	#[prop(optional)]
	triple_count: Option<usize>,
	/// Node clicked, or `None` for a background click.
	#[prop(optional, into)]
	on_node_click: Option<Callback<Option<Node>>>,
	/// Edge clicked.
	#[prop(optional, into)]
	on_edge_click: Option<Callback<Edge>>,
	/// Setup failure message.
	#[prop(optional, into)]
	on_error: Option<Callback<String>>,
	/// Draw node and edge labels.
	#[prop(into, default = true.into())]
	show_labels: Signal<bool>,
	/// Show the hover tooltip.
	#[prop(into, default = true.into())]
	show_tooltips: Signal<bool>,
	/// Layout, viewport and display tunables.
	#[prop(optional)]
	config: GraphConfig,
	/// Size to the window instead of the container.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed width in px; defaults to the container width.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed height in px; defaults to the container height.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine: EngineSlot = StoredValue::new_local(None);
	let (failure, set_failure) = signal(None::<String>);
	let (empty, set_empty) = signal(false);
	let size = SurfaceSize {
		fullscreen,
		width,
		height,
	};

	Effect::new(move |_| {
		let records = triples.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		// The previous loop must be gone before the next one starts.
		drop(engine.try_update_value(Option::take));

		let graph = build_graph(&ingest(&records));
		set_empty.set(graph.is_empty());
		let options = move || RenderOptions {
			show_labels: show_labels.get_untracked(),
			show_tooltips: show_tooltips.get_untracked(),
		};
		match GraphEngine::mount(engine, canvas, graph, &config, size, options) {
			Ok(()) => set_failure.set(None),
			Err(err) => {
				error!("graph initialization failed: {err}");
				set_failure.set(Some(err.to_string()));
				if let Some(on_error) = &on_error {
					on_error.run(err.to_string());
				}
			}
		}
	});

	on_cleanup(move || {
		drop(engine.try_update_value(Option::take));
	});

	let local = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas = canvas_ref.get_untracked()?;
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local(&ev) {
			with_view(engine, |view| view.pointer_down(x, y));
		}
	};

	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local(&ev) {
			with_view(engine, |view| view.pointer_move(x, y));
		}
	};

	// Host callbacks run after the engine borrow is released, so they may
	// freely update signals that rebuild the graph.
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local(&ev) else {
			return;
		};
		let event = engine
			.try_update_value(|engine| {
				let view = &mut engine.as_mut()?.view;
				let event = view.pointer_up(x, y)?;
				HostEvent::resolve(&view.graph, event)
			})
			.flatten();
		match event {
			Some(HostEvent::Select(node)) => {
				if let Some(cb) = &on_node_click {
					cb.run(node);
				}
			}
			Some(HostEvent::Edge(edge)) => {
				if let Some(cb) = &on_edge_click {
					cb.run(edge);
				}
			}
			None => {}
		}
	};

	let on_mouseleave = move |_: MouseEvent| {
		with_view(engine, |view| view.pointer_leave());
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		if let Some((x, y)) = local(mouse) {
			let delta = ev.delta_y();
			with_view(engine, |view| view.wheel(x, y, delta));
		}
	};

	view! {
		<div class="triple-graph" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="triple-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="triple-graph-controls">
				<button title="Zoom in" on:click=move |_| with_view(engine, |view| view.viewport.zoom_in())>
					"+"
				</button>
				<button title="Zoom out" on:click=move |_| with_view(engine, |view| view.viewport.zoom_out())>
					"-"
				</button>
				<button title="Reset view" on:click=move |_| with_view(engine, |view| view.viewport.reset())>
					"Reset"
				</button>
			</div>
			{triple_count.map(|n| view! { <div class="triple-graph-count">{format!("{n} triples")}</div> })}
			{move || empty.get().then(|| view! { <div class="triple-graph-empty">"No graph data"</div> })}
			{move || failure.get().map(|msg| view! { <div class="triple-graph-error">{msg}</div> })}
		</div>
	}
}

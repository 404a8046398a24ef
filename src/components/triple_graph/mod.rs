//! Triple-backed force-directed graph view.
//!
//! Data flows `ingest` -> `builder` -> `simulation`, with `viewport` and
//! `state` handling interaction and `render` drawing each frame.

/// Triples to nodes and edges.
pub mod builder;
mod component;
/// Tunables with defaults.
pub mod config;
/// Raw JSON records to triples.
pub mod ingest;
/// Canvas drawing.
pub mod render;
/// Force-directed layout.
pub mod simulation;
/// Pointer interaction over a laid-out graph.
pub mod state;
mod tooltip;
/// Graph data model.
pub mod types;
/// Pan and zoom.
pub mod viewport;

pub use builder::{build_graph, derive_label, infer_node_type};
pub use component::TripleGraph;
pub use config::GraphConfig;
pub use ingest::{ingest, ingest_json};
pub use render::RenderOptions;
pub use simulation::{LayoutSnapshot, Point, Simulation};
pub use state::{GraphView, InteractionEvent, TooltipContent};
pub use types::{Edge, GraphData, Node, NodeIdx, NodeType, Object, Triple};
pub use viewport::{Transform, Viewport};

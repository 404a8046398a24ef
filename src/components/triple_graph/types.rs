use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Index of a node inside [`GraphData::nodes`].
pub type NodeIdx = usize;

/// Object position of a triple, classified at ingest time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Object {
	/// An addressable identifier (`http://`, `https://`, `urn:`); becomes a node.
	Entity(String),
	/// A plain value; becomes a property on the subject node.
	Literal(String),
}

/// Canonical subject–predicate–object statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Triple {
	/// Identifier of the described resource.
	pub subject: String,
	/// Relation identifier.
	pub predicate: String,
	/// Related entity or literal value.
	pub object: Object,
}

/// Coarse node category inferred from the identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[allow(missing_docs)]
pub enum NodeType {
	Person,
	Company,
	Product,
	Document,
	#[default]
	Unknown,
}

impl NodeType {
	/// Display name, also shown in tooltips.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeType::Person => "Person",
			NodeType::Company => "Company",
			NodeType::Product => "Product",
			NodeType::Document => "Document",
			NodeType::Unknown => "Unknown",
		}
	}
}

impl std::fmt::Display for NodeType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One distinct subject or entity object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
	/// Full identifier as it appeared in the triples.
	pub id: String,
	/// Short human-readable form of `id`.
	pub label: String,
	/// Category inferred from `id`.
	pub node_type: NodeType,
	/// Radius in graph units. Hover enlarges only the rendered circle.
	pub size: f64,
	/// Literal predicate label -> value.
	pub properties: BTreeMap<String, String>,
}

/// Directed relation between two entity nodes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Edge {
	/// Subject node id.
	pub source: String,
	/// Object node id.
	pub target: String,
	/// Short form of the predicate.
	pub label: String,
	/// Link weight; always 1.
	pub value: f64,
}

/// Nodes and edges derived from one triple batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	/// Nodes in first-seen order.
	pub nodes: Vec<Node>,
	/// Edges in input order; duplicates are kept.
	pub edges: Vec<Edge>,
	pub(crate) index: HashMap<String, NodeIdx>,
	/// Sorted, deduplicated neighbor lists, one per node. Self-loops excluded.
	pub(crate) adjacency: Vec<Vec<NodeIdx>>,
}

impl GraphData {
	/// True when no triple produced a node.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Position of the node with identifier `id`.
	pub fn index_of(&self, id: &str) -> Option<NodeIdx> {
		self.index.get(id).copied()
	}

	/// Node with identifier `id`.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index_of(id).map(|idx| &self.nodes[idx])
	}

	/// Edges resolved to node index pairs, in edge order.
	pub fn links(&self) -> Vec<(NodeIdx, NodeIdx)> {
		self.edges
			.iter()
			.filter_map(|e| Some((self.index_of(&e.source)?, self.index_of(&e.target)?)))
			.collect()
	}

	/// Nodes sharing an edge with `idx`, in either direction, ascending.
	pub fn neighbors(&self, idx: NodeIdx) -> &[NodeIdx] {
		self.adjacency.get(idx).map_or(&[], Vec::as_slice)
	}

	/// Whether an edge joins `a` and `b` in either direction.
	pub fn are_adjacent(&self, a: NodeIdx, b: NodeIdx) -> bool {
		self.neighbors(a).binary_search(&b).is_ok()
	}
}

use std::collections::BTreeMap;

use log::debug;

use super::types::{Edge, GraphData, Node, NodeIdx, NodeType, Object, Triple};

/// Radius given to every node.
pub const DEFAULT_NODE_SIZE: f64 = 10.0;

/// Ordered keyword rules for [`infer_node_type`]. First match wins.
const TYPE_RULES: &[(&str, NodeType)] = &[
	("person", NodeType::Person),
	("company", NodeType::Company),
	("firma", NodeType::Company),
	("product", NodeType::Product),
	("produkt", NodeType::Product),
	("document", NodeType::Document),
];

/// Builds the node set and edge list for one triple batch.
pub fn build_graph(triples: &[Triple]) -> GraphData {
	let mut graph = GraphData::default();

	for triple in triples {
		let subject = ensure_node(&mut graph, &triple.subject);
		let predicate = derive_label(&triple.predicate);
		match &triple.object {
			Object::Entity(object) => {
				let target = ensure_node(&mut graph, object);
				if target != subject {
					graph.adjacency[subject].push(target);
					graph.adjacency[target].push(subject);
				}
				graph.edges.push(Edge {
					source: triple.subject.clone(),
					target: object.clone(),
					label: predicate,
					value: 1.0,
				});
			}
			Object::Literal(value) => {
				graph.nodes[subject].properties.insert(predicate, value.clone());
			}
		}
	}

	for neighbors in &mut graph.adjacency {
		neighbors.sort_unstable();
		neighbors.dedup();
	}

	debug!(
		"built graph: {} nodes, {} edges from {} triples",
		graph.nodes.len(),
		graph.edges.len(),
		triples.len()
	);
	graph
}

fn ensure_node(graph: &mut GraphData, id: &str) -> NodeIdx {
	if let Some(idx) = graph.index_of(id) {
		return idx;
	}
	let idx = graph.nodes.len();
	graph.nodes.push(Node {
		id: id.to_owned(),
		label: derive_label(id),
		node_type: infer_node_type(id),
		size: DEFAULT_NODE_SIZE,
		properties: BTreeMap::new(),
	});
	graph.index.insert(id.to_owned(), idx);
	graph.adjacency.push(Vec::new());
	idx
}

/// Human-readable label: last non-empty `/` or `#` segment, percent-decoded.
/// Falls back to `id` when there is no segment or decoding fails.
pub fn derive_label(id: &str) -> String {
	id.rsplit(['/', '#'])
		.find(|segment| !segment.is_empty())
		.and_then(percent_decode)
		.unwrap_or_else(|| id.to_owned())
}

/// Category from the first keyword rule the lowercased id contains.
pub fn infer_node_type(id: &str) -> NodeType {
	let id = id.to_lowercase();
	TYPE_RULES
		.iter()
		.find(|(keyword, _)| id.contains(keyword))
		.map(|&(_, node_type)| node_type)
		.unwrap_or_default()
}

fn percent_decode(segment: &str) -> Option<String> {
	let bytes = segment.as_bytes();
	let mut out = Vec::with_capacity(bytes.len());
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%' {
			let hex = bytes
				.get(i + 1..i + 3)
				.filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))?;
			let hex = std::str::from_utf8(hex).ok()?;
			out.push(u8::from_str_radix(hex, 16).ok()?);
			i += 3;
		} else {
			out.push(bytes[i]);
			i += 1;
		}
	}
	String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entity(s: &str, p: &str, o: &str) -> Triple {
		Triple {
			subject: s.into(),
			predicate: p.into(),
			object: Object::Entity(o.into()),
		}
	}

	fn literal(s: &str, p: &str, o: &str) -> Triple {
		Triple {
			subject: s.into(),
			predicate: p.into(),
			object: Object::Literal(o.into()),
		}
	}

	#[test]
	fn entity_triples_make_one_edge_each() {
		let graph = build_graph(&[
			entity("http://ex.org/a", "http://ex.org/knows", "http://ex.org/b"),
			entity("http://ex.org/b", "http://ex.org/knows", "http://ex.org/c"),
			entity("http://ex.org/a", "http://ex.org/likes", "http://ex.org/c"),
		]);
		assert_eq!(graph.nodes.len(), 3);
		assert_eq!(graph.edges.len(), 3);
		for edge in &graph.edges {
			assert!(graph.node(&edge.source).is_some());
			assert!(graph.node(&edge.target).is_some());
		}
		assert_eq!(graph.links(), vec![(0, 1), (1, 2), (0, 2)]);
	}

	#[test]
	fn literals_become_properties_last_write_wins() {
		let graph = build_graph(&[
			literal("http://ex.org/a", "http://ex.org/name", "First"),
			literal("http://ex.org/a", "http://ex.org/name", "Second"),
			literal("http://ex.org/a", "http://ex.org/vocab#age", "30"),
		]);
		assert_eq!(graph.nodes.len(), 1);
		assert!(graph.edges.is_empty());
		let a = graph.node("http://ex.org/a").expect("subject node");
		assert_eq!(a.properties["name"], "Second");
		assert_eq!(a.properties["age"], "30");
	}

	#[test]
	fn nodes_are_deduplicated_by_id() {
		let graph = build_graph(&[
			entity("urn:a", "urn:p", "urn:b"),
			entity("urn:b", "urn:p", "urn:a"),
			literal("urn:b", "urn:q", "v"),
		]);
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.node("urn:b").map(|n| n.properties.len()), Some(1));
	}

	#[test]
	fn duplicate_triples_keep_parallel_edges() {
		let t = entity("urn:a", "urn:p", "urn:b");
		let graph = build_graph(&[t.clone(), t]);
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.edges.len(), 2);
		assert_eq!(graph.edges[0], graph.edges[1]);
	}

	#[test]
	fn neighbors_are_cached_in_both_directions() {
		let graph = build_graph(&[
			entity("urn:a", "urn:p", "urn:b"),
			entity("urn:a", "urn:p", "urn:b"),
			entity("urn:c", "urn:p", "urn:a"),
			entity("urn:c", "urn:p", "urn:c"),
		]);
		assert_eq!(graph.neighbors(0), [1, 2]);
		assert_eq!(graph.neighbors(1), [0]);
		assert_eq!(graph.neighbors(2), [0]);
		assert!(graph.are_adjacent(1, 0));
		assert!(!graph.are_adjacent(1, 2));
		assert!(!graph.are_adjacent(2, 2));
		assert!(graph.neighbors(9).is_empty());
	}

	#[test]
	fn building_twice_is_identical() {
		let triples = vec![
			entity("urn:a", "urn:p", "urn:b"),
			literal("urn:a", "urn:q", "x"),
			entity("urn:c", "urn:p", "urn:a"),
		];
		assert_eq!(build_graph(&triples), build_graph(&triples));
	}

	#[test]
	fn empty_input_is_empty_graph() {
		let graph = build_graph(&[]);
		assert!(graph.is_empty());
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn label_derivation() {
		assert_eq!(derive_label("http://ex.org/people/alice"), "alice");
		assert_eq!(derive_label("http://ex.org/vocab#knows"), "knows");
		assert_eq!(derive_label("http://ex.org/people/"), "people");
		assert_eq!(derive_label("http://ex.org/M%C3%BCller"), "Müller");
		assert_eq!(derive_label("urn:isbn:123"), "urn:isbn:123");
		assert_eq!(derive_label("http://ex.org/bad%zz"), "http://ex.org/bad%zz");
		assert_eq!(derive_label("http://ex.org/trunc%4"), "http://ex.org/trunc%4");
		assert_eq!(derive_label("http://ex.org/%FF"), "http://ex.org/%FF");
		assert_eq!(derive_label("///"), "///");
	}

	#[test]
	fn type_inference_is_ordered_and_case_insensitive() {
		assert_eq!(infer_node_type("http://ex.org/Person/1"), NodeType::Person);
		assert_eq!(infer_node_type("urn:PERSON-document"), NodeType::Person);
		assert_eq!(infer_node_type("http://ex.org/firma/acme"), NodeType::Company);
		assert_eq!(infer_node_type("http://ex.org/company/document"), NodeType::Company);
		assert_eq!(infer_node_type("http://ex.org/Produkt/9"), NodeType::Product);
		assert_eq!(infer_node_type("http://ex.org/docs/documentA"), NodeType::Document);
		assert_eq!(infer_node_type("http://ex.org/alice"), NodeType::Unknown);
	}
}

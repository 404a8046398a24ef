use serde_json::json;
use triple_graph_canvas::triple_graph::{
	GraphConfig, GraphView, InteractionEvent, NodeType, build_graph, ingest, ingest_json,
};

#[test]
fn alice_knows_bob() {
	let triples = ingest(&[
		json!({"s": "http://ex.org/alice", "p": "http://ex.org/knows", "o": "http://ex.org/bob"}),
		json!({"s": "http://ex.org/alice", "p": "http://ex.org/email", "o": "alice@ex.org"}),
	]);
	let graph = build_graph(&triples);

	let labels: Vec<&str> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
	assert_eq!(labels, ["alice", "bob"]);
	assert_eq!(graph.edges.len(), 1);
	let edge = &graph.edges[0];
	assert_eq!(edge.source, "http://ex.org/alice");
	assert_eq!(edge.target, "http://ex.org/bob");
	assert_eq!(edge.label, "knows");
	assert_eq!(edge.value, 1.0);
	assert_eq!(
		graph.node("http://ex.org/alice").map(|n| n.properties["email"].as_str()),
		Some("alice@ex.org")
	);
}

#[test]
fn malformed_records_do_not_abort_the_batch() {
	let triples = ingest_json(
		r#"[
			{"subject": "https://ex.org/person/1", "predicate": "https://ex.org/name", "object": "Ada"},
			{"subject": "https://ex.org/person/1"},
			null,
			{"s": "https://ex.org/person/1", "p": "https://ex.org/employer", "o": "urn:firma:42"}
		]"#,
	)
	.expect("array input");
	let graph = build_graph(&triples);
	assert_eq!(graph.nodes.len(), 2);
	assert_eq!(graph.nodes[0].node_type, NodeType::Person);
	assert_eq!(graph.nodes[1].node_type, NodeType::Company);
	assert_eq!(graph.nodes[0].properties["name"], "Ada");
}

#[test]
fn empty_batch_is_a_quiet_empty_view() {
	let mut view = GraphView::new(build_graph(&ingest(&[])), 640.0, 480.0, &GraphConfig::default());
	assert!(view.graph.is_empty());
	assert!(!view.simulation.is_running());
	view.tick(16.0);
	view.pointer_down(10.0, 10.0);
	assert_eq!(view.pointer_up(10.0, 10.0), Some(InteractionEvent::BackgroundClicked));
	assert!(view.tooltip().is_none());
}

#[test]
fn live_layout_stays_interactive_until_it_settles() {
	let records: Vec<_> = (0..8)
		.map(|i| json!({"s": "urn:hub", "p": "urn:rel", "o": format!("urn:leaf:{i}")}))
		.collect();
	let mut view = GraphView::new(
		build_graph(&ingest(&records)),
		800.0,
		600.0,
		&GraphConfig::default(),
	);

	for _ in 0..30 {
		view.tick(16.0);
	}
	let hub = view.snapshot.get(0).expect("hub position");
	let screen = view.viewport.graph_to_screen(hub);
	view.pointer_move(screen.x, screen.y);
	assert_eq!(view.hovered(), Some(0));
	let tip = view.tooltip().expect("tooltip for hub");
	assert_eq!(tip.label, "urn:hub");

	view.pointer_down(screen.x, screen.y);
	assert_eq!(view.pointer_up(screen.x, screen.y), Some(InteractionEvent::NodeClicked(0)));

	let mut frames = 0;
	while view.simulation.is_running() && frames < 2000 {
		view.tick(16.0);
		frames += 1;
	}
	assert!(!view.simulation.is_running());
	assert!(view.simulation.total_overlap() < 1.0);
	let settled = view.snapshot.clone();
	view.tick(16.0);
	assert_eq!(view.snapshot, settled);
}

#[test]
fn rebuilding_resets_positions() {
	let records = [json!({"s": "urn:a", "p": "urn:p", "o": "urn:b"})];
	let config = GraphConfig::default();
	let mut first = GraphView::new(build_graph(&ingest(&records)), 800.0, 600.0, &config);
	let seeded = first.snapshot.clone();
	for _ in 0..50 {
		first.tick(16.0);
	}
	assert_ne!(first.snapshot.points, seeded.points);

	let second = GraphView::new(build_graph(&ingest(&records)), 800.0, 600.0, &config);
	assert_eq!(second.snapshot, seeded);
}

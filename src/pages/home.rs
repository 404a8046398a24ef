use leptos::prelude::*;
use log::info;
use serde_json::{Value, json};

use crate::components::triple_graph::{Node, TripleGraph};

const EX: &str = "http://example.org/";

/// Sample knowledge graph in the mixed record shapes the view accepts.
fn sample_triples() -> Vec<Value> {
	let iri = |path: &str| format!("{EX}{path}");
	let mut records = vec![
		json!({"s": iri("person/alice"), "p": iri("vocab#worksFor"), "o": iri("company/acme")}),
		json!({"s": iri("person/bob"), "p": iri("vocab#worksFor"), "o": iri("company/acme")}),
		json!({"s": iri("person/alice"), "p": iri("vocab#knows"), "o": iri("person/bob")}),
		json!({"s": iri("company/acme"), "p": iri("vocab#makes"), "o": iri("product/rocket-skates")}),
		json!({"s": iri("company/acme"), "p": iri("vocab#makes"), "o": iri("product/anvil")}),
		json!({"s": iri("document/manual"), "p": iri("vocab#describes"), "o": iri("product/anvil")}),
		json!({"s": iri("person/carol"), "p": iri("vocab#authored"), "o": iri("document/manual")}),
		json!({"s": iri("firma/muster-gmbh"), "p": iri("vocab#supplies"), "o": iri("company/acme")}),
		json!({"s": iri("person/alice"), "p": iri("vocab#email"), "o": "alice@example.org"}),
		json!({"s": iri("person/bob"), "p": iri("vocab#age"), "o": 42}),
		json!({
			"subject": {"termType": "NamedNode", "value": iri("product/anvil")},
			"predicate": {"termType": "NamedNode", "value": iri("vocab#weight")},
			"object": {"termType": "Literal", "value": "50kg"},
		}),
		json!({"s": "urn:isbn:0451450523", "p": iri("vocab#about"), "o": iri("product/rocket-skates")}),
		// Dropped: no object.
		json!({"s": iri("person/dave"), "p": iri("vocab#knows")}),
	];
	for i in 0..12 {
		records.push(json!({
			"s": iri(&format!("person/member-{i}")),
			"p": iri("vocab#memberOf"),
			"o": iri(if i % 2 == 0 { "company/acme" } else { "firma/muster-gmbh" }),
		}));
	}
	records
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let triples = Signal::derive(sample_triples);
	let count = sample_triples().len();
	let (show_labels, set_show_labels) = signal(true);
	let (show_tooltips, set_show_tooltips) = signal(true);
	let (selected, set_selected) = signal(None::<Node>);

	let on_node_click = move |node: Option<Node>| {
		if let Some(node) = &node {
			info!("selected {}", node.id);
		}
		set_selected.set(node);
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<TripleGraph
					triples=triples
					triple_count=count
					on_node_click=on_node_click
					show_labels=show_labels
					show_tooltips=show_tooltips
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Knowledge Graph"</h1>
					<p class="subtitle">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
					<label>
						<input
							type="checkbox"
							prop:checked=show_labels
							on:change=move |_| set_show_labels.update(|v| *v = !*v)
						/>
						" Labels"
					</label>
					<label>
						<input
							type="checkbox"
							prop:checked=show_tooltips
							on:change=move |_| set_show_tooltips.update(|v| *v = !*v)
						/>
						" Tooltips"
					</label>
					{move || {
						selected
							.get()
							.map(|node| {
								view! {
									<p class="selection">
										{format!("{} ({})", node.label, node.node_type)}
									</p>
								}
							})
					}}
				</div>
			</div>
		</ErrorBoundary>
	}
}

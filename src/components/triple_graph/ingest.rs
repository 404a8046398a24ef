//! Normalizes raw triple records into canonical [`Triple`]s.
//!
//! Accepted record shapes:
//! - `{ "subject": .., "predicate": .., "object": .. }`
//! - `{ "s": .., "p": .., "o": .. }`
//!
//! Each term is either a bare value or an RDF/JS-style term object carrying
//! its value under `"value"`. Records that cannot be resolved are skipped.

use log::debug;
use serde_json::Value;

use super::types::{Object, Triple};
use crate::error::{GraphError, Result};

const ENTITY_PREFIXES: &[&str] = &["http://", "https://", "urn:"];

/// Canonicalizes each record, skipping the ones that do not resolve.
pub fn ingest(records: &[Value]) -> Vec<Triple> {
	let triples: Vec<Triple> = records
		.iter()
		.enumerate()
		.filter_map(|(i, record)| {
			let triple = canonicalize(record);
			if triple.is_none() {
				debug!("skipping unresolvable triple record #{i}");
			}
			triple
		})
		.collect();
	debug!("ingested {} of {} triple records", triples.len(), records.len());
	triples
}

/// Parses a JSON array of triple records and ingests it.
pub fn ingest_json(text: &str) -> Result<Vec<Triple>> {
	match serde_json::from_str::<Value>(text)? {
		Value::Array(records) => Ok(ingest(&records)),
		other => Err(GraphError::NotAnArray(kind_of(&other))),
	}
}

/// Whether an object value names an entity rather than a literal.
pub fn is_entity(value: &str) -> bool {
	ENTITY_PREFIXES.iter().any(|prefix| value.starts_with(prefix))
}

fn canonicalize(record: &Value) -> Option<Triple> {
	let subject = non_empty_string(field(record, "subject", "s")?)?;
	let predicate = non_empty_string(field(record, "predicate", "p")?)?;
	let object = match field(record, "object", "o")? {
		Value::String(s) if is_entity(s) => Object::Entity(s.clone()),
		Value::String(s) => Object::Literal(s.clone()),
		Value::Number(n) => Object::Literal(n.to_string()),
		Value::Bool(b) => Object::Literal(b.to_string()),
		_ => return None,
	};
	Some(Triple {
		subject,
		predicate,
		object,
	})
}

/// Looks up `long` then `short`, unwrapping a `{ "value": .. }` term object.
fn field<'a>(record: &'a Value, long: &str, short: &str) -> Option<&'a Value> {
	let raw = record.get(long).or_else(|| record.get(short))?;
	let term = match raw {
		Value::Object(map) => map.get("value")?,
		other => other,
	};
	(!term.is_null()).then_some(term)
}

fn non_empty_string(value: &Value) -> Option<String> {
	value.as_str().filter(|s| !s.is_empty()).map(str::to_owned)
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn long_and_short_keys_resolve() {
		let triples = ingest(&[
			json!({"subject": "http://ex.org/a", "predicate": "http://ex.org/p", "object": "http://ex.org/b"}),
			json!({"s": "http://ex.org/a", "p": "http://ex.org/name", "o": "Alice"}),
		]);
		assert_eq!(triples.len(), 2);
		assert_eq!(triples[0].object, Object::Entity("http://ex.org/b".into()));
		assert_eq!(triples[1].object, Object::Literal("Alice".into()));
	}

	#[test]
	fn term_objects_are_unwrapped() {
		let triples = ingest(&[json!({
			"subject": {"termType": "NamedNode", "value": "urn:isbn:123"},
			"predicate": {"value": "http://purl.org/dc/terms/title"},
			"object": {"termType": "Literal", "value": "Dune"},
		})]);
		assert_eq!(
			triples,
			vec![Triple {
				subject: "urn:isbn:123".into(),
				predicate: "http://purl.org/dc/terms/title".into(),
				object: Object::Literal("Dune".into()),
			}]
		);
	}

	#[test]
	fn incomplete_records_are_skipped() {
		let triples = ingest(&[
			json!({"subject": "http://ex.org/a", "predicate": "http://ex.org/p"}),
			json!({"s": "http://ex.org/a", "o": "x"}),
			json!({"subject": null, "predicate": "http://ex.org/p", "object": "x"}),
			json!({"subject": {"termType": "BlankNode"}, "predicate": "p", "object": "x"}),
			json!({"subject": "", "predicate": "p", "object": "x"}),
			json!("not a record"),
			json!({"s": "http://ex.org/a", "p": "http://ex.org/ok", "o": "kept"}),
		]);
		assert_eq!(triples.len(), 1);
		assert_eq!(triples[0].predicate, "http://ex.org/ok");
	}

	#[test]
	fn non_string_objects_are_literals() {
		let triples = ingest(&[
			json!({"s": "urn:a", "p": "urn:age", "o": 42}),
			json!({"s": "urn:a", "p": "urn:active", "o": true}),
			json!({"s": "urn:a", "p": "urn:tags", "o": ["x"]}),
		]);
		assert_eq!(triples.len(), 2);
		assert_eq!(triples[0].object, Object::Literal("42".into()));
		assert_eq!(triples[1].object, Object::Literal("true".into()));
	}

	#[test]
	fn entity_classification_uses_prefixes() {
		assert!(is_entity("http://ex.org/a"));
		assert!(is_entity("https://ex.org/a"));
		assert!(is_entity("urn:uuid:1"));
		assert!(!is_entity("mailto:a@ex.org"));
		assert!(!is_entity("HTTP://EX.ORG"));
		assert!(!is_entity("alice@ex.org"));
	}

	#[test]
	fn ingest_json_rejects_non_arrays() {
		assert!(matches!(ingest_json("{}"), Err(GraphError::NotAnArray("an object"))));
		assert!(matches!(ingest_json("[1,"), Err(GraphError::Json(_))));
		let triples = ingest_json(r#"[{"s":"urn:a","p":"urn:p","o":"urn:b"}, 3]"#)
			.expect("valid array");
		assert_eq!(triples.len(), 1);
	}
}

//! Ordering reconstruction for emitted patches.
//!
//! A freshly computed patch lists merge-keyed elements in whatever order the
//! diff produced them, while the ordering directive emitted alongside records
//! the sequence the original instance used. Normalization rebuilds each
//! annotated list to match its directive and drops the directive from the
//! output: it is a build-time instruction, not part of the emitted patch.

use std::collections::BTreeMap;

use crate::diff::SET_ELEMENT_ORDER_PREFIX;
use crate::value::{Map, Value};

/// Rewrites `patch` so every list annotated with an ordering directive lists
/// its elements in the recorded sequence.
///
/// A directive applies only to the sibling field it names; recursion into
/// nested objects and list elements starts a fresh scope. Elements not named
/// by the directive are appended afterward in their emitted order.
pub fn reorder_patch(patch: &Map) -> Map {
    let mut orderings: BTreeMap<&str, Vec<&Map>> = BTreeMap::new();
    for (key, value) in patch.iter() {
        let Some(target) = key.strip_prefix(SET_ELEMENT_ORDER_PREFIX) else {
            continue;
        };
        if let Value::List(entries) = value {
            orderings.insert(target, entries.iter().filter_map(Value::as_map).collect());
        }
    }

    let mut result = Map::new();
    for (key, value) in patch.iter() {
        if key.starts_with(SET_ELEMENT_ORDER_PREFIX) {
            continue;
        }
        let rebuilt = match value {
            Value::Map(nested) => Value::Map(reorder_patch(nested)),
            Value::List(elements) => match orderings.get(key.as_str()) {
                Some(sequence) => Value::List(reorder_elements(elements, sequence)),
                None => Value::List(elements.iter().map(reorder_element).collect()),
            },
            other => other.clone(),
        };
        result.set(key.clone(), rebuilt);
    }
    result
}

fn reorder_elements(elements: &[Value], sequence: &[&Map]) -> Vec<Value> {
    let mut consumed = vec![false; elements.len()];
    let mut result = Vec::with_capacity(elements.len());
    for wanted in sequence {
        let matched = elements.iter().enumerate().find(|(i, element)| {
            !consumed[*i]
                && element
                    .as_map()
                    .is_some_and(|map| key_values_match(wanted, map))
        });
        if let Some((i, element)) = matched {
            consumed[i] = true;
            result.push(reorder_element(element));
        }
    }
    for (i, element) in elements.iter().enumerate() {
        if !consumed[i] {
            result.push(reorder_element(element));
        }
    }
    result
}

fn reorder_element(element: &Value) -> Value {
    match element {
        Value::Map(nested) => Value::Map(reorder_patch(nested)),
        other => other.clone(),
    }
}

/// Returns true if every field of `query` is present in `target` with a
/// deeply equal value.
fn key_values_match(query: &Map, target: &Map) -> bool {
    query
        .iter()
        .all(|(key, value)| target.get(key) == Some(value))
}

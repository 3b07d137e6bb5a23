//! Two-way strategic patch computation and base subtraction.
//!
//! Both walks are schema-directed: at every object level the enclosing
//! field's merge metadata decides whether a list is replaced wholesale or
//! reconciled element by element under its merge key. Fields the schema does
//! not describe recurse for objects and replace for lists.

use log::warn;

use crate::error::{Error, Result};
use crate::schema::SchemaContext;
use crate::value::{Map, Value};

/// Directive key marking a merge-list element for deletion.
pub const PATCH_DIRECTIVE_KEY: &str = "$patch";

/// Directive value requesting element deletion.
pub const DELETE_DIRECTIVE: &str = "delete";

/// Prefix of the pseudo-field recording the intended order of merge-list
/// elements; the remainder of the key names the annotated sibling field.
pub const SET_ELEMENT_ORDER_PREFIX: &str = "$setElementOrder/";

/// Computes the minimal strategic patch that turns `from` into `to`.
///
/// Fields present only in `from` are omitted: the patch format has no way to
/// express top-level field deletion. Merge-keyed lists are reconciled per
/// element, with additions copied whole, removals marked by a
/// `$patch: delete` entry, and an ordering directive recording the element
/// sequence of `to`.
pub fn two_way_patch(from: &Map, to: &Map, ctx: SchemaContext<'_>) -> Result<Map> {
    let mut patch = Map::new();
    for (key, to_value) in to.iter() {
        let Some(from_value) = from.get(key) else {
            patch.set(key.clone(), to_value.clone());
            continue;
        };
        let (field_ctx, metadata) = ctx.field(key);
        match (from_value, to_value) {
            (Value::Map(from_map), Value::Map(to_map)) => {
                let nested = two_way_patch(from_map, to_map, field_ctx)?;
                if !nested.is_empty() {
                    patch.set(key.clone(), Value::Map(nested));
                }
            }
            (Value::List(from_list), Value::List(to_list)) => {
                let merge_key = metadata.merge_key().filter(|_| metadata.is_merge_list());
                match merge_key {
                    Some(merge_key) => {
                        let (elements, order) = diff_keyed_list(
                            key,
                            from_list,
                            to_list,
                            merge_key,
                            field_ctx.elements(),
                        )?;
                        if !elements.is_empty() {
                            let directive = format!("{}{}", SET_ELEMENT_ORDER_PREFIX, key);
                            patch.set(directive, Value::List(order));
                            patch.set(key.clone(), Value::List(elements));
                        }
                    }
                    None => {
                        if from_list != to_list {
                            patch.set(key.clone(), to_value.clone());
                        }
                    }
                }
            }
            (from_value, to_value) if !is_container(from_value) && !is_container(to_value) => {
                if from_value != to_value {
                    patch.set(key.clone(), to_value.clone());
                }
            }
            (from_value, to_value) => {
                warn!(
                    "unexpected type mismatch at '{}' ({} vs {}), taking the newer value",
                    key,
                    from_value.kind_name(),
                    to_value.kind_name()
                );
                patch.set(key.clone(), to_value.clone());
            }
        }
    }
    Ok(patch)
}

/// Removes from `a` everything explainable as a patch from `b` into `a`.
///
/// A field equal in both operands is dropped unless it is the enclosing list
/// element's merge key, which survives unconditionally so later folds can
/// still correlate elements. Elements of merge-keyed lists that `b` does not
/// mention are kept whole.
pub fn subtract(a: &Map, b: &Map, ctx: SchemaContext<'_>) -> Result<Map> {
    subtract_object(a, b, ctx, None)
}

fn subtract_object(
    a: &Map,
    b: &Map,
    ctx: SchemaContext<'_>,
    element_merge_key: Option<&str>,
) -> Result<Map> {
    let mut result = Map::new();
    for (key, a_value) in a.iter() {
        if element_merge_key == Some(key.as_str()) {
            result.set(key.clone(), a_value.clone());
            continue;
        }
        let Some(b_value) = b.get(key) else {
            result.set(key.clone(), a_value.clone());
            continue;
        };
        let (field_ctx, metadata) = ctx.field(key);
        match (a_value, b_value) {
            (Value::Map(a_map), Value::Map(b_map)) => {
                let nested = subtract_object(a_map, b_map, field_ctx, None)?;
                if !nested.is_empty() {
                    result.set(key.clone(), Value::Map(nested));
                }
            }
            (Value::List(a_list), Value::List(b_list)) => {
                if metadata.is_merge_list() {
                    let remaining = match metadata.merge_key() {
                        Some(merge_key) => subtract_keyed_list(
                            key,
                            a_list,
                            b_list,
                            merge_key,
                            field_ctx.elements(),
                        )?,
                        None => subtract_unkeyed_list(a_list, b_list),
                    };
                    if !remaining.is_empty() {
                        result.set(key.clone(), Value::List(remaining));
                    }
                } else if a_list != b_list {
                    result.set(key.clone(), a_value.clone());
                }
            }
            (a_value, b_value) if !is_container(a_value) && !is_container(b_value) => {
                if a_value != b_value {
                    result.set(key.clone(), a_value.clone());
                }
            }
            (a_value, b_value) => {
                warn!(
                    "unexpected type mismatch at '{}' ({} vs {}), keeping the value",
                    key,
                    a_value.kind_name(),
                    b_value.kind_name()
                );
                result.set(key.clone(), a_value.clone());
            }
        }
    }
    Ok(result)
}

/// Reconciles two merge-keyed lists into per-element diffs plus the ordering
/// directive entries for the `to` sequence.
fn diff_keyed_list(
    field: &str,
    from: &[Value],
    to: &[Value],
    merge_key: &str,
    element_ctx: SchemaContext<'_>,
) -> Result<(Vec<Value>, Vec<Value>)> {
    let from_elements = index_by_merge_key(field, from, merge_key)?;
    let to_elements = index_by_merge_key(field, to, merge_key)?;

    let mut elements = Vec::new();
    let mut order = Vec::with_capacity(to_elements.len());
    for (key_value, to_element) in &to_elements {
        let mut entry = Map::new();
        entry.set(merge_key.to_string(), key_value.clone());
        order.push(Value::Map(entry));

        match lookup(&from_elements, key_value) {
            Some(from_element) => {
                let mut diff = two_way_patch(from_element, to_element, element_ctx)?;
                if !diff.is_empty() {
                    diff.set(merge_key.to_string(), key_value.clone());
                    elements.push(Value::Map(diff));
                }
            }
            None => elements.push(Value::Map((*to_element).clone())),
        }
    }
    for (key_value, _) in &from_elements {
        if lookup(&to_elements, key_value).is_none() {
            let mut marker = Map::new();
            marker.set(merge_key.to_string(), key_value.clone());
            marker.set(
                PATCH_DIRECTIVE_KEY.to_string(),
                Value::String(DELETE_DIRECTIVE.to_string()),
            );
            elements.push(Value::Map(marker));
        }
    }
    Ok((elements, order))
}

fn subtract_keyed_list(
    field: &str,
    a: &[Value],
    b: &[Value],
    merge_key: &str,
    element_ctx: SchemaContext<'_>,
) -> Result<Vec<Value>> {
    let b_elements = index_by_merge_key(field, b, merge_key)?;
    let mut result = Vec::new();
    for element in a {
        let a_map = element
            .as_map()
            .ok_or_else(|| Error::missing_merge_key(field, merge_key))?;
        let key_value = a_map
            .get(merge_key)
            .ok_or_else(|| Error::missing_merge_key(field, merge_key))?;
        match lookup(&b_elements, key_value) {
            Some(b_map) => {
                let remaining = subtract_object(a_map, b_map, element_ctx, Some(merge_key))?;
                if !remaining.is_empty() {
                    result.push(Value::Map(remaining));
                }
            }
            None => result.push(element.clone()),
        }
    }
    Ok(result)
}

/// Merge lists without a declared key have no per-element identity; drop
/// every element deeply equal to one of `b`'s and keep the rest.
fn subtract_unkeyed_list(a: &[Value], b: &[Value]) -> Vec<Value> {
    a.iter()
        .filter(|element| !b.contains(element))
        .cloned()
        .collect()
}

fn index_by_merge_key<'v>(
    field: &str,
    elements: &'v [Value],
    merge_key: &str,
) -> Result<Vec<(Value, &'v Map)>> {
    elements
        .iter()
        .map(|element| {
            let map = element
                .as_map()
                .ok_or_else(|| Error::missing_merge_key(field, merge_key))?;
            let key_value = map
                .get(merge_key)
                .ok_or_else(|| Error::missing_merge_key(field, merge_key))?;
            Ok((key_value.clone(), map))
        })
        .collect()
}

fn lookup<'v>(elements: &[(Value, &'v Map)], key_value: &Value) -> Option<&'v Map> {
    elements
        .iter()
        .find(|(candidate, _)| candidate == key_value)
        .map(|(_, map)| *map)
}

fn is_container(value: &Value) -> bool {
    value.is_map() || value.is_list()
}

//! Per-field merge metadata resolution.

use crate::schema::{SchemaIndex, SchemaObject};

/// Reference chains deeper than this are treated as unresolvable.
const MAX_REF_DEPTH: usize = 32;

/// How a field must be treated when two documents are diffed.
///
/// A list field whose strategies include `merge` is reconciled element by
/// element, correlated by the merge key; without that annotation lists are
/// replaced wholesale. Object fields always recurse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchMetadata {
    merge_key: Option<String>,
    strategies: Vec<String>,
}

impl PatchMetadata {
    /// Creates metadata from explicit parts.
    pub fn new(merge_key: Option<String>, strategies: Vec<String>) -> Self {
        PatchMetadata {
            merge_key,
            strategies,
        }
    }

    pub(crate) fn from_schema(schema: &SchemaObject) -> Self {
        let strategies = schema
            .patch_strategy
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        PatchMetadata {
            merge_key: schema.patch_merge_key.clone(),
            strategies,
        }
    }

    /// The field within a list element used to correlate elements.
    pub fn merge_key(&self) -> Option<&str> {
        self.merge_key.as_deref()
    }

    /// All declared patch strategies.
    pub fn strategies(&self) -> &[String] {
        &self.strategies
    }

    /// Returns true if the field's list elements are merged rather than
    /// replaced.
    pub fn is_merge_list(&self) -> bool {
        self.strategies.iter().any(|s| s == "merge")
    }
}

/// A cheaply copyable handle positioned at one schema node.
///
/// Navigation never fails: fields the schema does not describe yield an
/// unresolved context and default metadata, so undecorated subtrees fall
/// back to recurse-for-objects / replace-for-lists.
#[derive(Debug, Clone, Copy)]
pub struct SchemaContext<'a> {
    index: &'a SchemaIndex,
    object: Option<&'a SchemaObject>,
}

impl<'a> SchemaContext<'a> {
    pub(crate) fn new(index: &'a SchemaIndex, object: Option<&'a SchemaObject>) -> Self {
        let object = object.and_then(|obj| deref(index, obj));
        SchemaContext { index, object }
    }

    /// A context with no schema backing; every field resolves to defaults.
    pub fn untracked(index: &'a SchemaIndex) -> Self {
        SchemaContext {
            index,
            object: None,
        }
    }

    /// Returns true if this context points at an actual schema node.
    pub fn is_resolved(&self) -> bool {
        self.object.is_some()
    }

    /// Navigates to a named property, returning the property's own context
    /// together with the merge metadata declared at the property site.
    pub fn field(&self, name: &str) -> (SchemaContext<'a>, PatchMetadata) {
        let Some(object) = self.object else {
            return (SchemaContext::untracked(self.index), PatchMetadata::default());
        };
        let Some(property) = object.properties.get(name) else {
            return (SchemaContext::untracked(self.index), PatchMetadata::default());
        };
        let metadata = PatchMetadata::from_schema(property);
        (SchemaContext::new(self.index, Some(property)), metadata)
    }

    /// Descends into a list property's element schema.
    pub fn elements(&self) -> SchemaContext<'a> {
        let items = self
            .object
            .and_then(|obj| obj.items.as_deref());
        SchemaContext::new(self.index, items)
    }
}

/// Follows `$ref` (and the single-element `allOf` wrapping v3 documents use)
/// until a concrete schema node is reached.
fn deref<'a>(index: &'a SchemaIndex, mut object: &'a SchemaObject) -> Option<&'a SchemaObject> {
    for _ in 0..MAX_REF_DEPTH {
        if let Some(ref path) = object.ref_path {
            object = index.resolve_ref(path)?;
        } else if let [single] = object.all_of.as_slice() {
            if single.ref_path.is_some() {
                object = single;
            } else {
                return Some(object);
            }
        } else {
            return Some(object);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{OpenApiDocument, TypeIdentity};

    const FIXTURE: &str = r##"{
        "swagger": "2.0",
        "info": {"title": "t", "version": "1"},
        "definitions": {
            "io.test.v1.Widget": {
                "type": "object",
                "x-kubernetes-group-version-kind": [
                    {"group": "test.io", "version": "v1", "kind": "Widget"}
                ],
                "properties": {
                    "metadata": {"$ref": "#/definitions/io.test.v1.Meta"},
                    "spec": {"$ref": "#/definitions/io.test.v1.WidgetSpec"}
                }
            },
            "io.test.v1.Meta": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"}
                }
            },
            "io.test.v1.WidgetSpec": {
                "type": "object",
                "properties": {
                    "parts": {
                        "type": "array",
                        "items": {"$ref": "#/definitions/io.test.v1.Part"},
                        "x-kubernetes-patch-merge-key": "id",
                        "x-kubernetes-patch-strategy": "retainKeys,merge"
                    },
                    "tags": {
                        "type": "array",
                        "items": {"type": "string"}
                    }
                }
            },
            "io.test.v1.Part": {
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "weight": {"type": "integer"}
                }
            }
        }
    }"##;

    fn index() -> SchemaIndex {
        let mut index = SchemaIndex::new();
        index.add_document(OpenApiDocument::from_json(FIXTURE).unwrap());
        index
    }

    #[test]
    fn test_merge_list_metadata() {
        let index = index();
        let root = index
            .context_for(&TypeIdentity::new("test.io", "v1", "Widget"))
            .unwrap();

        let (spec, spec_meta) = root.field("spec");
        assert!(spec.is_resolved());
        assert!(!spec_meta.is_merge_list());

        let (parts, parts_meta) = spec.field("parts");
        assert!(parts.is_resolved());
        assert!(parts_meta.is_merge_list());
        assert_eq!(parts_meta.merge_key(), Some("id"));
        assert_eq!(parts_meta.strategies(), ["retainKeys", "merge"]);

        let element = parts.elements();
        assert!(element.is_resolved());
        let (_, weight_meta) = element.field("weight");
        assert_eq!(weight_meta, PatchMetadata::default());
    }

    #[test]
    fn test_undecorated_list_defaults_to_replace() {
        let index = index();
        let root = index
            .context_for(&TypeIdentity::new("test.io", "v1", "Widget"))
            .unwrap();
        let (spec, _) = root.field("spec");

        let (_, tags_meta) = spec.field("tags");
        assert!(!tags_meta.is_merge_list());
        assert_eq!(tags_meta.merge_key(), None);
    }

    #[test]
    fn test_unknown_field_yields_unresolved_context() {
        let index = index();
        let root = index
            .context_for(&TypeIdentity::new("test.io", "v1", "Widget"))
            .unwrap();

        let (unknown, meta) = root.field("doesNotExist");
        assert!(!unknown.is_resolved());
        assert_eq!(meta, PatchMetadata::default());

        // Navigation from an unresolved context stays unresolved.
        let (nested, _) = unknown.field("anything");
        assert!(!nested.is_resolved());
        assert!(!unknown.elements().is_resolved());
    }

    #[test]
    fn test_all_of_reference_resolution() {
        let mut index = SchemaIndex::new();
        index.add_document(
            OpenApiDocument::from_json(
                r##"{
                    "openapi": "3.0.0",
                    "info": {"title": "t", "version": "1"},
                    "components": {
                        "schemas": {
                            "Widget": {
                                "type": "object",
                                "x-kubernetes-group-version-kind": [
                                    {"group": "test.io", "version": "v1", "kind": "Widget"}
                                ],
                                "properties": {
                                    "meta": {
                                        "allOf": [{"$ref": "#/components/schemas/Meta"}]
                                    }
                                }
                            },
                            "Meta": {
                                "type": "object",
                                "properties": {"name": {"type": "string"}}
                            }
                        }
                    }
                }"##,
            )
            .unwrap(),
        );

        let root = index
            .context_for(&TypeIdentity::new("test.io", "v1", "Widget"))
            .unwrap();
        let (meta_ctx, _) = root.field("meta");
        assert!(meta_ctx.is_resolved());
        let (name_ctx, _) = meta_ctx.field("name");
        assert!(name_ctx.is_resolved());
    }

    #[test]
    fn test_reference_cycle_is_cut() {
        let mut index = SchemaIndex::new();
        index.add_document(
            OpenApiDocument::from_json(
                r##"{
                    "swagger": "2.0",
                    "info": {"title": "t", "version": "1"},
                    "definitions": {
                        "A": {"$ref": "#/definitions/B"},
                        "B": {"$ref": "#/definitions/A"},
                        "Root": {
                            "type": "object",
                            "x-kubernetes-group-version-kind": [
                                {"group": "test.io", "version": "v1", "kind": "Root"}
                            ],
                            "properties": {"loop": {"$ref": "#/definitions/A"}}
                        }
                    }
                }"##,
            )
            .unwrap(),
        );

        let root = index
            .context_for(&TypeIdentity::new("test.io", "v1", "Root"))
            .unwrap();
        let (looped, _) = root.field("loop");
        assert!(!looped.is_resolved());
    }
}

//! Schema document set indexed by definition name and type identity.

use crate::error::{Error, Result};
use crate::schema::{OpenApiDocument, SchemaContext, SchemaObject, TypeIdentity};
use log::warn;
use once_cell::sync::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// File name suffix identifying schema documents in a schema directory.
pub const SCHEMA_FILE_SUFFIX: &str = "_openapi.json";

/// An immutable set of schema definitions gathered from one or more OpenAPI
/// documents.
///
/// The identity table is built on first lookup, so the index should be fully
/// populated before use. A shared reference is all concurrent partition
/// processing needs.
#[derive(Debug, Default)]
pub struct SchemaIndex {
    definitions: BTreeMap<String, SchemaObject>,
    identity_map: OnceCell<HashMap<TypeIdentity, String>>,
}

impl SchemaIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        SchemaIndex::default()
    }

    /// Loads every `*_openapi.json` document found in a directory.
    pub fn from_dir(directory: &Path) -> Result<Self> {
        let mut index = SchemaIndex::new();
        let mut paths = Vec::new();
        for entry in fs::read_dir(directory)? {
            let path = entry?.path();
            let is_schema = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(SCHEMA_FILE_SUFFIX));
            if path.is_file() && is_schema {
                paths.push(path);
            }
        }
        paths.sort();
        for path in paths {
            let content = fs::read_to_string(&path)?;
            let document = OpenApiDocument::from_json(&content)?;
            if !document.is_supported_version() {
                warn!("skipping {}: unknown schema document version", path.display());
                continue;
            }
            index.add_document(document);
        }
        Ok(index)
    }

    /// Merges a document's definitions into the index. The first definition
    /// registered under a name wins.
    pub fn add_document(&mut self, document: OpenApiDocument) {
        for (name, schema) in document.schemas() {
            self.definitions
                .entry(name.clone())
                .or_insert_with(|| schema.clone());
        }
    }

    /// Looks up a definition by name.
    pub fn definition(&self, name: &str) -> Option<&SchemaObject> {
        self.definitions.get(name)
    }

    /// Resolves a `$ref` path (e.g. `#/definitions/Foo` or
    /// `#/components/schemas/Foo`) to its definition.
    pub(crate) fn resolve_ref(&self, ref_path: &str) -> Option<&SchemaObject> {
        let name = ref_path.rsplit('/').next().unwrap_or(ref_path);
        self.definitions.get(name)
    }

    /// Returns a navigation context for the definition describing the given
    /// type identity, or `SchemaNotFound` if no definition claims it.
    pub fn context_for(&self, identity: &TypeIdentity) -> Result<SchemaContext<'_>> {
        let name = self
            .identity_map()
            .get(identity)
            .ok_or_else(|| Error::schema_not_found(identity.to_string()))?;
        Ok(SchemaContext::new(self, self.definitions.get(name)))
    }

    fn identity_map(&self) -> &HashMap<TypeIdentity, String> {
        self.identity_map.get_or_init(|| {
            let mut map = HashMap::new();
            for (name, schema) in &self.definitions {
                for identity in &schema.group_version_kinds {
                    map.entry(identity.clone()).or_insert_with(|| name.clone());
                }
            }
            map
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_from_json(json: &str) -> SchemaIndex {
        let mut index = SchemaIndex::new();
        index.add_document(OpenApiDocument::from_json(json).unwrap());
        index
    }

    #[test]
    fn test_context_for_known_identity() {
        let index = index_from_json(
            r##"{
                "swagger": "2.0",
                "info": {"title": "t", "version": "1"},
                "definitions": {
                    "io.test.v1.Widget": {
                        "type": "object",
                        "x-kubernetes-group-version-kind": [
                            {"group": "test.io", "version": "v1", "kind": "Widget"}
                        ],
                        "properties": {"spec": {"type": "object"}}
                    }
                }
            }"##,
        );

        let identity = TypeIdentity::new("test.io", "v1", "Widget");
        let ctx = index.context_for(&identity).unwrap();
        assert!(ctx.is_resolved());
    }

    #[test]
    fn test_context_for_unknown_identity() {
        let index = index_from_json(
            r#"{"swagger": "2.0", "info": {"title": "t", "version": "1"}, "definitions": {}}"#,
        );

        let err = index
            .context_for(&TypeIdentity::new("apps", "v1", "Deployment"))
            .unwrap_err();
        assert!(matches!(err, Error::SchemaNotFound { .. }));
    }

    #[test]
    fn test_resolve_ref_v2_and_v3_paths() {
        let index = index_from_json(
            r#"{
                "openapi": "3.0.0",
                "info": {"title": "t", "version": "1"},
                "components": {
                    "schemas": {
                        "Widget": {"type": "object"}
                    }
                }
            }"#,
        );

        assert!(index.resolve_ref("#/components/schemas/Widget").is_some());
        assert!(index.resolve_ref("#/definitions/Widget").is_some());
        assert!(index.resolve_ref("#/definitions/Missing").is_none());
    }

    #[test]
    fn test_first_definition_wins() {
        let mut index = SchemaIndex::new();
        index.add_document(
            OpenApiDocument::from_json(
                r#"{"swagger": "2.0", "info": {"title": "a", "version": "1"},
                    "definitions": {"Widget": {"type": "object"}}}"#,
            )
            .unwrap(),
        );
        index.add_document(
            OpenApiDocument::from_json(
                r#"{"swagger": "2.0", "info": {"title": "b", "version": "1"},
                    "definitions": {"Widget": {"type": "string"}}}"#,
            )
            .unwrap(),
        );

        assert_eq!(
            index.definition("Widget").and_then(|s| s.schema_type.as_deref()),
            Some("object")
        );
    }
}

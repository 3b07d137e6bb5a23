//! OpenAPI document model.
//!
//! Only the parts of a schema document that drive diffing are modeled: the
//! definition tree itself plus the vendor extensions naming each resource
//! type (`x-kubernetes-group-version-kind`) and declaring per-field merge
//! semantics (`x-kubernetes-patch-strategy`, `x-kubernetes-patch-merge-key`).

use crate::error::Result;
use crate::schema::TypeIdentity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parsed OpenAPI document, v2 (Swagger) or v3.
///
/// Both layouts are decoded into one struct; [`OpenApiDocument::schemas`]
/// picks whichever definition section the document's version uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenApiDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swagger: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi: Option<String>,

    #[serde(default)]
    pub info: Info,

    /// v2 schema definitions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, SchemaObject>,

    /// v3 components section.
    #[serde(default)]
    pub components: Components,
}

/// Document info block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub version: String,
}

/// OpenAPI v3 components section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, SchemaObject>,
}

/// A single schema definition or property.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaObject {
    /// Schema type (string, integer, number, boolean, array, object).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,

    /// Reference to another definition.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    /// Properties for object types.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaObject>,

    /// Items schema for array types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaObject>>,

    /// allOf composition; v3 documents wrap references in it.
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaObject>,

    /// Resource identities this definition describes.
    #[serde(
        rename = "x-kubernetes-group-version-kind",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub group_version_kinds: Vec<TypeIdentity>,

    /// Patch strategies for this field (comma-separated, e.g. `merge` or
    /// `retainKeys,merge`).
    #[serde(
        rename = "x-kubernetes-patch-strategy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub patch_strategy: Option<String>,

    /// Merge key correlating list items across document instances.
    #[serde(
        rename = "x-kubernetes-patch-merge-key",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub patch_merge_key: Option<String>,
}

impl OpenApiDocument {
    /// Parse an OpenAPI document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns true if the document declares a schema version this crate
    /// understands (Swagger 2.x or OpenAPI 3.x).
    pub fn is_supported_version(&self) -> bool {
        if let Some(ref swagger) = self.swagger {
            if swagger.starts_with("2.") {
                return true;
            }
        }
        if let Some(ref openapi) = self.openapi {
            if openapi.starts_with("3.") {
                return true;
            }
        }
        false
    }

    /// The document's definition section: `definitions` for v2,
    /// `components.schemas` for v3.
    pub fn schemas(&self) -> &BTreeMap<String, SchemaObject> {
        if !self.definitions.is_empty() {
            &self.definitions
        } else {
            &self.components.schemas
        }
    }
}

//! Resource type identity.

use crate::error::{Error, Result};
use crate::value::Map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The (group, version, kind) triple identifying a resource's schema.
///
/// Computed from the required top-level `apiVersion` and `kind` fields of a
/// manifest; also the shape of the entries in the
/// `x-kubernetes-group-version-kind` schema extension.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(default)]
pub struct TypeIdentity {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl TypeIdentity {
    /// Creates a type identity from its three components.
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        TypeIdentity {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Splits an `apiVersion` value into group and version.
    ///
    /// A value without a slash (e.g. `v1`) belongs to the empty group.
    pub fn from_api_version_and_kind(api_version: &str, kind: &str) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => TypeIdentity::new(group, version, kind),
            None => TypeIdentity::new("", api_version, kind),
        }
    }

    /// Computes the identity of a decoded manifest.
    pub fn of(resource: &Map) -> Result<Self> {
        let api_version = required_string(resource, "apiVersion")?;
        let kind = required_string(resource, "kind")?;
        Ok(TypeIdentity::from_api_version_and_kind(api_version, kind))
    }

    /// Filesystem-safe folder name for this identity.
    pub fn folder_name(&self) -> String {
        format!("{}_{}_{}", self.group, self.version, self.kind)
    }
}

fn required_string<'a>(resource: &'a Map, field: &str) -> Result<&'a str> {
    let value = resource.get(field).ok_or_else(|| {
        Error::malformed_input(format!(
            "required property '{}' not found in resource declaration",
            field
        ))
    })?;
    value.as_str().ok_or_else(|| {
        Error::malformed_input(format!("required property '{}' must be a string", field))
    })
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}, Kind={}", self.group, self.version, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_yaml;

    fn resource(yaml: &str) -> Map {
        from_yaml(yaml).unwrap().as_map().unwrap().clone()
    }

    #[test]
    fn test_identity_with_group() {
        let identity = TypeIdentity::of(&resource("apiVersion: apps/v1\nkind: Deployment\n")).unwrap();
        assert_eq!(identity, TypeIdentity::new("apps", "v1", "Deployment"));
        assert_eq!(identity.folder_name(), "apps_v1_Deployment");
        assert_eq!(format!("{}", identity), "apps/v1, Kind=Deployment");
    }

    #[test]
    fn test_identity_core_group() {
        let identity = TypeIdentity::of(&resource("apiVersion: v1\nkind: Service\n")).unwrap();
        assert_eq!(identity, TypeIdentity::new("", "v1", "Service"));
        assert_eq!(identity.folder_name(), "_v1_Service");
    }

    #[test]
    fn test_identity_missing_fields() {
        let err = TypeIdentity::of(&resource("kind: Deployment\n")).unwrap_err();
        assert!(format!("{}", err).contains("apiVersion"));

        let err = TypeIdentity::of(&resource("apiVersion: v1\n")).unwrap_err();
        assert!(format!("{}", err).contains("kind"));
    }

    #[test]
    fn test_identity_non_string_kind() {
        let err = TypeIdentity::of(&resource("apiVersion: v1\nkind: 7\n")).unwrap_err();
        assert!(format!("{}", err).contains("must be a string"));
    }
}

//! Decoding of multi-document YAML input.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::value::{Map, Value};

/// Decodes a (possibly multi-document) YAML stream into object values.
///
/// Empty documents are skipped; any other non-object document is fatal for
/// the whole run.
pub fn parse_documents(input: &str) -> Result<Vec<Map>> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(input) {
        let value = Value::deserialize(document)?;
        match value {
            Value::Null => continue,
            Value::Map(map) => {
                if map.is_empty() {
                    continue;
                }
                documents.push(map);
            }
            other => {
                return Err(Error::malformed_input(format!(
                    "expected an object document, found {}",
                    other.kind_name()
                )))
            }
        }
    }
    Ok(documents)
}

/// Reads every file in a directory whose name ends with `suffix`, ordered by
/// file name.
pub fn read_suffixed_files(directory: &Path, suffix: &str) -> Result<Vec<String>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(suffix));
        if path.is_file() && matches {
            paths.push(path);
        }
    }
    paths.sort();
    paths
        .into_iter()
        .map(|path| Ok(fs::read_to_string(path)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_documents() {
        let documents = parse_documents(
            "apiVersion: v1\nkind: A\n---\napiVersion: v1\nkind: B\n",
        )
        .unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(
            documents[1].get("kind"),
            Some(&Value::String("B".to_string()))
        );
    }

    #[test]
    fn test_empty_documents_are_skipped() {
        let documents = parse_documents("---\n---\nkind: A\n---\n{}\n").unwrap();
        assert_eq!(documents.len(), 1);
    }

    #[test]
    fn test_non_object_document_is_fatal() {
        let err = parse_documents("kind: A\n---\n- just\n- a\n- list\n").unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));

        let err = parse_documents("42\n").unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        assert!(parse_documents("").unwrap().is_empty());
    }
}

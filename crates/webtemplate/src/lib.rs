//! Web Template wire/boundary support.
//!
//! This crate is responsible for parsing the openEHR "Web Template" JSON
//! format — the flattened, implementation-friendly rendering of an archetype
//! template — into typed wire structs.
//!
//! Questionnaire meaning lives in `wtr-core`. This crate handles the foreign
//! file format only: the model is deliberately tolerant of unknown keys
//! (template servers add fields freely), while the loader is strict about the
//! shape of the keys it does understand and reports the failing JSON path on
//! mismatch.

pub mod model;

use std::fs;
use std::path::Path;

use thiserror::Error;

pub use model::{
    InputDefinition, ListItem, RangeBounds, Ranges, TemplateNode, Validation, WebTemplate,
};

/// Errors returned by the `webtemplate` boundary crate.
#[derive(Debug, Error)]
pub enum WebTemplateError {
    #[error("failed to read template file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("template schema mismatch at {path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a Web Template document from JSON text.
///
/// This uses `serde_path_to_error` to surface a best-effort "path" (e.g.
/// `tree.children[3].inputs[0].list`) to the failing field when the JSON does
/// not match the wire schema.
///
/// # Errors
///
/// Returns [`WebTemplateError::Schema`] if the JSON is invalid or a known
/// field has an unexpected type. Unknown fields are ignored.
pub fn from_json_str(json: &str) -> Result<WebTemplate, WebTemplateError> {
    let mut deserializer = serde_json::Deserializer::from_str(json);

    match serde_path_to_error::deserialize(&mut deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() {
                "<root>".to_string()
            } else {
                path
            };
            Err(WebTemplateError::Schema { path, source })
        }
    }
}

/// Read a Web Template document from a JSON file on disk.
///
/// # Errors
///
/// Returns [`WebTemplateError::FileRead`] if the file cannot be read, or
/// [`WebTemplateError::Schema`] if its contents do not parse.
pub fn from_file(path: &Path) -> Result<WebTemplate, WebTemplateError> {
    let text = fs::read_to_string(path)?;
    from_json_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_json_path_on_schema_mismatch() {
        // `languages` must be a list of strings.
        let err = from_json_str(r#"{"languages": [1, 2]}"#).expect_err("should reject");
        match err {
            WebTemplateError::Schema { path, .. } => {
                assert!(path.contains("languages"), "path was {path}");
            }
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn empty_document_has_no_tree() {
        let template = from_json_str("{}").expect("empty object is a valid document");
        assert!(template.tree.is_none());
        assert!(template.languages.is_empty());
    }
}

//! JSON loaders for the three input documents.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::ast::{BackendHandledDocument, RoleBindingDocument, SchemaDocument};
use crate::error::{PolyApiError, Result};

fn parse_document<T: DeserializeOwned>(document: &str, input: &str) -> Result<T> {
    serde_json::from_str(input).map_err(|e| PolyApiError::InvalidDocument {
        document: document.to_string(),
        message: e.to_string(),
    })
}

fn load_document<T: DeserializeOwned>(document: &str, path: &Path) -> Result<T> {
    let input = std::fs::read_to_string(path)?;
    log::debug!("loaded {} document from {}", document, path.display());
    parse_document(document, &input)
}

pub fn parse_schema(input: &str) -> Result<SchemaDocument> {
    parse_document("schema", input)
}

pub fn parse_roles(input: &str) -> Result<RoleBindingDocument> {
    parse_document("roles", input)
}

pub fn parse_backend_columns(input: &str) -> Result<BackendHandledDocument> {
    parse_document("backend-columns", input)
}

pub fn load_schema(path: impl AsRef<Path>) -> Result<SchemaDocument> {
    load_document("schema", path.as_ref())
}

pub fn load_roles(path: impl AsRef<Path>) -> Result<RoleBindingDocument> {
    load_document("roles", path.as_ref())
}

pub fn load_backend_columns(path: impl AsRef<Path>) -> Result<BackendHandledDocument> {
    load_document("backend-columns", path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ColumnLength, PrimaryKeyStrategy};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_entity() {
        let input = r#"
            {
                "entities": [
                    {
                        "name": "user",
                        "columns": [
                            {"name": "user_id", "type": "int", "primaryKey": true, "autoIncrement": true},
                            {"name": "email", "type": "varchar", "length": 255},
                            {"name": "price", "type": "decimal", "length": "10,2"}
                        ],
                        "filters": ["email"]
                    }
                ]
            }
        "#;

        let schema = parse_schema(input).unwrap();
        assert_eq!(schema.entities.len(), 1);

        let user = &schema.entities[0];
        assert_eq!(user.columns.len(), 3);
        assert!(user.columns[0].primary_key);
        assert!(user.columns[0].auto_increment);
        assert_eq!(user.columns[1].length, Some(ColumnLength::Number(255)));
        assert_eq!(user.columns[2].length, Some(ColumnLength::Text("10,2".to_string())));
        assert_eq!(user.filters, vec!["email".to_string()]);
        assert!(user.textarea_columns.is_empty());
    }

    #[test]
    fn test_primary_key_value_spellings() {
        let input = r#"
            {"entities": [{"name": "a", "columns": [
                {"name": "a_id", "type": "char", "primaryKey": true, "primaryKeyValue": "manual_all"}
            ]}]}
        "#;

        let schema = parse_schema(input).unwrap();
        assert_eq!(
            schema.entities[0].columns[0].primary_key_value,
            Some(PrimaryKeyStrategy::ManualAll)
        );
    }

    #[test]
    fn test_roles_and_backend_columns() {
        let roles = parse_roles(r#"{"columns": [{"key": "active", "name": "is_active"}]}"#).unwrap();
        assert_eq!(roles.columns[0].name, "is_active");

        let backend = parse_backend_columns(
            r#"{"updatedAt": {"columnName": "time_edit"}, "createdAt": {"columnName": "time_add"}}"#,
        )
        .unwrap();
        let keys: Vec<&str> = backend.columns.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["updatedAt", "createdAt"]);
    }

    #[test]
    fn test_malformed_document_names_its_kind() {
        let err = parse_schema(r#"{"entities": [{"columns": []}]}"#).unwrap_err();
        assert!(matches!(err, PolyApiError::InvalidDocument { ref document, .. } if document == "schema"));

        let err = parse_backend_columns("[1, 2]").unwrap_err();
        assert!(matches!(err, PolyApiError::InvalidDocument { ref document, .. } if document == "backend-columns"));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(&path, r#"{"columns": []}"#).unwrap();

        assert!(load_roles(&path).unwrap().columns.is_empty());
        assert!(matches!(load_schema(dir.path().join("missing.json")), Err(PolyApiError::Io(_))));
    }
}

//! Schema analysis: raw documents in, [`AnalyzedSchema`] out.
//!
//! Two passes. The first collects every declared entity and its declared
//! primary key so foreign keys can point forward; the second normalizes
//! types and classifies keys column by column.

use indexmap::IndexMap;
use serde::Serialize;

use crate::ast::{
    BackendBinding, ColumnDefinition, ColumnLength, EntityDefinition, PrimaryKeyStrategy,
    RoleBinding, SchemaDocument,
};
use crate::error::{PolyApiError, Result};
use crate::types::{normalize, CanonicalType, GraphqlScalar};

const FOREIGN_KEY_SUFFIX: &str = "_id";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub raw_type: String,
    pub length: Option<ColumnLength>,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    /// Resolved strategy, present only on the primary key
    pub primary_key_strategy: Option<PrimaryKeyStrategy>,
    pub canonical_type: CanonicalType,
    pub graphql_scalar: GraphqlScalar,
    pub is_foreign_key: bool,
    pub referenced_entity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedEntity {
    pub name: String,
    pub primary_key_name: String,
    pub has_active_column: bool,
    pub columns: IndexMap<String, AnalyzedColumn>,
    pub filters: Vec<String>,
    pub textarea_columns: Vec<String>,
    pub description: Option<String>,
}

impl AnalyzedEntity {
    pub fn primary_key(&self) -> &AnalyzedColumn {
        &self.columns[self.primary_key_name.as_str()]
    }

    pub fn column(&self, name: &str) -> Option<&AnalyzedColumn> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &AnalyzedColumn> {
        self.columns.values().filter(|c| c.is_foreign_key)
    }

    pub fn primary_key_strategy(&self) -> PrimaryKeyStrategy {
        self.primary_key()
            .primary_key_strategy
            .unwrap_or(PrimaryKeyStrategy::ManualAll)
    }
}

/// Read-only model shared by every profile and document emitter of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedSchema {
    entities: IndexMap<String, AnalyzedEntity>,
    roles: RoleBinding,
    backend: BackendBinding,
}

impl AnalyzedSchema {
    pub fn entity(&self, name: &str) -> Option<&AnalyzedEntity> {
        self.entities.get(name)
    }

    pub fn require_entity(&self, name: &str) -> Result<&AnalyzedEntity> {
        self.entity(name)
            .ok_or_else(|| PolyApiError::UnknownEntity(name.to_string()))
    }

    pub fn entities(&self) -> impl Iterator<Item = &AnalyzedEntity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn roles(&self) -> &RoleBinding {
        &self.roles
    }

    pub fn backend(&self) -> &BackendBinding {
        &self.backend
    }
}

/// Analyze a schema document. A pure function of its inputs.
pub fn analyze(
    doc: &SchemaDocument,
    roles: RoleBinding,
    backend: BackendBinding,
) -> Result<AnalyzedSchema> {
    // pass 1: entity name → declared primary key name
    let mut declared: IndexMap<&str, Option<&str>> = IndexMap::new();
    for entity in &doc.entities {
        let pk = entity.declared_primary_key().map(|c| c.name.as_str());
        if declared.insert(entity.name.as_str(), pk).is_some() {
            return Err(PolyApiError::DuplicateEntity(entity.name.clone()));
        }
    }

    // pass 2
    let mut entities = IndexMap::new();
    for entity in &doc.entities {
        let analyzed = analyze_entity(entity, &declared, &roles)?;
        log::debug!(
            "analyzed entity '{}': {} columns, primary key '{}', {} foreign keys",
            analyzed.name,
            analyzed.columns.len(),
            analyzed.primary_key_name,
            analyzed.foreign_keys().count()
        );
        entities.insert(analyzed.name.clone(), analyzed);
    }

    Ok(AnalyzedSchema {
        entities,
        roles,
        backend,
    })
}

fn analyze_entity(
    entity: &EntityDefinition,
    declared: &IndexMap<&str, Option<&str>>,
    roles: &RoleBinding,
) -> Result<AnalyzedEntity> {
    let primary_keys: Vec<&ColumnDefinition> =
        entity.columns.iter().filter(|c| c.primary_key).collect();

    let primary_key_name = match primary_keys.as_slice() {
        [] => return Err(PolyApiError::MissingPrimaryKey(entity.name.clone())),
        [pk] => pk.name.clone(),
        many => {
            return Err(PolyApiError::MultiplePrimaryKeys {
                entity: entity.name.clone(),
                columns: many.iter().map(|c| c.name.clone()).collect(),
            })
        }
    };

    let active_column = roles.active_column();
    let mut has_active_column = false;
    let mut columns = IndexMap::new();

    for column in &entity.columns {
        let normalized = normalize(&column.column_type, column.length.as_ref());

        if active_column == Some(column.name.as_str()) {
            has_active_column = true;
        }

        let referenced_entity = if column.name == primary_key_name {
            None
        } else {
            infer_foreign_key(&column.name, declared)
        };

        let primary_key_strategy = column
            .primary_key
            .then(|| resolve_strategy(column, normalized.canonical));

        let analyzed = AnalyzedColumn {
            name: column.name.clone(),
            raw_type: column.column_type.clone(),
            length: column.length.clone(),
            is_primary_key: column.primary_key,
            is_auto_increment: column.auto_increment,
            primary_key_strategy,
            canonical_type: normalized.canonical,
            graphql_scalar: normalized.scalar,
            is_foreign_key: referenced_entity.is_some(),
            referenced_entity,
        };

        if columns.insert(column.name.clone(), analyzed).is_some() {
            return Err(PolyApiError::DuplicateColumn {
                entity: entity.name.clone(),
                column: column.name.clone(),
            });
        }
    }

    Ok(AnalyzedEntity {
        name: entity.name.clone(),
        primary_key_name,
        has_active_column,
        columns,
        filters: entity.filters.clone(),
        textarea_columns: entity.textarea_columns.clone(),
        description: entity.description.clone(),
    })
}

/// `<X>_id` references `X` when `X` is declared and its own key is `<X>_id`.
fn infer_foreign_key(column: &str, declared: &IndexMap<&str, Option<&str>>) -> Option<String> {
    let target = column.strip_suffix(FOREIGN_KEY_SUFFIX)?;
    if target.is_empty() {
        return None;
    }

    match declared.get(target) {
        Some(Some(target_pk)) if *target_pk == column => Some(target.to_string()),
        _ => None,
    }
}

fn resolve_strategy(column: &ColumnDefinition, canonical: CanonicalType) -> PrimaryKeyStrategy {
    if let Some(strategy) = column.primary_key_value {
        return strategy;
    }
    if column.auto_increment {
        return PrimaryKeyStrategy::DatabaseDefault;
    }
    match canonical {
        CanonicalType::String | CanonicalType::Uuid => PrimaryKeyStrategy::Autogenerated,
        _ => PrimaryKeyStrategy::ManualAll,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BackendHandledDocument, RoleBindingDocument};
    use pretty_assertions::assert_eq;

    fn roles() -> RoleBinding {
        RoleBinding::from_document(&RoleBindingDocument::default().bind("active", "is_active"))
    }

    fn run(doc: &SchemaDocument) -> Result<AnalyzedSchema> {
        let roles = roles();
        let backend = BackendBinding::resolve(&BackendHandledDocument::default(), &roles)?;
        analyze(doc, roles, backend)
    }

    fn orders_and_customers() -> SchemaDocument {
        let mut doc = SchemaDocument::new();
        doc.add_entity(
            EntityDefinition::new("order")
                .column(ColumnDefinition::new("order_id", "int").primary(PrimaryKeyStrategy::DatabaseDefault))
                .column(ColumnDefinition::new("customer_id", "int"))
                .column(ColumnDefinition::new("external_ref_id", "varchar(40)"))
                .column(ColumnDefinition::new("is_active", "tinyint").length(1)),
        );
        doc.add_entity(
            EntityDefinition::new("customer")
                .column(ColumnDefinition::new("customer_id", "int").primary(PrimaryKeyStrategy::DatabaseDefault))
                .column(ColumnDefinition::new("name", "varchar(255)")),
        );
        doc
    }

    #[test]
    fn test_foreign_key_resolves_forward() {
        let schema = run(&orders_and_customers()).unwrap();
        let order = schema.entity("order").unwrap();

        let customer_id = order.column("customer_id").unwrap();
        assert!(customer_id.is_foreign_key);
        assert_eq!(customer_id.referenced_entity.as_deref(), Some("customer"));
    }

    #[test]
    fn test_unknown_reference_is_not_foreign_key() {
        let schema = run(&orders_and_customers()).unwrap();
        let external = schema.entity("order").unwrap().column("external_ref_id").unwrap();

        assert!(!external.is_foreign_key);
        assert_eq!(external.referenced_entity, None);
    }

    #[test]
    fn test_reference_requires_matching_target_key() {
        let mut doc = SchemaDocument::new();
        doc.add_entity(
            EntityDefinition::new("invoice")
                .column(ColumnDefinition::new("invoice_id", "int").primary(PrimaryKeyStrategy::DatabaseDefault))
                .column(ColumnDefinition::new("account_id", "int")),
        );
        doc.add_entity(
            EntityDefinition::new("account")
                .column(ColumnDefinition::new("id", "int").primary(PrimaryKeyStrategy::DatabaseDefault)),
        );

        let schema = run(&doc).unwrap();
        assert!(!schema.entity("invoice").unwrap().column("account_id").unwrap().is_foreign_key);
    }

    #[test]
    fn test_own_primary_key_is_never_foreign_key() {
        let schema = run(&orders_and_customers()).unwrap();
        let customer = schema.entity("customer").unwrap();

        assert_eq!(customer.primary_key_name, "customer_id");
        assert!(!customer.primary_key().is_foreign_key);
    }

    #[test]
    fn test_active_column_detection() {
        let schema = run(&orders_and_customers()).unwrap();

        assert!(schema.entity("order").unwrap().has_active_column);
        assert!(!schema.entity("customer").unwrap().has_active_column);
        assert_eq!(
            schema.entity("order").unwrap().column("is_active").unwrap().canonical_type,
            CanonicalType::Boolean
        );
    }

    #[test]
    fn test_declaration_order_preserved() {
        let schema = run(&orders_and_customers()).unwrap();
        let names: Vec<&str> = schema.entities().map(|e| e.name.as_str()).collect();
        let columns: Vec<&str> = schema.entity("order").unwrap().column_names().collect();

        assert_eq!(names, vec!["order", "customer"]);
        assert_eq!(columns, vec!["order_id", "customer_id", "external_ref_id", "is_active"]);
    }

    #[test]
    fn test_missing_primary_key_names_entity() {
        let mut doc = SchemaDocument::new();
        doc.add_entity(EntityDefinition::new("log_line").column(ColumnDefinition::new("message", "text")));

        let err = run(&doc).unwrap_err();
        assert!(matches!(&err, PolyApiError::MissingPrimaryKey(name) if name == "log_line"));
        assert!(err.to_string().contains("log_line"));
    }

    #[test]
    fn test_multiple_primary_keys_rejected() {
        let mut doc = SchemaDocument::new();
        doc.add_entity(
            EntityDefinition::new("pair")
                .column(ColumnDefinition::new("a", "int").primary(PrimaryKeyStrategy::ManualAll))
                .column(ColumnDefinition::new("b", "int").primary(PrimaryKeyStrategy::ManualAll)),
        );

        assert!(matches!(run(&doc), Err(PolyApiError::MultiplePrimaryKeys { .. })));
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut doc = orders_and_customers();
        doc.add_entity(
            EntityDefinition::new("customer")
                .column(ColumnDefinition::new("customer_id", "int").primary(PrimaryKeyStrategy::ManualAll)),
        );
        assert!(matches!(run(&doc), Err(PolyApiError::DuplicateEntity(name)) if name == "customer"));

        let mut doc = SchemaDocument::new();
        doc.add_entity(
            EntityDefinition::new("tag")
                .column(ColumnDefinition::new("tag_id", "int").primary(PrimaryKeyStrategy::ManualAll))
                .column(ColumnDefinition::new("label", "text"))
                .column(ColumnDefinition::new("label", "text")),
        );
        assert!(matches!(run(&doc), Err(PolyApiError::DuplicateColumn { .. })));
    }

    #[test]
    fn test_strategy_defaults() {
        let mut doc = SchemaDocument::new();
        doc.add_entity(
            EntityDefinition::new("a")
                .column(ColumnDefinition::new("a_id", "int").auto_increment().primary_flag()),
        );
        doc.add_entity(EntityDefinition::new("b").column(ColumnDefinition::new("b_id", "char(32)").primary_flag()));
        doc.add_entity(EntityDefinition::new("c").column(ColumnDefinition::new("c_id", "int").primary_flag()));

        let schema = run(&doc).unwrap();
        let strategy = |name: &str| schema.entity(name).unwrap().primary_key_strategy();

        assert_eq!(strategy("a"), PrimaryKeyStrategy::DatabaseDefault);
        assert_eq!(strategy("b"), PrimaryKeyStrategy::Autogenerated);
        assert_eq!(strategy("c"), PrimaryKeyStrategy::ManualAll);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let doc = orders_and_customers();
        assert_eq!(run(&doc).unwrap(), run(&doc).unwrap());
    }

    impl ColumnDefinition {
        fn primary_flag(mut self) -> Self {
            self.primary_key = true;
            self
        }
    }
}

//! `labels.json`: display names derived from identifier casing.

use indexmap::IndexMap;
use serde::Serialize;

use crate::analyzer::{AnalyzedEntity, AnalyzedSchema};
use crate::emit::naming::{pluralize, title_case};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityLabels {
    pub singular: String,
    pub plural: String,
    pub fields: IndexMap<String, String>,
}

/// `customer_id` on a foreign key → `Customer`; otherwise plain title case.
pub fn column_label(entity: &AnalyzedEntity, column: &str) -> String {
    let title = title_case(column);
    let is_foreign_key = entity.column(column).is_some_and(|c| c.is_foreign_key);
    match title.strip_suffix(" Id") {
        Some(stem) if is_foreign_key && !stem.is_empty() => stem.to_string(),
        _ => title,
    }
}

pub fn entity_labels(entity: &AnalyzedEntity) -> EntityLabels {
    EntityLabels {
        singular: title_case(&entity.name),
        plural: title_case(&pluralize(&entity.name)),
        fields: entity
            .column_names()
            .map(|name| (name.to_string(), column_label(entity, name)))
            .collect(),
    }
}

pub fn build(schema: &AnalyzedSchema) -> IndexMap<String, EntityLabels> {
    schema
        .entities()
        .map(|entity| (entity.name.clone(), entity_labels(entity)))
        .collect()
}

pub fn render(schema: &AnalyzedSchema) -> Result<String> {
    let mut text = serde_json::to_string_pretty(&build(schema))?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::shop_schema;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_entity_titles() {
        let schema = shop_schema();
        let labels = build(&schema);

        assert_eq!(labels["order_item"].singular, "Order Item");
        assert_eq!(labels["order_item"].plural, "Order Items");
    }

    #[test]
    fn test_foreign_key_drops_id_suffix() {
        let schema = shop_schema();
        let labels = build(&schema);

        assert_eq!(labels["order"].fields["customer_id"], "Customer");
        assert_eq!(labels["order"].fields["order_id"], "Order Id");
        assert_eq!(labels["order"].fields["is_active"], "Is Active");
    }
}

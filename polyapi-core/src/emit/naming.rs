//! Identifier casing for everything the profiles emit.
//!
//! Entity names are storage identifiers (usually snake_case):
//!   order_item  → type `OrderItem`, query `orderItem`, list `orderItems`
//!   category    → type `Category`, list `categories`
//! Column names pass through unchanged as GraphQL field names.

use heck::{ToLowerCamelCase, ToSnakeCase, ToTitleCase, ToUpperCamelCase};

/// "order_item" → "OrderItem"
pub fn type_name(entity: &str) -> String {
    entity.to_upper_camel_case()
}

/// "order_item" → "orderItem"
pub fn field_name(entity: &str) -> String {
    entity.to_lower_camel_case()
}

/// "order_item" → "orderItems"
pub fn list_field_name(entity: &str) -> String {
    pluralize(&field_name(entity))
}

/// "OrderItem" → "order_item"; used for file names
pub fn file_stem(entity: &str) -> String {
    entity.to_snake_case()
}

/// "order_item_id" → "Order Item Id"
pub fn title_case(identifier: &str) -> String {
    identifier.to_title_case()
}

/// English plural for the common regular cases.
/// "order" → "orders", "category" → "categories", "status" → "statuses"
pub fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();

    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{}es", word);
    }

    if let Some(stem) = word.strip_suffix('y').or_else(|| word.strip_suffix('Y')) {
        let before = stem.chars().last();
        if before.is_some_and(|c| !"aeiouAEIOU".contains(c)) {
            return format!("{}ies", stem);
        }
    }

    format!("{}s", word)
}

/// Relationship field for a foreign key `<X>_id`: `<X>`, or `<X>_ref` when
/// `<X>` is already a column name.
pub fn relation_field_name(column: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let base = column.strip_suffix("_id").unwrap_or(column);
    if is_taken(base) {
        format!("{}_ref", base)
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_entity() {
        assert_eq!(type_name("order"), "Order");
        assert_eq!(field_name("order"), "order");
        assert_eq!(list_field_name("order"), "orders");
    }

    #[test]
    fn test_compound_entity() {
        assert_eq!(type_name("order_item"), "OrderItem");
        assert_eq!(field_name("order_item"), "orderItem");
        assert_eq!(list_field_name("order_item"), "orderItems");
        assert_eq!(file_stem("OrderItem"), "order_item");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("branch"), "branches");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("order_item_id"), "Order Item Id");
        assert_eq!(title_case("createdAt"), "Created At");
    }

    #[test]
    fn test_relation_field_name() {
        assert_eq!(relation_field_name("customer_id", |_| false), "customer");
        assert_eq!(relation_field_name("customer_id", |n| n == "customer"), "customer_ref");
    }
}

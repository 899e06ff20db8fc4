//! `API.md`: a reference manual with one example per operation.
//!
//! Example argument values are fixed per canonical type so the manual is
//! stable across runs.

use crate::plan::{
    page_fields, shared_enums, shared_inputs, EmissionPlan, EntityPlan, OperationKind,
    OperationPlan, RootType,
};
use crate::query::{names, FilterOperator};
use crate::types::CanonicalType;

fn example_value(canonical: CanonicalType) -> &'static str {
    match canonical {
        CanonicalType::String => "\"example\"",
        CanonicalType::Integer => "1",
        CanonicalType::Float => "9.99",
        CanonicalType::Boolean => "true",
        CanonicalType::Date => "\"2024-01-31\"",
        CanonicalType::Time => "\"12:00:00\"",
        CanonicalType::DateTime => "\"2024-01-31 12:00:00\"",
        CanonicalType::Binary => "\"AA==\"",
        CanonicalType::Json => "\"{}\"",
        CanonicalType::Uuid => "\"00000000-0000-0000-0000-000000000000\"",
    }
}

fn example_id(entity: &EntityPlan) -> &'static str {
    match entity.primary_key.canonical {
        CanonicalType::Integer => "1",
        _ => "\"example-id\"",
    }
}

fn operator_meaning(op: FilterOperator) -> &'static str {
    match op {
        FilterOperator::Equals => "equal to `value`",
        FilterOperator::NotEquals => "not equal to `value`",
        FilterOperator::Contains => "contains `value`, case-insensitive; `%` and `_` match literally",
        FilterOperator::GreaterThan => "greater than `value`",
        FilterOperator::GreaterThanOrEquals => "greater than or equal to `value`",
        FilterOperator::LessThan => "less than `value`",
        FilterOperator::LessThanOrEquals => "less than or equal to `value`",
        FilterOperator::In => "one of the comma-separated values",
        FilterOperator::NotIn => "none of the comma-separated values",
    }
}

fn selection(entity: &EntityPlan, indent: &str) -> String {
    entity
        .fields
        .iter()
        .map(|f| format!("{}{}\n", indent, f.column))
        .collect()
}

fn object_literal(pairs: Vec<String>) -> String {
    if pairs.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", pairs.join(", "))
    }
}

fn create_input(entity: &EntityPlan) -> String {
    object_literal(
        entity
            .inputs
            .iter()
            .map(|f| {
                let value = if f.is_primary_key {
                    example_id(entity)
                } else {
                    example_value(f.canonical)
                };
                format!("{}: {}", f.column, value)
            })
            .collect(),
    )
}

/// The first non-key input; `None` when an update has nothing to set.
fn update_input(entity: &EntityPlan) -> Option<String> {
    let field = entity.data_inputs().next()?;
    Some(object_literal(vec![format!(
        "{}: {}",
        field.column,
        example_value(field.canonical)
    )]))
}

fn list_arguments(entity: &EntityPlan, default_limit: u64) -> String {
    let filter_field = entity
        .whitelist
        .iter()
        .find(|c| **c != entity.primary_key.column && entity.input(c).is_some())
        .unwrap_or(&entity.primary_key.column);
    let filter_value = entity
        .input(filter_field)
        .map(|f| example_value(f.canonical))
        .unwrap_or("\"1\"");
    // FilterInput.value is a String
    let filter_value = if filter_value.starts_with('"') {
        filter_value.to_string()
    } else {
        format!("\"{}\"", filter_value)
    };

    format!(
        "limit: {}, page: 1, orderBy: [{{ field: \"{}\", direction: DESC }}], filter: [{{ field: \"{}\", value: {}, operator: EQUALS }}]",
        default_limit, entity.primary_key.column, filter_field, filter_value
    )
}

/// `None` when the operation cannot succeed for this entity.
fn example(entity: &EntityPlan, op: &OperationPlan, default_limit: u64) -> Option<String> {
    let id = example_id(entity);
    let (keyword, call, body) = match op.kind {
        OperationKind::GetById => ("query", format!("{}(id: {})", op.field, id), selection(entity, "    ")),
        OperationKind::List => {
            let mut body = String::from("    items {\n");
            body.push_str(&selection(entity, "      "));
            body.push_str("    }\n");
            for (field, _) in page_fields(&entity.names.type_name).into_iter().skip(1) {
                body.push_str(&format!("    {}\n", field));
            }
            (
                "query",
                format!("{}({})", op.field, list_arguments(entity, default_limit)),
                body,
            )
        }
        OperationKind::Create => (
            "mutation",
            format!("{}(input: {})", op.field, create_input(entity)),
            selection(entity, "    "),
        ),
        OperationKind::Update => (
            "mutation",
            format!("{}(id: {}, input: {})", op.field, id, update_input(entity)?),
            selection(entity, "    "),
        ),
        OperationKind::Delete => ("mutation", format!("{}(id: {})", op.field, id), String::new()),
        OperationKind::ToggleActive => (
            "mutation",
            format!("{}(id: {}, active: false)", op.field, id),
            selection(entity, "    "),
        ),
    };

    Some(if body.is_empty() {
        format!("{} {{\n  {}\n}}\n", keyword, call)
    } else {
        format!("{} {{\n  {} {{\n{}  }}\n}}\n", keyword, call, body)
    })
}

fn shared_section() -> String {
    let mut out = String::from("## Shared types\n\n");

    out.push_str(&format!("### `{}`\n\n", names::FILTER_OPERATOR));
    out.push_str("| Operator | Matches rows whose field is |\n|---|---|\n");
    for op in FilterOperator::ALL {
        out.push_str(&format!("| `{}` | {} |\n", op.as_graphql(), operator_meaning(op)));
    }
    out.push_str("\nFilters combine with AND. Unknown field names are ignored.\n\n");

    for decl in shared_enums().into_iter().filter(|d| d.name != names::FILTER_OPERATOR) {
        let values: Vec<String> = decl.values.iter().map(|v| format!("`{}`", v)).collect();
        out.push_str(&format!("### `{}`\n\n{}\n\n", decl.name, values.join(", ")));
    }

    for decl in shared_inputs() {
        out.push_str(&format!("### `{}`\n\n```graphql\ninput {} {{\n", decl.name, decl.name));
        for field in &decl.fields {
            match &field.default {
                Some(default) => out.push_str(&format!("  {}: {} = {}\n", field.name, field.type_ref, default)),
                None => out.push_str(&format!("  {}: {}\n", field.name, field.type_ref)),
            }
        }
        out.push_str("}\n```\n\n");
    }

    out.push_str("### Page envelope\n\nEvery list query returns `<Type>Page`:\n\n```graphql\n");
    for (field, type_ref) in page_fields("<Type>") {
        out.push_str(&format!("{}: {}\n", field, type_ref));
    }
    out.push_str("```\n\n");
    out.push_str(
        "`page` overrides `offset`; `offset = (page - 1) * limit`. `totalPages` is 0 when `limit` is 0.\n\n",
    );
    out
}

fn field_notes(entity: &EntityPlan, column: &str) -> String {
    let mut notes = Vec::new();
    if column == entity.primary_key.column {
        notes.push("primary key".to_string());
    }
    if let Some(relation) = entity.relations.iter().find(|r| r.column == column) {
        notes.push(format!("references `{}` via `{}`", relation.target_type, relation.field));
    }
    if entity.input(column).is_none() && column != entity.primary_key.column {
        notes.push("server-assigned".to_string());
    }
    notes.join("; ")
}

fn entity_section(entity: &EntityPlan, default_limit: u64) -> String {
    let mut out = format!("## {}\n\n", entity.names.type_name);
    if let Some(description) = &entity.description {
        out.push_str(&format!("{}\n\n", description.trim()));
    }

    out.push_str("| Field | Type | Notes |\n|---|---|---|\n");
    for field in &entity.fields {
        out.push_str(&format!(
            "| `{}` | `{}` | {} |\n",
            field.column,
            field.type_ref,
            field_notes(entity, &field.column)
        ));
    }
    out.push('\n');

    for root in [RootType::Query, RootType::Mutation] {
        for op in entity.operations.iter().filter(|op| op.root == root) {
            out.push_str(&format!("### `{}`\n\n", op.field));
            match example(entity, op, default_limit) {
                Some(example) => out.push_str(&format!("```graphql\n{}```\n\n", example)),
                None => out.push_str(&format!(
                    "`{}` has no field besides the primary key, so every call fails with \"No fields to update\".\n\n",
                    entity.names.input_type
                )),
            }
        }
    }
    out
}

pub fn render(plan: &EmissionPlan) -> String {
    let mut out = String::from("# GraphQL API reference\n\n");
    out.push_str(
        "A single endpoint accepts `POST` requests with a JSON body `{\"query\": ..., \"variables\": ...}`.\n\n",
    );

    out.push_str(&shared_section());
    for entity in &plan.entities {
        out.push_str(&entity_section(entity, plan.default_page_limit));
    }

    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

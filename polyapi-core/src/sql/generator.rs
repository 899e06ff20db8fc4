use crate::analyzer::AnalyzedEntity;
use crate::query::{
    contains_pattern, split_list_value, FilterInput, ListArgs, PageWindow, PredicateShape,
    SortInput, LIKE_ESCAPE,
};
use super::dialect::SqlDialect;

/// One SQL statement with its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<String>,
}

/// A list request compiles to a count query and a data query that share
/// the same predicate set and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledList {
    pub count: CompiledQuery,
    pub data: CompiledQuery,
    pub window: PageWindow,
}

/// Compile list arguments for an entity.
///
/// Filter and sort fields are checked against the entity's columns; unknown
/// names are dropped. Values are only ever bound, never interpolated.
pub fn compile_list(
    entity: &AnalyzedEntity,
    args: &ListArgs,
    dialect: SqlDialect,
    default_limit: u64,
) -> CompiledList {
    let table = dialect.quote_ident(&entity.name);
    let window = PageWindow::resolve(args, default_limit);

    let mut params = Vec::new();
    let predicates = build_predicates(entity, &args.filter, dialect, &mut params);

    // COUNT
    let mut count_parts = vec!["SELECT COUNT(*) AS total".to_string(), format!("FROM {}", table)];
    if !predicates.is_empty() {
        count_parts.push(format!("WHERE {}", predicates.join(" AND ")));
    }

    // DATA
    let mut data_parts = vec![
        format!("SELECT {}", select_columns(entity, dialect)),
        format!("FROM {}", table),
    ];
    if !predicates.is_empty() {
        data_parts.push(format!("WHERE {}", predicates.join(" AND ")));
    }
    data_parts.push(build_order_by(entity, &args.order_by, dialect));
    data_parts.push(format!("LIMIT {}", window.limit));
    data_parts.push(format!("OFFSET {}", window.offset));

    CompiledList {
        count: CompiledQuery {
            sql: count_parts.join("\n"),
            params: params.clone(),
        },
        data: CompiledQuery {
            sql: data_parts.join("\n"),
            params,
        },
        window,
    }
}

/// Quoted column list in declaration order.
pub fn select_columns(entity: &AnalyzedEntity, dialect: SqlDialect) -> String {
    entity
        .column_names()
        .map(|name| dialect.quote_ident(name))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn select_by_id(entity: &AnalyzedEntity, dialect: SqlDialect) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_columns(entity, dialect),
        dialect.quote_ident(&entity.name),
        dialect.quote_ident(&entity.primary_key_name),
        dialect.placeholder(1),
    )
}

pub fn delete_by_id(entity: &AnalyzedEntity, dialect: SqlDialect) -> String {
    format!(
        "DELETE FROM {} WHERE {} = {}",
        dialect.quote_ident(&entity.name),
        dialect.quote_ident(&entity.primary_key_name),
        dialect.placeholder(1),
    )
}

/// `UPDATE ... SET col = ?[, extra = ?...] WHERE pk = ?`
pub fn update_by_id(entity: &AnalyzedEntity, columns: &[&str], dialect: SqlDialect) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = {}", dialect.quote_ident(column), dialect.placeholder(i + 1)))
        .collect();

    format!(
        "UPDATE {} SET {} WHERE {} = {}",
        dialect.quote_ident(&entity.name),
        assignments.join(", "),
        dialect.quote_ident(&entity.primary_key_name),
        dialect.placeholder(columns.len() + 1),
    )
}

fn build_predicates(
    entity: &AnalyzedEntity,
    filters: &[FilterInput],
    dialect: SqlDialect,
    params: &mut Vec<String>,
) -> Vec<String> {
    let mut predicates = Vec::new();

    for filter in filters {
        if !entity.has_column(&filter.field) {
            log::debug!("dropping filter on unknown field '{}.{}'", entity.name, filter.field);
            continue;
        }
        if let Some(predicate) = predicate_to_sql(filter, dialect, params) {
            predicates.push(predicate);
        }
    }

    predicates
}

fn predicate_to_sql(
    filter: &FilterInput,
    dialect: SqlDialect,
    params: &mut Vec<String>,
) -> Option<String> {
    let column = dialect.quote_ident(&filter.field);

    match filter.operator.shape() {
        PredicateShape::Contains => {
            params.push(contains_pattern(&filter.value));
            Some(format!(
                "LOWER({}) LIKE {} ESCAPE '{}'",
                column,
                dialect.placeholder(params.len()),
                LIKE_ESCAPE
            ))
        }
        shape @ (PredicateShape::InList | PredicateShape::NotInList) => {
            let values = split_list_value(&filter.value);
            if values.is_empty() {
                // nothing is IN an empty set, everything is NOT_IN it
                return (shape == PredicateShape::InList).then(|| "1 = 0".to_string());
            }
            let placeholders: Vec<String> = values
                .into_iter()
                .map(|value| {
                    params.push(value);
                    dialect.placeholder(params.len())
                })
                .collect();
            let keyword = if shape == PredicateShape::InList { "IN" } else { "NOT IN" };
            Some(format!("{} {} ({})", column, keyword, placeholders.join(", ")))
        }
        PredicateShape::Compare(comparison) => {
            params.push(filter.value.clone());
            Some(format!(
                "{} {} {}",
                column,
                comparison.as_sql(),
                dialect.placeholder(params.len())
            ))
        }
    }
}

/// Unknown sort fields are dropped; without any usable field the primary
/// key orders the rows so pages stay stable.
fn build_order_by(entity: &AnalyzedEntity, order_by: &[SortInput], dialect: SqlDialect) -> String {
    let clauses: Vec<String> = order_by
        .iter()
        .filter(|sort| entity.has_column(&sort.field))
        .map(|sort| format!("{} {}", dialect.quote_ident(&sort.field), sort.direction.as_sql()))
        .collect();

    if clauses.is_empty() {
        format!("ORDER BY {} ASC", dialect.quote_ident(&entity.primary_key_name))
    } else {
        format!("ORDER BY {}", clauses.join(", "))
    }
}

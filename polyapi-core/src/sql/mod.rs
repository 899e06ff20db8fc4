//! Reference SQL compilation of the list contract and the by-id statements
//! used by prepared-statement profiles.

pub mod dialect;
pub mod generator;

pub use dialect::{BooleanStorage, SqlDialect};
pub use generator::{
    compile_list, delete_by_id, select_by_id, select_columns, update_by_id, CompiledList,
    CompiledQuery,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::shop_schema;
    use crate::query::*;
    use pretty_assertions::assert_eq;

    fn compile(args: &ListArgs) -> CompiledList {
        let schema = shop_schema();
        compile_list(schema.entity("order").unwrap(), args, SqlDialect::Mysql, DEFAULT_PAGE_LIMIT)
    }

    // ─── SIMPLE QUERIES ───

    #[test]
    fn test_fetch_all() {
        let result = compile(&ListArgs::new());

        assert_eq!(result.count.sql, "SELECT COUNT(*) AS total\nFROM `order`");
        assert!(result.data.sql.starts_with("SELECT `order_id`, `customer_id`"));
        assert!(result.data.sql.contains("ORDER BY `order_id` ASC"));
        assert!(result.data.sql.ends_with("LIMIT 10\nOFFSET 0"));
        assert!(result.data.params.is_empty());
    }

    #[test]
    fn test_filter_equality_is_bound() {
        let args = ListArgs::new().filter(FilterInput::equals("status", "paid' OR 1=1 --"));
        let result = compile(&args);

        assert!(result.data.sql.contains("WHERE `status` = ?"));
        assert!(!result.data.sql.contains("paid"));
        assert_eq!(result.data.params, vec!["paid' OR 1=1 --"]);
    }

    #[test]
    fn test_multiple_filters_and_together() {
        let args = ListArgs::new()
            .filter(FilterInput::new("total", FilterOperator::GreaterThanOrEquals, "10"))
            .filter(FilterInput::new("total", FilterOperator::LessThan, "99"));
        let result = compile(&args);

        assert!(result.count.sql.contains("WHERE `total` >= ? AND `total` < ?"));
        assert_eq!(result.count.params, vec!["10", "99"]);
        assert_eq!(result.count.params, result.data.params);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let args = ListArgs::new().filter(FilterInput::new("note", FilterOperator::Contains, "Rush"));
        let result = compile(&args);

        assert!(result.data.sql.contains("LOWER(`note`) LIKE ? ESCAPE '!'"));
        assert_eq!(result.data.params, vec!["%rush%"]);
    }

    #[test]
    fn test_contains_escapes_like_wildcards() {
        let args = ListArgs::new().filter(FilterInput::new("note", FilterOperator::Contains, "50%_off"));
        let result = compile(&args);

        assert_eq!(result.data.params, vec!["%50!%!_off%"]);
    }

    #[test]
    fn test_in_binds_each_element() {
        let args = ListArgs::new()
            .filter(FilterInput::new("status", FilterOperator::In, "new, paid,shipped"))
            .filter(FilterInput::new("customer_id", FilterOperator::NotIn, "7"));
        let result = compile(&args);

        assert!(result.data.sql.contains("`status` IN (?, ?, ?) AND `customer_id` NOT IN (?)"));
        assert_eq!(result.data.params, vec!["new", "paid", "shipped", "7"]);
    }

    #[test]
    fn test_empty_in_lists() {
        let empty_in = compile(&ListArgs::new().filter(FilterInput::new("status", FilterOperator::In, " , ")));
        assert!(empty_in.data.sql.contains("WHERE 1 = 0"));

        let empty_not_in = compile(&ListArgs::new().filter(FilterInput::new("status", FilterOperator::NotIn, "")));
        assert_eq!(empty_not_in, compile(&ListArgs::new()));
    }

    #[test]
    fn test_postgres_numbering_continues_across_filters() {
        let schema = shop_schema();
        let args = ListArgs::new()
            .filter(FilterInput::new("status", FilterOperator::In, "a,b"))
            .filter(FilterInput::equals("customer_id", "3"));
        let result = compile_list(schema.entity("order").unwrap(), &args, SqlDialect::Postgres, 10);

        assert!(result.data.sql.contains("\"status\" IN ($1, $2) AND \"customer_id\" = $3"));
    }

    // ─── WHITELIST ───

    #[test]
    fn test_unknown_filter_field_is_dropped() {
        let with_unknown = ListArgs::new()
            .filter(FilterInput::equals("status", "paid"))
            .filter(FilterInput::equals("1=1; DROP TABLE order; --", "x"));
        let without = ListArgs::new().filter(FilterInput::equals("status", "paid"));

        assert_eq!(compile(&with_unknown), compile(&without));
    }

    #[test]
    fn test_unknown_sort_field_is_dropped() {
        let args = ListArgs::new()
            .order_by("nope", SortDirection::Desc)
            .order_by("total", SortDirection::Desc);
        let result = compile(&args);

        assert!(result.data.sql.contains("ORDER BY `total` DESC"));
        assert!(!result.data.sql.contains("nope"));
    }

    // ─── PAGINATION ───

    #[test]
    fn test_page_argument() {
        let result = compile(&ListArgs::new().limit(10).page(3));
        assert!(result.data.sql.ends_with("LIMIT 10\nOFFSET 20"));
        assert_eq!(result.window, PageWindow::new(10, 20));
    }

    // ─── BY ID ───

    #[test]
    fn test_by_id_statements() {
        let schema = shop_schema();
        let customer = schema.entity("customer").unwrap();

        assert_eq!(
            select_by_id(customer, SqlDialect::Mysql),
            "SELECT `customer_id`, `name`, `email`, `time_edit` FROM `customer` WHERE `customer_id` = ?"
        );
        assert_eq!(
            delete_by_id(customer, SqlDialect::Postgres),
            "DELETE FROM \"customer\" WHERE \"customer_id\" = $1"
        );
        assert_eq!(
            update_by_id(customer, &["name", "time_edit"], SqlDialect::Postgres),
            "UPDATE \"customer\" SET \"name\" = $1, \"time_edit\" = $2 WHERE \"customer_id\" = $3"
        );
    }
}

//! The filter/sort/pagination contract shared by every list query.

pub mod ast;
pub mod filter;
pub mod pagination;

pub use ast::{ListArgs, SortDirection, SortInput};
pub use filter::{
    contains_pattern, split_list_value, Comparison, FilterInput, FilterOperator, PredicateShape,
    LIKE_ESCAPE, LIST_DELIMITER,
};
pub use pagination::{PageInfo, PageWindow, DEFAULT_PAGE_LIMIT, ENVELOPE_FIELDS};

/// GraphQL names of the shared contract types and list arguments.
pub mod names {
    pub const SORT_INPUT: &str = "SortInput";
    pub const FILTER_INPUT: &str = "FilterInput";
    pub const SORT_DIRECTION: &str = "SortDirection";
    pub const FILTER_OPERATOR: &str = "FilterOperator";

    pub const ARG_ID: &str = "id";
    pub const ARG_INPUT: &str = "input";
    pub const ARG_ACTIVE: &str = "active";
    pub const ARG_LIMIT: &str = "limit";
    pub const ARG_OFFSET: &str = "offset";
    pub const ARG_PAGE: &str = "page";
    pub const ARG_ORDER_BY: &str = "orderBy";
    pub const ARG_FILTER: &str = "filter";

    pub const FIELD_FIELD: &str = "field";
    pub const FIELD_VALUE: &str = "value";
    pub const FIELD_OPERATOR: &str = "operator";
    pub const FIELD_DIRECTION: &str = "direction";
}

use serde::{Deserialize, Serialize};

/// Separator for `IN` / `NOT_IN` values: `"a,b,c"` binds three parameters.
pub const LIST_DELIMITER: char = ',';

/// Escape character of every generated `LIKE`. Accepted by MySQL, Postgres
/// and SQLite without string-literal escaping.
pub const LIKE_ESCAPE: char = '!';

/// Scalar comparisons, bound against a single parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
        }
    }
}

/// How a runtime evaluates an operator. Every emitted runtime handles each
/// shape; the operator → shape table itself is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateShape {
    Compare(Comparison),
    /// Case-insensitive `LIKE` against an escaped `%value%`
    Contains,
    /// Empty list compiles to a false predicate
    InList,
    /// Empty list compiles to no predicate
    NotInList,
}

impl PredicateShape {
    /// Shape names as spelled in the generated operator tables.
    pub const NAMES: [&'static str; 4] = ["compare", "contains", "in", "not_in"];

    pub fn name(&self) -> &'static str {
        match self {
            PredicateShape::Compare(_) => "compare",
            PredicateShape::Contains => "contains",
            PredicateShape::InList => "in",
            PredicateShape::NotInList => "not_in",
        }
    }
}

/// Filter operators, spelled on the wire as their GraphQL enum values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    #[default]
    Equals,
    NotEquals,
    /// Case-insensitive substring match
    Contains,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
    In,
    NotIn,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 9] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::Contains,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterThanOrEquals,
        FilterOperator::LessThan,
        FilterOperator::LessThanOrEquals,
        FilterOperator::In,
        FilterOperator::NotIn,
    ];

    pub fn as_graphql(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "EQUALS",
            FilterOperator::NotEquals => "NOT_EQUALS",
            FilterOperator::Contains => "CONTAINS",
            FilterOperator::GreaterThan => "GREATER_THAN",
            FilterOperator::GreaterThanOrEquals => "GREATER_THAN_OR_EQUALS",
            FilterOperator::LessThan => "LESS_THAN",
            FilterOperator::LessThanOrEquals => "LESS_THAN_OR_EQUALS",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT_IN",
        }
    }

    pub fn parse(name: &str) -> Option<FilterOperator> {
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_graphql() == name)
    }

    pub fn shape(&self) -> PredicateShape {
        match self {
            FilterOperator::Equals => PredicateShape::Compare(Comparison::Eq),
            FilterOperator::NotEquals => PredicateShape::Compare(Comparison::Ne),
            FilterOperator::GreaterThan => PredicateShape::Compare(Comparison::Gt),
            FilterOperator::GreaterThanOrEquals => PredicateShape::Compare(Comparison::Gte),
            FilterOperator::LessThan => PredicateShape::Compare(Comparison::Lt),
            FilterOperator::LessThanOrEquals => PredicateShape::Compare(Comparison::Lte),
            FilterOperator::Contains => PredicateShape::Contains,
            FilterOperator::In => PredicateShape::InList,
            FilterOperator::NotIn => PredicateShape::NotInList,
        }
    }

    /// SQL comparison for the scalar operators. `CONTAINS`, `IN` and
    /// `NOT_IN` compile to their own shapes.
    pub fn sql_comparison(&self) -> Option<&'static str> {
        match self.shape() {
            PredicateShape::Compare(comparison) => Some(comparison.as_sql()),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.shape(), PredicateShape::InList | PredicateShape::NotInList)
    }
}

/// `CONTAINS` parameter: lower-cased, `%`, `_` and [`LIKE_ESCAPE`] escaped,
/// wrapped in `%`.
pub fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.to_lowercase().chars() {
        if ch == '%' || ch == '_' || ch == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Split a delimited `IN` value into its elements, trimmed, empties dropped.
pub fn split_list_value(value: &str) -> Vec<String> {
    value
        .split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// `{field, value, operator}`; filters always combine with AND.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterInput {
    pub field: String,
    pub value: String,
    #[serde(default)]
    pub operator: FilterOperator,
}

impl FilterInput {
    pub fn new(field: &str, operator: FilterOperator, value: &str) -> Self {
        FilterInput {
            field: field.to_string(),
            value: value.to_string(),
            operator,
        }
    }

    pub fn equals(field: &str, value: &str) -> Self {
        FilterInput::new(field, FilterOperator::Equals, value)
    }
}

use serde::{Deserialize, Serialize};

use super::filter::FilterInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const ALL: [SortDirection; 2] = [SortDirection::Asc, SortDirection::Desc];

    pub fn as_graphql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        self.as_graphql()
    }
}

/// `{field, direction}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortInput {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Arguments accepted by every list query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListArgs {
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    /// 1-based; overrides `offset` when present
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default, rename = "orderBy")]
    pub order_by: Vec<SortInput>,
    #[serde(default)]
    pub filter: Vec<FilterInput>,
}

impl ListArgs {
    pub fn new() -> Self {
        ListArgs::default()
    }

    pub fn filter(mut self, filter: FilterInput) -> Self {
        self.filter.push(filter);
        self
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by.push(SortInput {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn page(mut self, n: u64) -> Self {
        self.page = Some(n);
        self
    }
}

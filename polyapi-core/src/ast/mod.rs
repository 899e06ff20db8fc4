//! Raw input documents consumed by the schema analyzer.
//!
//! These mirror the JSON shapes on disk one to one. Nothing here is
//! validated beyond what serde enforces; the analyzer owns every semantic
//! check.

pub mod roles;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use roles::{BackendBinding, BackendColumn, ContextSource, Role, RoleBinding, WritePhase};

/// `{entities: [...]}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub entities: Vec<EntityDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Storage identifier (table name)
    pub name: String,
    /// Declaration order is preserved through every later stage
    pub columns: Vec<ColumnDefinition>,
    /// Columns the UI should offer as filters
    #[serde(default)]
    pub filters: Vec<String>,
    /// Free-text columns rendered as multi-line inputs
    #[serde(default, rename = "textareaColumns", alias = "textarea_columns")]
    pub textarea_columns: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default)]
    pub length: Option<ColumnLength>,
    #[serde(default, rename = "primaryKey", alias = "primary_key")]
    pub primary_key: bool,
    #[serde(default, rename = "autoIncrement", alias = "auto_increment")]
    pub auto_increment: bool,
    #[serde(default, rename = "primaryKeyValue", alias = "primary_key_value")]
    pub primary_key_value: Option<PrimaryKeyStrategy>,
}

/// Length or precision qualifier. Schema exports spell it either as a
/// number (`255`) or as text (`"10,2"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnLength {
    Number(u64),
    Text(String),
}

impl ColumnLength {
    pub fn as_text(&self) -> String {
        match self {
            ColumnLength::Number(n) => n.to_string(),
            ColumnLength::Text(s) => s.trim().to_string(),
        }
    }

    /// True for a display width of exactly one (`tinyint(1)` style flags).
    pub fn is_one(&self) -> bool {
        match self {
            ColumnLength::Number(n) => *n == 1,
            ColumnLength::Text(s) => s.trim() == "1",
        }
    }
}

/// How a primary key value comes into existence on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimaryKeyStrategy {
    /// The generated resolver mints an opaque identifier
    #[serde(alias = "auto", alias = "generated")]
    Autogenerated,
    /// The caller supplies the value, including on update
    #[serde(alias = "manual_all", alias = "manualAll", alias = "manual")]
    ManualAll,
    /// The database assigns the value (autoincrement, sequence, default)
    #[serde(alias = "database_default", alias = "databaseDefault", alias = "database")]
    DatabaseDefault,
}

impl PrimaryKeyStrategy {
    /// Whether the key is part of the client-writable input type.
    pub fn is_client_writable(&self) -> bool {
        matches!(self, PrimaryKeyStrategy::ManualAll)
    }
}

/// `{columns: [{key, name}]}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoleBindingDocument {
    #[serde(default)]
    pub columns: Vec<RoleColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleColumn {
    pub key: String,
    pub name: String,
}

/// Ordered map `role → {columnName}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendHandledDocument {
    pub columns: IndexMap<String, BackendColumnSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendColumnSpec {
    #[serde(rename = "columnName", alias = "column_name", alias = "name")]
    pub column_name: String,
}

impl SchemaDocument {
    pub fn new() -> Self {
        SchemaDocument {
            entities: Vec::new(),
        }
    }

    pub fn add_entity(&mut self, entity: EntityDefinition) {
        self.entities.push(entity);
    }
}

impl EntityDefinition {
    pub fn new(name: &str) -> Self {
        EntityDefinition {
            name: name.to_string(),
            columns: Vec::new(),
            filters: Vec::new(),
            textarea_columns: Vec::new(),
            description: None,
        }
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// First column flagged as primary key, if any.
    pub fn declared_primary_key(&self) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

impl ColumnDefinition {
    pub fn new(name: &str, column_type: &str) -> Self {
        ColumnDefinition {
            name: name.to_string(),
            column_type: column_type.to_string(),
            length: None,
            primary_key: false,
            auto_increment: false,
            primary_key_value: None,
        }
    }

    pub fn length(mut self, length: u64) -> Self {
        self.length = Some(ColumnLength::Number(length));
        self
    }

    pub fn primary(mut self, strategy: PrimaryKeyStrategy) -> Self {
        self.primary_key = true;
        self.primary_key_value = Some(strategy);
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

impl RoleBindingDocument {
    pub fn bind(mut self, key: &str, column: &str) -> Self {
        self.columns.push(RoleColumn {
            key: key.to_string(),
            name: column.to_string(),
        });
        self
    }
}

impl BackendHandledDocument {
    pub fn bind(mut self, role: &str, column: &str) -> Self {
        self.columns.insert(
            role.to_string(),
            BackendColumnSpec {
                column_name: column.to_string(),
            },
        );
        self
    }
}

use serde::{Deserialize, Serialize};

/// Storage dialect an emitted resolver talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    #[serde(alias = "mariadb")]
    Mysql,
    #[serde(alias = "postgresql")]
    Postgres,
    Sqlite,
}

/// How a boolean column is represented in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BooleanStorage {
    Native,
    /// 0 / 1
    Integer,
}

impl SqlDialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlDialect::Mysql => "mysql",
            SqlDialect::Postgres => "postgres",
            SqlDialect::Sqlite => "sqlite",
        }
    }

    pub fn quote_ident(&self, name: &str) -> String {
        match self {
            SqlDialect::Mysql => format!("`{}`", name.replace('`', "``")),
            SqlDialect::Postgres | SqlDialect::Sqlite => {
                format!("\"{}\"", name.replace('"', "\"\""))
            }
        }
    }

    /// Placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${}", index),
            SqlDialect::Mysql | SqlDialect::Sqlite => "?".to_string(),
        }
    }

    pub fn boolean_storage(&self) -> BooleanStorage {
        match self {
            SqlDialect::Postgres => BooleanStorage::Native,
            SqlDialect::Mysql | SqlDialect::Sqlite => BooleanStorage::Integer,
        }
    }
}

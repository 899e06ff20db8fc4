use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PolyApiError, Result};
use crate::plan::PlanOptions;
use crate::profiles::ProfileKind;
use crate::query::DEFAULT_PAGE_LIMIT;
use crate::sql::SqlDialect;

/// Settings for one generation run. Every field has a default, so an empty
/// JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Consult a per-process cache before by-id and relationship lookups
    pub look_aside_cache: bool,
    pub profiles: Vec<ProfileKind>,
    pub default_page_limit: u64,
    pub emit_documents: bool,
    /// Storage dialect of the Sequelize profile
    pub node_dialect: SqlDialect,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            look_aside_cache: false,
            profiles: ProfileKind::ALL.to_vec(),
            default_page_limit: DEFAULT_PAGE_LIMIT,
            emit_documents: true,
            node_dialect: SqlDialect::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| PolyApiError::InvalidDocument {
            document: "config".to_string(),
            message: e.to_string(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            look_aside_cache: self.look_aside_cache,
            default_page_limit: self.default_page_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(GeneratorConfig::from_json("{}").unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn test_camel_case_fields() {
        let config = GeneratorConfig::from_json(
            r#"{"lookAsideCache": true, "profiles": ["php-pdo"], "defaultPageLimit": 25, "nodeDialect": "postgres"}"#,
        )
        .unwrap();

        assert!(config.look_aside_cache);
        assert_eq!(config.profiles, vec![ProfileKind::PhpPdo]);
        assert_eq!(config.plan_options().default_page_limit, 25);
        assert_eq!(config.node_dialect, SqlDialect::Postgres);
        assert!(config.emit_documents);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = GeneratorConfig::from_json(r#"{"cache": true}"#).unwrap_err();
        assert!(matches!(err, PolyApiError::InvalidDocument { document, .. } if document == "config"));
    }
}

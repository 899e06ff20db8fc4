use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{BackendHandledDocument, RoleBindingDocument};
use crate::error::{PolyApiError, Result};

/// Semantic role a concrete column can be bound to.
///
/// Role keys are matched case-insensitively with `_` and `-` ignored, so
/// `createdAt`, `created_at` and `created-at` all name the same role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Active,
    DisplayName,
    CreatedAt,
    CreatedBy,
    CreatedFromAddress,
    UpdatedAt,
    UpdatedBy,
    UpdatedFromAddress,
    Other(String),
}

/// Which mutation body assigns a backend-handled column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WritePhase {
    Create,
    Update,
}

/// Request-scoped value a backend-handled column is assigned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextSource {
    Timestamp,
    Actor,
    RemoteAddress,
}

impl Role {
    pub fn parse(key: &str) -> Role {
        let folded: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "active" => Role::Active,
            "displayname" => Role::DisplayName,
            "createdat" => Role::CreatedAt,
            "createdby" => Role::CreatedBy,
            "createdfromaddress" | "createdfromip" => Role::CreatedFromAddress,
            "updatedat" => Role::UpdatedAt,
            "updatedby" => Role::UpdatedBy,
            "updatedfromaddress" | "updatedfromip" => Role::UpdatedFromAddress,
            _ => Role::Other(key.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Role::Active => "active",
            Role::DisplayName => "displayName",
            Role::CreatedAt => "createdAt",
            Role::CreatedBy => "createdBy",
            Role::CreatedFromAddress => "createdFromAddress",
            Role::UpdatedAt => "updatedAt",
            Role::UpdatedBy => "updatedBy",
            Role::UpdatedFromAddress => "updatedFromAddress",
            Role::Other(key) => key,
        }
    }

    /// Phase and value source for roles whose columns are server-assigned.
    pub fn backend(&self) -> Option<(WritePhase, ContextSource)> {
        match self {
            Role::CreatedAt => Some((WritePhase::Create, ContextSource::Timestamp)),
            Role::CreatedBy => Some((WritePhase::Create, ContextSource::Actor)),
            Role::CreatedFromAddress => Some((WritePhase::Create, ContextSource::RemoteAddress)),
            Role::UpdatedAt => Some((WritePhase::Update, ContextSource::Timestamp)),
            Role::UpdatedBy => Some((WritePhase::Update, ContextSource::Actor)),
            Role::UpdatedFromAddress => Some((WritePhase::Update, ContextSource::RemoteAddress)),
            Role::Active | Role::DisplayName | Role::Other(_) => None,
        }
    }
}

impl From<String> for Role {
    fn from(key: String) -> Self {
        Role::parse(&key)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.key().to_string()
    }
}

/// Role → column mapping supplied once per generation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleBinding {
    columns: IndexMap<Role, String>,
}

impl RoleBinding {
    /// Later entries for the same role replace earlier ones.
    pub fn from_document(doc: &RoleBindingDocument) -> Self {
        let mut columns = IndexMap::new();
        for entry in &doc.columns {
            let role = Role::parse(&entry.key);
            if let Some(previous) = columns.insert(role, entry.name.clone()) {
                log::warn!(
                    "role '{}' bound twice, '{}' replaces '{}'",
                    entry.key,
                    entry.name,
                    previous
                );
            }
        }
        RoleBinding { columns }
    }

    pub fn column_for(&self, role: &Role) -> Option<&str> {
        self.columns.get(role).map(String::as_str)
    }

    pub fn active_column(&self) -> Option<&str> {
        self.column_for(&Role::Active)
    }

    pub fn display_name_column(&self) -> Option<&str> {
        self.column_for(&Role::DisplayName)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Role, &str)> {
        self.columns.iter().map(|(role, column)| (role, column.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendColumn {
    pub role: Role,
    pub column: String,
    pub phase: WritePhase,
    pub source: ContextSource,
}

/// The columns that are always server-assigned and never client-writable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendBinding {
    columns: Vec<BackendColumn>,
}

impl BackendBinding {
    /// Entries of the backend-handled document come first, in document
    /// order. Backend roles present only in the role binding follow.
    pub fn resolve(doc: &BackendHandledDocument, roles: &RoleBinding) -> Result<Self> {
        let mut binding = BackendBinding::default();

        for (key, spec) in &doc.columns {
            let role = Role::parse(key);
            if role.backend().is_none() {
                return Err(PolyApiError::UnknownRole(key.clone()));
            }
            binding.push(role, &spec.column_name);
        }

        for (role, column) in roles.iter() {
            if role.backend().is_some() && !binding.has_role(role) {
                binding.push(role.clone(), column);
            }
        }

        Ok(binding)
    }

    fn push(&mut self, role: Role, column: &str) {
        let Some((phase, source)) = role.backend() else {
            return;
        };
        if self.has_role(&role) {
            return;
        }
        self.columns.push(BackendColumn {
            role,
            column: column.to_string(),
            phase,
            source,
        });
    }

    fn has_role(&self, role: &Role) -> bool {
        self.columns.iter().any(|c| &c.role == role)
    }

    pub fn columns(&self) -> &[BackendColumn] {
        &self.columns
    }

    pub fn for_phase(&self, phase: WritePhase) -> impl Iterator<Item = &BackendColumn> {
        self.columns.iter().filter(move |c| c.phase == phase)
    }

    pub fn is_backend_handled(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.column == column)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

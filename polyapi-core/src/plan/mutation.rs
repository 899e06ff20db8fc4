use serde::Serialize;

use crate::analyzer::{AnalyzedColumn, AnalyzedEntity};
use crate::ast::{ContextSource, PrimaryKeyStrategy, Role};
use crate::emit::TypeRef;
use crate::sql::BooleanStorage;
use crate::types::{CanonicalType, GraphqlScalar};

/// How `create` obtains the new row's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyAssignment {
    /// Mint a time-derived prefix plus a fixed-width random suffix
    Mint,
    /// Omit the column, then read the storage's last inserted id
    LastInsertId,
    /// Require the caller-supplied value
    ClientSupplied,
}

impl KeyAssignment {
    pub fn for_strategy(strategy: PrimaryKeyStrategy) -> Self {
        match strategy {
            PrimaryKeyStrategy::Autogenerated => KeyAssignment::Mint,
            PrimaryKeyStrategy::DatabaseDefault => KeyAssignment::LastInsertId,
            PrimaryKeyStrategy::ManualAll => KeyAssignment::ClientSupplied,
        }
    }
}

/// Random suffix width, in hex characters, of minted identifiers.
pub const MINTED_SUFFIX_HEX_WIDTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyPlan {
    pub column: String,
    pub canonical: CanonicalType,
    pub strategy: PrimaryKeyStrategy,
    pub assignment: KeyAssignment,
}

impl PrimaryKeyPlan {
    pub(crate) fn of(entity: &AnalyzedEntity) -> Self {
        let pk = entity.primary_key();
        let strategy = entity.primary_key_strategy();
        PrimaryKeyPlan {
            column: pk.name.clone(),
            canonical: pk.canonical_type,
            strategy,
            assignment: KeyAssignment::for_strategy(strategy),
        }
    }

    /// `update` may carry a new key value distinct from the locating id.
    pub fn may_change_on_update(&self) -> bool {
        self.strategy == PrimaryKeyStrategy::ManualAll
    }
}

/// A client-writable column of `EInput`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFieldPlan {
    pub column: String,
    pub type_ref: TypeRef,
    pub canonical: CanonicalType,
    pub is_primary_key: bool,
}

/// A column assigned from request context just before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerAssignment {
    pub column: String,
    pub role: Role,
    pub source: ContextSource,
}

/// Toggle-active details; present only when the entity has the active column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePlan {
    pub column: String,
    pub canonical: CanonicalType,
}

impl ActivePlan {
    /// Storage representation of the new flag value for a given convention.
    /// Integer-typed flags are always written as 0 / 1.
    pub fn storage(&self, convention: BooleanStorage) -> BooleanStorage {
        match self.canonical {
            CanonicalType::Boolean => convention,
            _ => BooleanStorage::Integer,
        }
    }
}

/// Writable inputs before backend-handled columns are removed: every
/// column except a primary key the client may not write.
pub(crate) fn candidate_inputs(entity: &AnalyzedEntity) -> Vec<InputFieldPlan> {
    let strategy = entity.primary_key_strategy();

    entity
        .columns
        .values()
        .filter(|column| !column.is_primary_key || strategy.is_client_writable())
        .map(input_field)
        .collect()
}

fn input_field(column: &AnalyzedColumn) -> InputFieldPlan {
    let scalar = if column.is_primary_key {
        GraphqlScalar::Id
    } else {
        column.graphql_scalar
    };
    InputFieldPlan {
        column: column.name.clone(),
        type_ref: TypeRef::scalar(scalar),
        canonical: column.canonical_type,
        is_primary_key: column.is_primary_key,
    }
}

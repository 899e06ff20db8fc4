use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolyApiError {
    #[error("Invalid {document} document: {message}")]
    InvalidDocument { document: String, message: String },

    #[error("Duplicate entity: {0}")]
    DuplicateEntity(String),

    #[error("Duplicate column '{column}' in entity '{entity}'")]
    DuplicateColumn { entity: String, column: String },

    #[error("Entity '{0}' has no primary key column")]
    MissingPrimaryKey(String),

    #[error("Entity '{entity}' declares more than one primary key: {}", columns.join(", "))]
    MultiplePrimaryKeys { entity: String, columns: Vec<String> },

    #[error("Unknown backend-handled role: {0}")]
    UnknownRole(String),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Profile '{profile}' references undeclared type '{type_name}'")]
    UnresolvedTypeReference { profile: String, type_name: String },

    #[error("Duplicate GraphQL type name: {0}")]
    DuplicateTypeName(String),

    #[error("GraphQL field '{name}' is produced by both '{first}' and '{second}'")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("Profiles '{left}' and '{right}' render different contracts: {}", details.join("; "))]
    ContractMismatch {
        left: String,
        right: String,
        details: Vec<String>,
    },

    #[error("Malformed SDL at line {line}: {message}")]
    MalformedSdl { line: usize, message: String },

    #[error("Duplicate artifact path: {0}")]
    DuplicateArtifact(String),

    #[error("Artifact path escapes the output directory: {0}")]
    UnsafeArtifactPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PolyApiError>;

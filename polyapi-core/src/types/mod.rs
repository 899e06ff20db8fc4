//! Raw column type normalization.
//!
//! Schema exports spell the same storage type many ways (`INT(11) UNSIGNED`,
//! `int4`, `integer`). Everything is folded into [`CanonicalType`] and a
//! GraphQL scalar. Normalization never fails: unknown spellings become
//! `string`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ast::ColumnLength;

lazy_static! {
    static ref QUALIFIER: Regex = Regex::new(r"\(\s*([^)]*?)\s*\)").unwrap();
    static ref MODIFIERS: Regex = Regex::new(r"\b(unsigned|signed|zerofill)\b").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref INTEGER_WORD: Regex =
        Regex::new(r"^((tiny|small|medium|big|u)?int(eger)?\d*|(small|big)?serial\d*)$").unwrap();
}

const INTEGER_TYPES: &[&str] = &[
    "int", "integer", "tinyint", "smallint", "mediumint", "bigint", "int2", "int4", "int8",
    "serial", "smallserial", "bigserial", "year",
];
const FLOAT_TYPES: &[&str] = &[
    "float", "float4", "float8", "double", "double precision", "real", "decimal", "numeric",
    "number", "money", "smallmoney",
];
const BOOLEAN_TYPES: &[&str] = &["bool", "boolean", "bit"];
const STRING_TYPES: &[&str] = &[
    "char", "varchar", "nchar", "nvarchar", "character", "character varying", "text",
    "tinytext", "mediumtext", "longtext", "ntext", "string", "enum", "set", "citext", "clob",
];
const DATE_TYPES: &[&str] = &["date"];
const TIME_TYPES: &[&str] = &["time", "timetz", "time with time zone", "time without time zone"];
const DATETIME_TYPES: &[&str] = &[
    "datetime", "datetime2", "smalldatetime", "datetimeoffset", "timestamp", "timestamptz",
    "timestamp with time zone", "timestamp without time zone",
];
const BINARY_TYPES: &[&str] = &[
    "binary", "varbinary", "blob", "tinyblob", "mediumblob", "longblob", "bytea", "image",
];
const JSON_TYPES: &[&str] = &["json", "jsonb"];
const UUID_TYPES: &[&str] = &["uuid", "uniqueidentifier", "guid"];

/// Exact-match families, checked in order.
const EXACT_FAMILIES: &[(&[&str], CanonicalType)] = &[
    (INTEGER_TYPES, CanonicalType::Integer),
    (FLOAT_TYPES, CanonicalType::Float),
    (BOOLEAN_TYPES, CanonicalType::Boolean),
    (STRING_TYPES, CanonicalType::String),
    (DATETIME_TYPES, CanonicalType::DateTime),
    (DATE_TYPES, CanonicalType::Date),
    (TIME_TYPES, CanonicalType::Time),
    (BINARY_TYPES, CanonicalType::Binary),
    (JSON_TYPES, CanonicalType::Json),
    (UUID_TYPES, CanonicalType::Uuid),
];

enum Fallback {
    Contains(&'static [&'static str]),
    /// A whole word of the integer family, so `point` and `interval` stay
    /// unrecognized
    IntegerWord,
}

/// Fallbacks, checked in order. `datetime` must be tried before `date` and
/// `time`.
const FALLBACK_FAMILIES: &[(Fallback, CanonicalType)] = &[
    (Fallback::Contains(&["uuid", "guid"]), CanonicalType::Uuid),
    (Fallback::Contains(&["json"]), CanonicalType::Json),
    (Fallback::Contains(&["blob", "binary", "bytea"]), CanonicalType::Binary),
    (Fallback::Contains(&["timestamp", "datetime"]), CanonicalType::DateTime),
    (Fallback::Contains(&["date"]), CanonicalType::Date),
    (Fallback::Contains(&["time"]), CanonicalType::Time),
    (Fallback::Contains(&["char", "text", "clob"]), CanonicalType::String),
    (Fallback::Contains(&["bool"]), CanonicalType::Boolean),
    (Fallback::IntegerWord, CanonicalType::Integer),
    (
        Fallback::Contains(&["float", "double", "decimal", "numeric", "real", "money"]),
        CanonicalType::Float,
    ),
];

impl Fallback {
    fn matches(&self, base: &str) -> bool {
        match self {
            Fallback::Contains(needles) => needles.iter().any(|needle| base.contains(needle)),
            Fallback::IntegerWord => base
                .split(|c: char| c == ' ' || c == '_')
                .any(|word| INTEGER_WORD.is_match(word)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
    Binary,
    Json,
    Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphqlScalar {
    String,
    Int,
    Float,
    Boolean,
    #[serde(rename = "ID")]
    Id,
}

impl CanonicalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalType::String => "string",
            CanonicalType::Integer => "integer",
            CanonicalType::Float => "float",
            CanonicalType::Boolean => "boolean",
            CanonicalType::Date => "date",
            CanonicalType::Time => "time",
            CanonicalType::DateTime => "datetime",
            CanonicalType::Binary => "binary",
            CanonicalType::Json => "json",
            CanonicalType::Uuid => "uuid",
        }
    }

    pub fn graphql_scalar(&self) -> GraphqlScalar {
        match self {
            CanonicalType::Integer => GraphqlScalar::Int,
            CanonicalType::Float => GraphqlScalar::Float,
            CanonicalType::Boolean => GraphqlScalar::Boolean,
            CanonicalType::Uuid => GraphqlScalar::Id,
            CanonicalType::String
            | CanonicalType::Date
            | CanonicalType::Time
            | CanonicalType::DateTime
            | CanonicalType::Binary
            | CanonicalType::Json => GraphqlScalar::String,
        }
    }
}

impl GraphqlScalar {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphqlScalar::String => "String",
            GraphqlScalar::Int => "Int",
            GraphqlScalar::Float => "Float",
            GraphqlScalar::Boolean => "Boolean",
            GraphqlScalar::Id => "ID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedType {
    pub canonical: CanonicalType,
    pub scalar: GraphqlScalar,
    /// False when the spelling matched no family and defaulted to string
    pub recognized: bool,
}

impl NormalizedType {
    fn of(canonical: CanonicalType, recognized: bool) -> Self {
        NormalizedType {
            canonical,
            scalar: canonical.graphql_scalar(),
            recognized,
        }
    }
}

/// Normalize a raw type spelling with its optional length qualifier.
pub fn normalize(raw: &str, length: Option<&ColumnLength>) -> NormalizedType {
    let lowered = raw.trim().to_lowercase();

    // a parenthesised qualifier counts as the length when none is given
    let inline_length = QUALIFIER
        .captures(&lowered)
        .and_then(|caps| caps.get(1))
        .map(|m| ColumnLength::Text(m.as_str().to_string()));
    let length = length.cloned().or(inline_length);

    let base = QUALIFIER.replace_all(&lowered, " ");
    let base = MODIFIERS.replace_all(&base, " ");
    let base = WHITESPACE.replace_all(base.trim(), " ").to_string();

    let canonical = match classify(&base) {
        Some(canonical) => canonical,
        None => {
            log::debug!("unrecognized column type '{}', defaulting to string", raw);
            return NormalizedType::of(CanonicalType::String, false);
        }
    };

    if canonical == CanonicalType::Integer && length.as_ref().is_some_and(ColumnLength::is_one) {
        return NormalizedType::of(CanonicalType::Boolean, true);
    }

    NormalizedType::of(canonical, true)
}

fn classify(base: &str) -> Option<CanonicalType> {
    if base.is_empty() {
        return None;
    }

    for (names, canonical) in EXACT_FAMILIES {
        if names.contains(&base) {
            return Some(*canonical);
        }
    }

    for (fallback, canonical) in FALLBACK_FAMILIES {
        if fallback.matches(base) {
            return Some(*canonical);
        }
    }

    None
}

//! `fields.json`: per-entity field configuration for a companion UI.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::analyzer::{AnalyzedColumn, AnalyzedEntity, AnalyzedSchema};
use crate::error::Result;
use crate::plan::{EmissionPlan, EntityPlan};
use crate::types::CanonicalType;

lazy_static! {
    static ref ENUM_TYPE: Regex = Regex::new(r"(?i)^\s*(enum|set)\s*\(").unwrap();
    static ref QUOTED: Regex = Regex::new(r"'((?:[^']|'')*)'").unwrap();
}

/// Where a selectable field gets its choices from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum OptionSource {
    /// Fixed value → label pairs
    Map { values: IndexMap<String, String> },
    /// Rows of another entity
    #[serde(rename_all = "camelCase")]
    Entity {
        entity: String,
        value_field: String,
        label_field: String,
    },
    YesNo,
    TrueFalse,
    OneZero,
}

impl OptionSource {
    /// Static choices in display order; entity-backed sources load theirs at runtime.
    pub fn choices(&self) -> Vec<(String, String)> {
        let pairs = |items: [(&str, &str); 2]| -> Vec<(String, String)> {
            items
                .iter()
                .map(|(v, l)| (v.to_string(), l.to_string()))
                .collect()
        };
        match self {
            OptionSource::Map { values } => values
                .iter()
                .map(|(v, l)| (v.clone(), l.clone()))
                .collect(),
            OptionSource::Entity { .. } => Vec::new(),
            OptionSource::YesNo => pairs([("1", "Yes"), ("0", "No")]),
            OptionSource::TrueFalse => pairs([("true", "True"), ("false", "False")]),
            OptionSource::OneZero => pairs([("1", "1"), ("0", "0")]),
        }
    }

    /// Key under which static choices are listed once in `optionLists`.
    pub fn list_key(&self, entity: &str, column: &str) -> Option<String> {
        match self {
            OptionSource::Map { .. } => Some(format!("{}.{}", entity, column)),
            OptionSource::Entity { .. } => None,
            OptionSource::YesNo => Some("yesNo".to_string()),
            OptionSource::TrueFalse => Some("trueFalse".to_string()),
            OptionSource::OneZero => Some("oneZero".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayElement {
    ReadOnly,
    Text,
    Textarea,
    Number,
    Select,
    Date,
    Time,
    DateTime,
    Json,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub name: String,
    pub canonical_type: CanonicalType,
    pub graphql_type: String,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub referenced_entity: Option<String>,
    pub element: DisplayElement,
    pub filter: bool,
    pub textarea: bool,
    pub backend_handled: bool,
    pub options: Option<OptionSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityConfig {
    pub primary_key: String,
    pub type_name: String,
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfigDocument {
    pub entities: IndexMap<String, EntityConfig>,
    /// Static option lists, each listed once however many fields use it
    pub option_lists: IndexMap<String, IndexMap<String, String>>,
}

fn is_text_family(raw_type: &str) -> bool {
    raw_type.to_lowercase().contains("text")
}

/// `enum('new','paid')` → `{new: "New", paid: "Paid"}`
fn enum_values(raw_type: &str) -> Option<IndexMap<String, String>> {
    if !ENUM_TYPE.is_match(raw_type) {
        return None;
    }
    let values: IndexMap<String, String> = QUOTED
        .captures_iter(raw_type)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            let value = m.as_str().replace("''", "'");
            let label = crate::emit::naming::title_case(&value);
            (value, label)
        })
        .collect();
    (!values.is_empty()).then_some(values)
}

fn boolean_source(raw_type: &str) -> OptionSource {
    let lowered = raw_type.to_lowercase();
    if lowered.starts_with("bool") {
        OptionSource::TrueFalse
    } else if lowered.starts_with("bit") {
        OptionSource::OneZero
    } else {
        OptionSource::YesNo
    }
}

fn option_source(schema: &AnalyzedSchema, column: &AnalyzedColumn) -> Option<OptionSource> {
    if let Some(target) = column.referenced_entity.as_deref().and_then(|t| schema.entity(t)) {
        let label_field = schema
            .roles()
            .display_name_column()
            .filter(|c| target.has_column(c))
            .unwrap_or(&target.primary_key_name)
            .to_string();
        return Some(OptionSource::Entity {
            entity: target.name.clone(),
            value_field: target.primary_key_name.clone(),
            label_field,
        });
    }
    if column.canonical_type == CanonicalType::Boolean {
        return Some(boolean_source(&column.raw_type));
    }
    enum_values(&column.raw_type).map(|values| OptionSource::Map { values })
}

fn element(column: &AnalyzedColumn, writable: bool, textarea: bool, options: bool) -> DisplayElement {
    if !writable {
        return DisplayElement::ReadOnly;
    }
    if options {
        return DisplayElement::Select;
    }
    if textarea {
        return DisplayElement::Textarea;
    }
    match column.canonical_type {
        CanonicalType::Integer | CanonicalType::Float => DisplayElement::Number,
        CanonicalType::Date => DisplayElement::Date,
        CanonicalType::Time => DisplayElement::Time,
        CanonicalType::DateTime => DisplayElement::DateTime,
        CanonicalType::Json => DisplayElement::Json,
        CanonicalType::Binary => DisplayElement::File,
        CanonicalType::Boolean => DisplayElement::Select,
        CanonicalType::String | CanonicalType::Uuid => DisplayElement::Text,
    }
}

fn entity_config(schema: &AnalyzedSchema, analyzed: &AnalyzedEntity, plan: &EntityPlan) -> EntityConfig {
    let backend = schema.backend();

    let fields = plan
        .fields
        .iter()
        .filter_map(|field| analyzed.column(&field.column).map(|c| (field, c)))
        .map(|(field, column)| {
            let textarea = analyzed.textarea_columns.contains(&column.name)
                || (column.canonical_type == CanonicalType::String && is_text_family(&column.raw_type));
            let options = option_source(schema, column);
            let writable = plan.input(&column.name).is_some();
            FieldConfig {
                name: column.name.clone(),
                canonical_type: column.canonical_type,
                graphql_type: field.type_ref.to_string(),
                is_primary_key: column.is_primary_key,
                is_foreign_key: column.is_foreign_key,
                referenced_entity: column.referenced_entity.clone(),
                element: element(column, writable, textarea, options.is_some()),
                filter: analyzed.filters.contains(&column.name),
                textarea,
                backend_handled: backend.is_backend_handled(&column.name),
                options,
            }
        })
        .collect();

    EntityConfig {
        primary_key: analyzed.primary_key_name.clone(),
        type_name: plan.names.type_name.clone(),
        fields,
    }
}

/// Adds the static choices of `config` to the accumulated lists.
fn collect_option_lists(
    mut lists: IndexMap<String, IndexMap<String, String>>,
    entity: &str,
    config: &FieldConfig,
) -> IndexMap<String, IndexMap<String, String>> {
    if let Some(source) = &config.options {
        if let Some(key) = source.list_key(entity, &config.name) {
            lists
                .entry(key)
                .or_insert_with(|| source.choices().into_iter().collect());
        }
    }
    lists
}

pub fn build(schema: &AnalyzedSchema, plan: &EmissionPlan) -> FieldConfigDocument {
    let mut entities = IndexMap::new();
    for entity in &plan.entities {
        if let Some(analyzed) = schema.entity(&entity.entity) {
            entities.insert(entity.entity.clone(), entity_config(schema, analyzed, entity));
        }
    }

    let option_lists = entities.iter().fold(IndexMap::new(), |lists, (name, config)| {
        config
            .fields
            .iter()
            .fold(lists, |lists, field| collect_option_lists(lists, name, field))
    });

    FieldConfigDocument {
        entities,
        option_lists,
    }
}

pub fn render(schema: &AnalyzedSchema, plan: &EmissionPlan) -> Result<String> {
    let mut text = serde_json::to_string_pretty(&build(schema, plan))?;
    text.push('\n');
    Ok(text)
}

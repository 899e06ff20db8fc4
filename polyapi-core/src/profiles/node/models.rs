use crate::analyzer::{AnalyzedColumn, AnalyzedSchema};
use crate::ast::PrimaryKeyStrategy;
use crate::emit::escape::js_string;
use crate::emit::{SourceFile, Stmt, TypeRegistry};
use crate::error::Result;
use crate::plan::EmissionPlan;
use crate::types::CanonicalType;

fn data_type(column: &AnalyzedColumn) -> &'static str {
    match column.canonical_type {
        CanonicalType::String if column.raw_type.to_lowercase().contains("text") => "DataTypes.TEXT",
        CanonicalType::String => "DataTypes.STRING",
        CanonicalType::Integer => "DataTypes.INTEGER",
        CanonicalType::Float => "DataTypes.DOUBLE",
        CanonicalType::Boolean => "DataTypes.BOOLEAN",
        CanonicalType::Date => "DataTypes.DATEONLY",
        CanonicalType::Time => "DataTypes.TIME",
        CanonicalType::DateTime => "DataTypes.DATE",
        CanonicalType::Binary => "DataTypes.BLOB",
        CanonicalType::Json => "DataTypes.JSON",
        CanonicalType::Uuid => "DataTypes.UUID",
    }
}

fn attribute(column: &AnalyzedColumn) -> Stmt {
    let mut spec = format!("type: {}", data_type(column));
    if column.is_primary_key {
        spec.push_str(", primaryKey: true");
        let generated = column.primary_key_strategy == Some(PrimaryKeyStrategy::DatabaseDefault);
        if generated && column.canonical_type == CanonicalType::Integer {
            spec.push_str(", autoIncrement: true");
        }
    }
    Stmt::line(format!("{}: {{ {} }},", js_string(&column.name), spec))
}

/// `src/models/index.js`. Pass 1 defines every model; pass 2 wires the
/// `belongsTo` associations by looking targets up among the defined models.
pub(super) fn models_file(
    schema: &AnalyzedSchema,
    plan: &EmissionPlan,
    models: &TypeRegistry<String>,
) -> Result<SourceFile> {
    let mut file = SourceFile::new("node/src/models/index.js");
    file.line("'use strict';");
    file.blank();
    file.line("const { DataTypes } = require('sequelize');");
    file.line("const sequelize = require('../db');");

    for entity in &plan.entities {
        let analyzed = schema.require_entity(&entity.entity)?;
        let model = models.resolve(&entity.names.type_name)?;

        file.blank();
        file.push(Stmt::block(
            format!(
                "const {} = sequelize.define({}, {{",
                model,
                js_string(&entity.names.type_name)
            ),
            analyzed.columns.values().map(attribute).collect(),
            format!(
                "}}, {{ tableName: {}, timestamps: false }});",
                js_string(&entity.entity)
            ),
        ));
    }

    let mut associations = Vec::new();
    for entity in &plan.entities {
        let source = models.resolve(&entity.names.type_name)?;
        let target_key = |target: &str| -> Result<String> {
            Ok(schema.require_entity(target)?.primary_key_name.clone())
        };
        for relation in &entity.relations {
            let target = models.resolve(&relation.target_type)?;
            associations.push(Stmt::line(format!(
                "{}.belongsTo({}, {{ as: {}, foreignKey: {}, targetKey: {}, constraints: false }});",
                source,
                target,
                js_string(&relation.field),
                js_string(&relation.column),
                js_string(&target_key(&relation.target_entity)?)
            )));
        }
    }
    if !associations.is_empty() {
        file.blank();
        file.extend(associations);
    }

    let exported: Vec<&str> = models.iter().map(|(_, model)| model.as_str()).collect();
    file.blank();
    file.line(format!("module.exports = {{ sequelize, {} }};", exported.join(", ")));
    Ok(file)
}

use crate::emit::escape::{graphql_description, js_template_body};
use crate::emit::{SourceFile, Stmt, TypeRef, TypeRegistry};
use crate::error::{PolyApiError, Result};
use crate::plan::{page_fields, shared_enums, shared_inputs, ArgPlan, EmissionPlan, RootType};

const TEMPLATE_OPEN: &str = "module.exports = `#graphql\n";
const TEMPLATE_CLOSE: &str = "\n`;";

/// SDL spelling of a reference whose every named type was declared in pass 1.
fn sdl(registry: &TypeRegistry<()>, type_ref: &TypeRef) -> Result<String> {
    registry.resolve(type_ref.base_name())?;
    Ok(type_ref.to_string())
}

fn sdl_arg(registry: &TypeRegistry<()>, arg: &ArgPlan) -> Result<String> {
    let mut text = format!("{}: {}", arg.name, sdl(registry, &arg.type_ref)?);
    if let Some(default) = &arg.default {
        text.push_str(&format!(" = {}", default));
    }
    Ok(text)
}

fn definition(keyword: &str, name: &str, body: Vec<Stmt>) -> [Stmt; 2] {
    [Stmt::block(format!("{} {} {{", keyword, name), body, "}"), Stmt::Blank]
}

/// `src/schema/typeDefs.js`: the whole SDL in one template literal.
pub(super) fn type_defs_file(plan: &EmissionPlan, registry: &TypeRegistry<()>) -> Result<SourceFile> {
    let mut sdl_body = Vec::new();

    for decl in shared_enums() {
        sdl_body.extend(definition(
            "enum",
            decl.name,
            decl.values.iter().map(|v| Stmt::line(*v)).collect(),
        ));
    }

    for decl in shared_inputs() {
        let mut fields = Vec::new();
        for field in &decl.fields {
            fields.push(Stmt::line(sdl_arg(registry, field)?));
        }
        sdl_body.extend(definition("input", decl.name, fields));
    }

    for entity in &plan.entities {
        let name = &entity.names.type_name;
        let mut fields = Vec::new();
        for field in &entity.fields {
            fields.push(Stmt::line(format!("{}: {}", field.column, sdl(registry, &field.type_ref)?)));
        }
        for relation in &entity.relations {
            let type_ref = TypeRef::named(relation.target_type.clone());
            fields.push(Stmt::line(format!("{}: {}", relation.field, sdl(registry, &type_ref)?)));
        }
        if let Some(description) = &entity.description {
            sdl_body.push(Stmt::line("\"\"\""));
            sdl_body.push(Stmt::line(js_template_body(&graphql_description(description))));
            sdl_body.push(Stmt::line("\"\"\""));
        }
        sdl_body.extend(definition("type", name, fields));

        let page = &entity.names.page_type;
        let mut fields = Vec::new();
        for (field, type_ref) in page_fields(name) {
            fields.push(Stmt::line(format!("{}: {}", field, sdl(registry, &type_ref)?)));
        }
        sdl_body.extend(definition("type", page, fields));

        let input = &entity.names.input_type;
        let mut fields = Vec::new();
        for field in &entity.inputs {
            fields.push(Stmt::line(format!("{}: {}", field.column, sdl(registry, &field.type_ref)?)));
        }
        sdl_body.extend(definition("input", input, fields));
    }

    for root in [RootType::Query, RootType::Mutation] {
        let root_name = root.type_name();
        let mut fields = Vec::new();
        for (_, op) in plan.operations(root) {
            let args = op
                .args
                .iter()
                .map(|arg| sdl_arg(registry, arg))
                .collect::<Result<Vec<_>>>()?;
            fields.push(Stmt::line(format!(
                "{}({}): {}",
                op.field,
                args.join(", "),
                sdl(registry, &op.returns)?
            )));
        }
        sdl_body.extend(definition("type", root_name, fields));
    }

    // no trailing blank inside the literal
    if sdl_body.last() == Some(&Stmt::Blank) {
        sdl_body.pop();
    }

    let mut file = SourceFile::new("node/src/schema/typeDefs.js");
    file.line("'use strict';");
    file.blank();
    file.line(TEMPLATE_OPEN.trim_end());
    file.extend(sdl_body);
    file.line(TEMPLATE_CLOSE.trim_start());
    Ok(file)
}

/// The SDL inside a rendered `typeDefs.js` template literal.
pub(super) fn sdl_text(type_defs: &str) -> Result<&str> {
    let missing = || PolyApiError::MalformedSdl {
        line: 0,
        message: "typeDefs.js holds no #graphql template literal".to_string(),
    };
    let start = type_defs.find(TEMPLATE_OPEN).ok_or_else(missing)? + TEMPLATE_OPEN.len();
    let end = type_defs.rfind(TEMPLATE_CLOSE).ok_or_else(missing)?;
    type_defs.get(start..end).ok_or_else(missing)
}

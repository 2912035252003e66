//! Go emitter: `type X struct` with struct tags.
//!
//! Documented defaults where the config asks for something Go cannot say:
//! every `optional_repr` variant renders as a pointer (slices and
//! `interface{}` already carry their own null), and `visibility: default`
//! is a no-op because Go spells visibility through the identifier itself.

use std::fmt::Write;

use crate::config::{GenerationConfig, Language, TagSet};
use crate::emit::{EmitCtx, Emitter};
use crate::ir::{FieldDef, InferredType, PrimitiveKind, StructDef};
use crate::resolve::type_name_from;

pub struct GoEmitter;

impl Emitter for GoEmitter {
    fn language(&self) -> Language {
        Language::Go
    }

    fn file_header(&self, out: &mut String, root: &InferredType, ctx: &EmitCtx) {
        let _ = writeln!(out, "package {}", ctx.config.package_name);
        out.push('\n');
        if ctx.uses_time(root) {
            out.push_str("import \"time\"\n\n");
        }
    }

    fn struct_open(&self, out: &mut String, def: &StructDef, ctx: &EmitCtx) {
        if ctx.config.include_comments {
            let _ = writeln!(out, "// {} is generated from JSON samples.", def.name);
        }
        let _ = writeln!(out, "type {} struct {{", def.name);
    }

    fn field(&self, out: &mut String, _def: &StructDef, field: &FieldDef, ctx: &EmitCtx) {
        let (base, saw_null) = field.ty.unwrap_optional();
        let mut ty = self.type_name(base, ctx);
        // slices and interface{} are already nilable
        if (saw_null || !field.required) && !(ty.starts_with("[]") || ty == "interface{}") {
            ty = format!("*{ty}");
        }
        let tags = struct_tags(field, ctx.config);
        if tags.is_empty() {
            let _ = writeln!(out, "\t{} {}", field.ident, ty);
        } else {
            let _ = writeln!(out, "\t{} {} `{}`", field.ident, ty, tags);
        }
    }

    fn struct_close(&self, out: &mut String, _def: &StructDef, _ctx: &EmitCtx) {
        out.push_str("}\n\n");
    }

    fn type_name(&self, ty: &InferredType, ctx: &EmitCtx) -> String {
        match ty {
            InferredType::Primitive(PrimitiveKind::Bool) => "bool".to_string(),
            InferredType::Primitive(PrimitiveKind::Int) => "int64".to_string(),
            InferredType::Primitive(PrimitiveKind::Float) => "float64".to_string(),
            InferredType::Primitive(PrimitiveKind::Str) => "string".to_string(),
            InferredType::Primitive(PrimitiveKind::Null) | InferredType::Unknown => {
                "interface{}".to_string()
            }
            InferredType::Time => "time.Time".to_string(),
            InferredType::ArrayOf(elem) => format!("[]{}", self.type_name(elem, ctx)),
            InferredType::StructRef(id) => ctx.registry.get(*id).name.clone(),
            InferredType::Optional(inner) => {
                let inner = self.type_name(inner, ctx);
                // slices and interface{} are already nilable
                if inner.starts_with("[]") || inner == "interface{}" {
                    inner
                } else {
                    format!("*{inner}")
                }
            }
        }
    }

    fn root_alias(&self, out: &mut String, root: &InferredType, ctx: &EmitCtx) {
        let name = type_name_from(&ctx.root_name);
        if ctx.config.include_comments {
            let _ = writeln!(out, "// {name} is the top-level shape of the samples.");
        }
        let _ = writeln!(out, "type {name} = {}", self.type_name(root, ctx));
    }
}

fn struct_tags(field: &FieldDef, config: &GenerationConfig) -> String {
    let optional = !field.required || matches!(field.ty, InferredType::Optional(_));
    let key = &field.source_key;
    let mut parts: Vec<String> = Vec::new();
    for tag in &config.tag_sets {
        let part = match tag {
            TagSet::Json | TagSet::Yaml => {
                format!("{}:\"{key}{}\"", tag.key(), if optional { ",omitempty" } else { "" })
            }
            TagSet::Gorm => format!("{}:\"column:{key}\"", tag.key()),
            TagSet::Validate => format!(
                "{}:\"{}\"",
                tag.key(),
                if field.required { "required" } else { "omitempty" }
            ),
            TagSet::Mapstructure | TagSet::Bson | TagSet::Xml | TagSet::Form => {
                format!("{}:\"{key}\"", tag.key())
            }
        };
        parts.push(part);
    }
    parts.join(" ")
}

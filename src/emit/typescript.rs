//! TypeScript emitter: interfaces with `?` for possibly-absent fields and
//! `| null` for observed nulls (those are different facts and TypeScript can
//! spell both).
//!
//! Documented defaults: `optional_repr` variants other than
//! `nullable_union` degrade to `| null`; tag sets do not apply and are
//! ignored; `time_repr: native_temporal` renders `Date`.

use std::fmt::Write;

use crate::config::{Language, Visibility};
use crate::emit::{EmitCtx, Emitter};
use crate::ir::{FieldDef, InferredType, PrimitiveKind, StructDef};
use crate::resolve::type_name_from;

pub struct TypescriptEmitter;

impl TypescriptEmitter {
    fn export_kw(ctx: &EmitCtx) -> &'static str {
        match ctx.config.visibility {
            Visibility::Public => "export ",
            Visibility::Default => "",
        }
    }
}

impl Emitter for TypescriptEmitter {
    fn language(&self) -> Language {
        Language::Typescript
    }

    fn file_header(&self, _out: &mut String, _root: &InferredType, _ctx: &EmitCtx) {
        // no imports needed
    }

    fn struct_open(&self, out: &mut String, def: &StructDef, ctx: &EmitCtx) {
        if ctx.config.include_comments {
            let _ = writeln!(out, "/** {} is generated from JSON samples. */", def.name);
        }
        let _ = writeln!(out, "{}interface {} {{", Self::export_kw(ctx), def.name);
    }

    fn field(&self, out: &mut String, _def: &StructDef, field: &FieldDef, ctx: &EmitCtx) {
        let marker = if field.required { "" } else { "?" };
        let _ = writeln!(
            out,
            "  {}{}: {};",
            field.ident,
            marker,
            self.type_name(&field.ty, ctx)
        );
    }

    fn struct_close(&self, out: &mut String, _def: &StructDef, _ctx: &EmitCtx) {
        out.push_str("}\n\n");
    }

    fn type_name(&self, ty: &InferredType, ctx: &EmitCtx) -> String {
        match ty {
            InferredType::Primitive(PrimitiveKind::Bool) => "boolean".to_string(),
            InferredType::Primitive(PrimitiveKind::Int | PrimitiveKind::Float) => {
                "number".to_string()
            }
            InferredType::Primitive(PrimitiveKind::Str) => "string".to_string(),
            InferredType::Primitive(PrimitiveKind::Null) => "null".to_string(),
            InferredType::Unknown => "unknown".to_string(),
            InferredType::Time => match ctx.config.time_repr {
                crate::config::TimeRepr::NativeTemporal => "Date".to_string(),
                crate::config::TimeRepr::String => "string".to_string(),
            },
            InferredType::ArrayOf(elem) => {
                let elem = self.type_name(elem, ctx);
                if elem.contains(' ') {
                    format!("Array<{elem}>")
                } else {
                    format!("{elem}[]")
                }
            }
            InferredType::StructRef(id) => ctx.registry.get(*id).name.clone(),
            InferredType::Optional(inner) => {
                format!("{} | null", self.type_name(inner, ctx))
            }
        }
    }

    fn root_alias(&self, out: &mut String, root: &InferredType, ctx: &EmitCtx) {
        let name = type_name_from(&ctx.root_name);
        let _ = writeln!(
            out,
            "{}type {} = {};",
            Self::export_kw(ctx),
            name,
            self.type_name(root, ctx)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::infer::infer;
    use crate::parse::parse;
    use crate::resolve::resolve;

    fn render_with(texts: &[&str], root_name: &str, cfg: &GenerationConfig) -> String {
        let samples: Vec<_> = texts.iter().map(|t| parse(t).unwrap().root).collect();
        let inferred = infer(&samples);
        let resolved = resolve(&inferred.root, root_name, Language::Typescript, cfg).unwrap();
        crate::emit::emit(
            &resolved.root,
            root_name,
            &resolved.registry,
            cfg,
            Language::Typescript,
        )
    }

    fn render(texts: &[&str], root_name: &str) -> String {
        render_with(texts, root_name, &GenerationConfig::default())
    }

    #[test]
    fn interface_shape_matches_the_service_output() {
        let out = render(
            &[r#"{"id": 1, "name": "a", "isActive": true}"#],
            "User",
        );
        assert!(out.contains("export interface User {"));
        assert!(out.contains("  id: number;"));
        assert!(out.contains("  name: string;"));
        assert!(out.contains("  isActive: boolean;"));
    }

    #[test]
    fn absent_vs_null_are_spelled_differently() {
        // absent in one sample, never null → `?` only
        let out = render(&[r#"{"a": 1}"#, r#"{}"#], "Root");
        assert!(out.contains("  a?: number;"), "{out}");
        assert!(!out.contains("| null"));
        // present but null once → no `?`, nullable union
        let out = render(&[r#"{"a": 1}"#, r#"{"a": null}"#], "Root");
        assert!(out.contains("  a: number | null;"), "{out}");
        assert!(!out.contains("a?:"));
        // both facts at once → both spellings
        let out = render(&[r#"{"a": 1}"#, r#"{"a": null}"#, r#"{}"#], "Root");
        assert!(out.contains("  a?: number | null;"), "{out}");
    }

    #[test]
    fn union_elements_use_generic_array_syntax() {
        let out = render(&[r#"[[1, null]]"#], "Grid");
        assert!(out.contains("Array<number | null>"), "{out}");
    }

    #[test]
    fn default_visibility_drops_export() {
        let cfg = GenerationConfig {
            visibility: crate::config::Visibility::Default,
            ..GenerationConfig::default()
        };
        let out = render_with(&[r#"{"a": 1}"#], "Root", &cfg);
        assert!(out.contains("\ninterface Root {") || out.starts_with("interface Root {"));
        assert!(!out.contains("export"));
    }

    #[test]
    fn root_array_alias() {
        let out = render(&[r#"[{"x": 1}]"#], "Users");
        assert!(out.contains("export interface UsersItem {"));
        assert!(out.contains("export type Users = UsersItem[];"));
    }

    #[test]
    fn unknown_is_unknown_not_any() {
        let out = render(&[r#"{"v": 1}"#, r#"{"v": "s"}"#], "Root");
        assert!(out.contains("  v: unknown;"), "{out}");
    }

    #[test]
    fn time_defaults_to_date() {
        let out = render(&[r#"{"at": "2025-12-21T23:49:00Z"}"#], "Event");
        assert!(out.contains("  at: Date;"), "{out}");
    }
}

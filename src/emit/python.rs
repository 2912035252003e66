//! Python emitter: `@dataclass` definitions with `typing` annotations.
//!
//! Documented defaults: tag sets and visibility do not apply; optionals are
//! always `Optional[T]` (which is also what `wrapper_type` asks for). No
//! `= None` defaults are added so the sample's declared field order is kept
//! without tripping the dataclass default-ordering rule. Classes come out
//! children-first, so every reference is already defined.

use std::fmt::Write;

use crate::config::Language;
use crate::emit::{EmitCtx, Emitter};
use crate::ir::{FieldDef, InferredType, PrimitiveKind, StructDef};
use crate::resolve::type_name_from;

pub struct PythonEmitter;

impl Emitter for PythonEmitter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn file_header(&self, out: &mut String, root: &InferredType, ctx: &EmitCtx) {
        out.push_str("from __future__ import annotations\n\n");
        out.push_str("from dataclasses import dataclass\n");
        if ctx.uses_time(root) {
            out.push_str("from datetime import datetime\n");
        }
        let mut typing: Vec<&str> = Vec::new();
        if ctx.mentions(root, &|t| matches!(t, InferredType::Unknown)) {
            typing.push("Any");
        }
        if ctx.uses_array(root) {
            typing.push("List");
        }
        if ctx.has_optional_fields(root) {
            typing.push("Optional");
        }
        if !typing.is_empty() {
            let _ = writeln!(out, "from typing import {}", typing.join(", "));
        }
        out.push_str("\n\n");
    }

    fn struct_open(&self, out: &mut String, def: &StructDef, ctx: &EmitCtx) {
        out.push_str("@dataclass\n");
        let _ = writeln!(out, "class {}:", def.name);
        if ctx.config.include_comments {
            let _ = writeln!(out, "    \"\"\"{} is generated from JSON samples.\"\"\"\n", def.name);
        }
    }

    fn field(&self, out: &mut String, _def: &StructDef, field: &FieldDef, ctx: &EmitCtx) {
        let (base, saw_null) = field.ty.unwrap_optional();
        let mut ty = self.type_name(base, ctx);
        if saw_null || !field.required {
            ty = format!("Optional[{ty}]");
        }
        if ctx.config.include_comments && field.ident != field.source_key {
            let _ = writeln!(out, "    {}: {}  # key: \"{}\"", field.ident, ty, field.source_key);
        } else {
            let _ = writeln!(out, "    {}: {}", field.ident, ty);
        }
    }

    fn struct_close(&self, out: &mut String, def: &StructDef, ctx: &EmitCtx) {
        if def.fields.is_empty() && !ctx.config.include_comments {
            out.push_str("    pass\n");
        }
        out.push_str("\n\n");
    }

    fn type_name(&self, ty: &InferredType, ctx: &EmitCtx) -> String {
        match ty {
            InferredType::Primitive(PrimitiveKind::Bool) => "bool".to_string(),
            InferredType::Primitive(PrimitiveKind::Int) => "int".to_string(),
            InferredType::Primitive(PrimitiveKind::Float) => "float".to_string(),
            InferredType::Primitive(PrimitiveKind::Str) => "str".to_string(),
            InferredType::Primitive(PrimitiveKind::Null) => "None".to_string(),
            InferredType::Unknown => "Any".to_string(),
            InferredType::Time => "datetime".to_string(),
            InferredType::ArrayOf(elem) => format!("List[{}]", self.type_name(elem, ctx)),
            InferredType::StructRef(id) => ctx.registry.get(*id).name.clone(),
            InferredType::Optional(inner) => {
                format!("Optional[{}]", self.type_name(inner, ctx))
            }
        }
    }

    fn root_alias(&self, out: &mut String, root: &InferredType, ctx: &EmitCtx) {
        let _ = writeln!(
            out,
            "{} = {}",
            type_name_from(&ctx.root_name),
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
        let resolved = resolve(&inferred.root, root_name, Language::Python, cfg).unwrap();
        crate::emit::emit(
            &resolved.root,
            root_name,
            &resolved.registry,
            cfg,
            Language::Python,
        )
    }

    fn render(texts: &[&str], root_name: &str) -> String {
        render_with(texts, root_name, &GenerationConfig::default())
    }

    #[test]
    fn dataclass_shape_matches_the_service_output() {
        let out = render(
            &[r#"{"id": 1, "name": "a", "is_active": true}"#],
            "User",
        );
        assert!(out.starts_with("from __future__ import annotations\n"));
        assert!(out.contains("from dataclasses import dataclass\n"));
        assert!(out.contains("@dataclass\nclass User:"));
        assert!(out.contains("    id: int\n"));
        assert!(out.contains("    name: str\n"));
        assert!(out.contains("    is_active: bool\n"));
    }

    #[test]
    fn typing_imports_track_usage() {
        let out = render(&[r#"{"xs": [1]}"#, r#"{}"#], "Root");
        assert!(out.contains("from typing import List, Optional\n"), "{out}");
        assert!(out.contains("    xs: Optional[List[int]]"));

        let out = render(&[r#"{"a": 1}"#], "Root");
        assert!(!out.contains("from typing import"));
    }

    #[test]
    fn camel_keys_get_snake_idents_with_source_comment() {
        let out = render(&[r#"{"createdAt": "x"}"#], "Root");
        assert!(out.contains("    created_at: str  # key: \"createdAt\""), "{out}");
    }

    #[test]
    fn nested_classes_come_out_children_first() {
        let out = render(&[r#"{"address": {"street": "s"}}"#], "User");
        let child = out.find("class UserAddress:").expect("child class");
        let parent = out.find("class User:").expect("root class");
        assert!(child < parent, "referenced class must be defined first");
        assert!(out.contains("    address: UserAddress"));
    }

    #[test]
    fn conflicting_evidence_becomes_any() {
        let out = render(&[r#"{"v": 1}"#, r#"{"v": "s"}"#], "Root");
        assert!(out.contains("from typing import Any\n"));
        assert!(out.contains("    v: Any"));
    }

    #[test]
    fn time_fields_use_datetime() {
        let out = render(&[r#"{"at": "2025-12-21T23:49:00Z"}"#], "Event");
        assert!(out.contains("from datetime import datetime\n"));
        assert!(out.contains("    at: datetime"));
    }

    #[test]
    fn empty_object_still_renders_a_class_body() {
        let cfg = GenerationConfig { include_comments: false, ..GenerationConfig::default() };
        let out = render_with(&[r#"{}"#], "Empty", &cfg);
        assert!(out.contains("class Empty:\n    pass"), "{out}");
    }

    #[test]
    fn root_list_gets_a_module_level_alias() {
        let out = render(&[r#"[{"x": 1}]"#], "Users");
        assert!(out.contains("class UsersItem:"));
        assert!(out.contains("Users = List[UsersItem]"));
    }
}

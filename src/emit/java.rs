//! Java emitter: Lombok `@Data` beans with Jackson property annotations,
//! the style the original service produced.
//!
//! Everything lands in one compilation unit, so only the root class carries
//! `public` (when visibility asks for it); helper classes stay
//! package-private. Documented defaults: optionals stay plain boxed
//! references unless `optional_repr: wrapper_type` asks for
//! `java.util.Optional`; `pointer` and `nullable_union` degrade to the
//! boxed default. Tag sets other than `json` are ignored.

use std::fmt::Write;

use crate::config::{Language, OptionalRepr, TagSet};
use crate::emit::{EmitCtx, Emitter};
use crate::ir::{FieldDef, InferredType, PrimitiveKind, StructDef};
use crate::resolve::type_name_from;

pub struct JavaEmitter;

impl JavaEmitter {
    fn wants_optional_wrapper(ctx: &EmitCtx) -> bool {
        ctx.config.optional_repr == Some(OptionalRepr::WrapperType)
    }

    fn wants_json_property(ctx: &EmitCtx) -> bool {
        ctx.config.tag_sets.contains(&TagSet::Json)
    }
}

impl Emitter for JavaEmitter {
    fn language(&self) -> Language {
        Language::Java
    }

    fn file_header(&self, out: &mut String, root: &InferredType, ctx: &EmitCtx) {
        if Self::wants_json_property(ctx) {
            out.push_str("import com.fasterxml.jackson.annotation.JsonProperty;\n");
        }
        out.push_str("import lombok.Data;\n");
        if ctx.uses_time(root) {
            out.push_str("import java.time.OffsetDateTime;\n");
        }
        if ctx.uses_array(root) {
            out.push_str("import java.util.List;\n");
        }
        if Self::wants_optional_wrapper(ctx) && ctx.has_optional_fields(root) {
            out.push_str("import java.util.Optional;\n");
        }
        out.push('\n');
    }

    fn struct_open(&self, out: &mut String, def: &StructDef, ctx: &EmitCtx) {
        if ctx.config.include_comments {
            let _ = writeln!(out, "/** {} is generated from JSON samples. */", def.name);
        }
        out.push_str("@Data\n");
        let is_root = ctx
            .root_struct
            .map(|id| ctx.registry.get(id).name == def.name)
            .unwrap_or(false);
        let public = is_root && ctx.config.visibility == crate::config::Visibility::Public;
        let _ = writeln!(
            out,
            "{}class {} {{",
            if public { "public " } else { "" },
            def.name
        );
    }

    fn field(&self, out: &mut String, _def: &StructDef, field: &FieldDef, ctx: &EmitCtx) {
        if Self::wants_json_property(ctx) {
            let _ = writeln!(out, "    @JsonProperty(\"{}\")", field.source_key);
        }
        let (base, saw_null) = field.ty.unwrap_optional();
        let mut ty = self.type_name(base, ctx);
        if (saw_null || !field.required) && Self::wants_optional_wrapper(ctx) {
            ty = format!("Optional<{ty}>");
        }
        let _ = writeln!(out, "    private {} {};", ty, field.ident);
    }

    fn struct_close(&self, out: &mut String, _def: &StructDef, _ctx: &EmitCtx) {
        out.push_str("}\n\n");
    }

    fn type_name(&self, ty: &InferredType, ctx: &EmitCtx) -> String {
        match ty {
            InferredType::Primitive(PrimitiveKind::Bool) => "Boolean".to_string(),
            InferredType::Primitive(PrimitiveKind::Int) => "Long".to_string(),
            InferredType::Primitive(PrimitiveKind::Float) => "Double".to_string(),
            InferredType::Primitive(PrimitiveKind::Str) => "String".to_string(),
            InferredType::Primitive(PrimitiveKind::Null) | InferredType::Unknown => {
                "Object".to_string()
            }
            InferredType::Time => "OffsetDateTime".to_string(),
            InferredType::ArrayOf(elem) => format!("List<{}>", self.type_name(elem, ctx)),
            InferredType::StructRef(id) => ctx.registry.get(*id).name.clone(),
            InferredType::Optional(inner) => {
                let inner = self.type_name(inner, ctx);
                if Self::wants_optional_wrapper(ctx) {
                    format!("Optional<{inner}>")
                } else {
                    // boxed references are nullable already
                    inner
                }
            }
        }
    }

    fn root_alias(&self, out: &mut String, root: &InferredType, ctx: &EmitCtx) {
        // Java has no type aliases; leave a note instead of invalid code.
        let _ = writeln!(
            out,
            "// root \"{}\": {}",
            type_name_from(&ctx.root_name),
            self.type_name(root, ctx)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerationConfig, Visibility};
    use crate::infer::infer;
    use crate::parse::parse;
    use crate::resolve::resolve;

    fn render_with(texts: &[&str], root_name: &str, cfg: &GenerationConfig) -> String {
        let samples: Vec<_> = texts.iter().map(|t| parse(t).unwrap().root).collect();
        let inferred = infer(&samples);
        let resolved = resolve(&inferred.root, root_name, Language::Java, cfg).unwrap();
        crate::emit::emit(&resolved.root, root_name, &resolved.registry, cfg, Language::Java)
    }

    fn render(texts: &[&str], root_name: &str) -> String {
        render_with(texts, root_name, &GenerationConfig::default())
    }

    #[test]
    fn lombok_jackson_shape_matches_the_service_output() {
        let out = render(&[r#"{"id": 1, "name": "a", "email": "x@y"}"#], "User");
        assert!(out.contains("import com.fasterxml.jackson.annotation.JsonProperty;"));
        assert!(out.contains("import lombok.Data;"));
        assert!(out.contains("@Data\npublic class User {"));
        assert!(out.contains("    @JsonProperty(\"id\")\n    private Long id;"));
        assert!(out.contains("private String name;"));
    }

    #[test]
    fn only_the_root_class_is_public() {
        let out = render(&[r#"{"address": {"street": "s"}}"#], "User");
        assert!(out.contains("public class User {"));
        assert!(out.contains("\nclass UserAddress {"));
        assert_eq!(out.matches("public class").count(), 1);
    }

    #[test]
    fn default_visibility_drops_public() {
        let cfg = GenerationConfig {
            visibility: Visibility::Default,
            ..GenerationConfig::default()
        };
        let out = render_with(&[r#"{"a": 1}"#], "Root", &cfg);
        assert!(!out.contains("public class"));
    }

    #[test]
    fn arrays_and_time_pull_imports() {
        let out = render(
            &[r#"{"tags": ["a"], "at": "2025-12-21T23:49:00Z"}"#],
            "Event",
        );
        assert!(out.contains("import java.util.List;"));
        assert!(out.contains("import java.time.OffsetDateTime;"));
        assert!(out.contains("private List<String> tags;"));
        assert!(out.contains("private OffsetDateTime at;"));
    }

    #[test]
    fn wrapper_type_opt_in_uses_java_optional() {
        let cfg = GenerationConfig {
            optional_repr: Some(crate::config::OptionalRepr::WrapperType),
            ..GenerationConfig::default()
        };
        let out = render_with(&[r#"{"a": 1}"#, r#"{}"#], "Root", &cfg);
        assert!(out.contains("import java.util.Optional;"));
        assert!(out.contains("private Optional<Long> a;"), "{out}");
        // default: plain boxed reference
        let out = render(&[r#"{"a": 1}"#, r#"{}"#], "Root");
        assert!(out.contains("private Long a;"), "{out}");
    }

    #[test]
    fn no_json_tag_set_drops_jackson() {
        let cfg = GenerationConfig { tag_sets: Vec::new(), ..GenerationConfig::default() };
        let out = render_with(&[r#"{"a": 1}"#], "Root", &cfg);
        assert!(!out.contains("JsonProperty"));
    }

    #[test]
    fn reserved_java_words_are_suffixed() {
        let out = render(&[r#"{"class": 1, "int": 2}"#], "Root");
        assert!(out.contains("private Long class_;"), "{out}");
        assert!(out.contains("private Long int_;"), "{out}");
    }
}

//! Struct deduplication and identifier resolution.
//!
//! Lowers the inferred `Shape` tree into the typed IR in three passes:
//! 1. post-order lowering — children are interned before their parents, so
//!    structural signatures are complete when computed and the registry's
//!    insertion order is already a dependency order for emission;
//! 2. breadth-first naming — the shallowest path at which a shape first
//!    occurred decides its canonical name, deeper recurrences just reference
//!    it;
//! 3. per-struct field identifiers — casing transform, reserved-word suffix,
//!    sibling disambiguation in first-seen order.

use std::collections::{HashSet, VecDeque};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::config::{GenerationConfig, Language, NamingCase, TimeRepr};
use crate::infer::Shape;
use crate::ir::{
    FieldDef, InferredType, PrimitiveKind, Signature, StructDef, StructId, StructRegistry,
};

// ------------------------------- Policy ------------------------------------ //

/// Disambiguation attempts before giving up; hitting this means pathological
/// input (thousands of keys collapsing to one identifier).
const MAX_DISAMBIGUATION: usize = 1000;

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

pub fn is_valid_identifier(s: &str) -> bool {
    IDENT_RE.is_match(s)
}

/// Keywords per target language that an identifier must not collide with.
fn reserved_words(language: Language) -> &'static [&'static str] {
    match language {
        Language::Go => &[
            "break", "case", "chan", "const", "continue", "default", "defer", "else",
            "fallthrough", "for", "func", "go", "goto", "if", "import", "interface", "map",
            "package", "range", "return", "select", "struct", "switch", "type", "var",
        ],
        Language::Java => &[
            "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
            "const", "continue", "default", "do", "double", "else", "enum", "extends", "final",
            "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
            "interface", "long", "native", "new", "package", "private", "protected", "public",
            "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this",
            "throw", "throws", "transient", "try", "void", "volatile", "while",
        ],
        Language::Typescript => &[
            "break", "case", "catch", "class", "const", "continue", "debugger", "default",
            "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for",
            "function", "if", "import", "in", "instanceof", "new", "null", "return", "super",
            "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with",
        ],
        Language::Python => &[
            "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
            "continue", "def", "del", "elif", "else", "except", "finally", "for", "from",
            "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass",
            "raise", "return", "try", "while", "with", "yield",
        ],
    }
}

/// Common initialisms upper-cased in Go's exported style (`id` → `ID`),
/// matching what the original service's sample output did.
const GO_INITIALISMS: &[&str] = &[
    "api", "http", "https", "id", "ip", "json", "sql", "uid", "uri", "url", "uuid", "xml",
];

// ------------------------------- Errors ------------------------------------ //

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(
        "could not derive a unique identifier from `{base}` after {MAX_DISAMBIGUATION} attempts"
    )]
    ReservedIdentifierExhausted { base: String },
}

// ------------------------------- Entry ------------------------------------- //

#[derive(Debug)]
pub struct Resolved {
    pub root: InferredType,
    pub registry: StructRegistry,
    pub warnings: Vec<String>,
}

/// Lower a shape tree to the typed IR with a fully named, deduplicated
/// struct registry.
pub fn resolve(
    root: &Shape,
    root_name: &str,
    language: Language,
    config: &GenerationConfig,
) -> Result<Resolved, ResolveError> {
    let mut r = Resolver {
        language,
        config,
        registry: StructRegistry::new(),
        warnings: Vec::new(),
    };
    let root_ty = r.lower(root);
    r.assign_struct_names(&root_ty, root_name)?;
    r.assign_field_idents()?;
    Ok(Resolved {
        root: root_ty,
        registry: r.registry,
        warnings: r.warnings,
    })
}

struct Resolver<'a> {
    language: Language,
    config: &'a GenerationConfig,
    registry: StructRegistry,
    warnings: Vec<String>,
}

impl Resolver<'_> {
    // ---- pass 1: lowering + interning (post-order) ----

    fn lower(&mut self, shape: &Shape) -> InferredType {
        match shape {
            Shape::Unknown | Shape::Any => InferredType::Unknown,
            Shape::Null => InferredType::Primitive(PrimitiveKind::Null),
            Shape::Bool => InferredType::Primitive(PrimitiveKind::Bool),
            Shape::Int => InferredType::Primitive(PrimitiveKind::Int),
            Shape::Float => InferredType::Primitive(PrimitiveKind::Float),
            Shape::Str { all_rfc3339 } => {
                if *all_rfc3339 && self.config.time_repr == TimeRepr::NativeTemporal {
                    InferredType::Time
                } else {
                    InferredType::Primitive(PrimitiveKind::Str)
                }
            }
            Shape::Array(elem) => InferredType::ArrayOf(Box::new(self.lower(elem))),
            Shape::Optional(inner) => InferredType::Optional(Box::new(self.lower(inner))),
            Shape::Object(obj) => {
                let mut fields = Vec::with_capacity(obj.fields.len());
                for (key, f) in &obj.fields {
                    let ty = self.lower(&f.shape);
                    // `Optional` in the type records null evidence; absence
                    // is a separate fact carried by `required`
                    let required = f.present_in == obj.seen;
                    fields.push(FieldDef {
                        source_key: key.clone(),
                        ident: String::new(),
                        ty,
                        required,
                    });
                }
                let sig = Signature::new(
                    fields
                        .iter()
                        .map(|f| (f.source_key.clone(), f.ty.clone(), f.required))
                        .collect(),
                );
                let def = StructDef { name: String::new(), fields };
                let (id, _fresh) = self.registry.intern(sig, def);
                InferredType::StructRef(id)
            }
        }
    }

    // ---- pass 2: canonical struct names (breadth-first, shallowest wins) ----

    fn assign_struct_names(
        &mut self,
        root: &InferredType,
        root_name: &str,
    ) -> Result<(), ResolveError> {
        let mut used: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(StructId, String)> = VecDeque::new();

        let root_base = type_name_from(root_name);
        if let Some(id) = struct_ref_of(root) {
            // a root wrapped in an array/optional keeps the caller's name
            // free for the alias the emitters render
            let proposed = if matches!(root, InferredType::StructRef(_)) {
                root_base
            } else {
                format!("{root_base}Item")
            };
            queue.push_back((id, proposed));
        }

        while let Some((id, proposed)) = queue.pop_front() {
            if !self.registry.get(id).name.is_empty() {
                // deduplicated shape already named at a shallower path
                continue;
            }
            let name = disambiguate(proposed, &mut used, &[])?;
            self.registry.get_mut(id).name = name.clone();

            let children: Vec<(StructId, String)> = self
                .registry
                .get(id)
                .fields
                .iter()
                .filter_map(|f| {
                    struct_ref_of(&f.ty).map(|cid| {
                        let suffix = {
                            let words = split_words(&f.source_key);
                            if words.is_empty() { "Field".to_string() } else { join_pascal(&words) }
                        };
                        (cid, format!("{name}{suffix}"))
                    })
                })
                .collect();
            queue.extend(children);
        }
        Ok(())
    }

    // ---- pass 3: field identifiers ----

    fn assign_field_idents(&mut self) -> Result<(), ResolveError> {
        let case = self.config.naming_case_for(self.language);
        let reserved = reserved_words(self.language);
        let go_exported = self.language == Language::Go && case == NamingCase::Pascal;

        for id in self.registry.ids().collect::<Vec<_>>() {
            let mut used: HashSet<String> = HashSet::new();
            let struct_name = self.registry.get(id).name.clone();
            for idx in 0..self.registry.get(id).fields.len() {
                let key = self.registry.get(id).fields[idx].source_key.clone();
                let mut words = split_words(&key);
                if words.is_empty() {
                    self.warnings.push(format!(
                        "key {key:?} in struct {struct_name} has no identifier characters; using \"field\""
                    ));
                    words.push("field".to_string());
                }
                if words[0].starts_with(|c: char| c.is_ascii_digit()) {
                    words.insert(0, "field".to_string());
                }
                let mut base = apply_case(&words, case, go_exported);
                if reserved.contains(&base.as_str()) {
                    base.push('_');
                }
                let ident = disambiguate(base, &mut used, reserved)?;
                debug_assert!(is_valid_identifier(&ident));
                self.registry.get_mut(id).fields[idx].ident = ident;
            }
        }
        Ok(())
    }
}

/// Dig through `Optional`/`ArrayOf` wrappers to the struct reference, if any.
fn struct_ref_of(ty: &InferredType) -> Option<StructId> {
    match ty {
        InferredType::StructRef(id) => Some(*id),
        InferredType::Optional(inner) | InferredType::ArrayOf(inner) => struct_ref_of(inner),
        _ => None,
    }
}

fn disambiguate(
    base: String,
    used: &mut HashSet<String>,
    reserved: &[&str],
) -> Result<String, ResolveError> {
    if !used.contains(&base) && !reserved.contains(&base.as_str()) {
        used.insert(base.clone());
        return Ok(base);
    }
    for n in 2..MAX_DISAMBIGUATION {
        let candidate = format!("{base}{n}");
        if !used.contains(&candidate) && !reserved.contains(&candidate.as_str()) {
            used.insert(candidate.clone());
            return Ok(candidate);
        }
    }
    Err(ResolveError::ReservedIdentifierExhausted { base })
}

// ------------------------------ Word casing -------------------------------- //

/// Split a JSON key into identifier words. Non-ASCII-alphanumeric characters
/// separate words and are dropped; camelCase and ACRONYMWord boundaries
/// split too.
pub fn split_words(s: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut cur = String::new();
    let chars: Vec<char> = s.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !cur.is_empty() {
                words.push(std::mem::take(&mut cur));
            }
            continue;
        }
        let prev = if cur.is_empty() { None } else { chars[..i].iter().rev().find(|p| p.is_ascii_alphanumeric()).copied() };
        let next = chars.get(i + 1).copied();
        let boundary = match prev {
            Some(p) => {
                ((p.is_ascii_lowercase() || p.is_ascii_digit()) && c.is_ascii_uppercase())
                    || (p.is_ascii_uppercase()
                        && c.is_ascii_uppercase()
                        && next.is_some_and(|n| n.is_ascii_lowercase()))
            }
            None => false,
        };
        if boundary && !cur.is_empty() {
            words.push(std::mem::take(&mut cur));
        }
        cur.push(c);
    }
    if !cur.is_empty() {
        words.push(cur);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut chars = word.chars();
    if let Some(c) = chars.next() {
        out.push(c.to_ascii_uppercase());
    }
    out.extend(chars.map(|c| c.to_ascii_lowercase()));
    out
}

fn join_pascal(words: &[String]) -> String {
    words.iter().map(|w| capitalize(w)).collect()
}

/// Caller-supplied root name → a usable PascalCase type name.
pub fn type_name_from(raw: &str) -> String {
    let words = split_words(raw);
    if words.is_empty() { "Root".to_string() } else { join_pascal(&words) }
}

fn apply_case(words: &[String], case: NamingCase, go_exported: bool) -> String {
    match case {
        NamingCase::Pascal => words
            .iter()
            .map(|w| {
                if go_exported && GO_INITIALISMS.contains(&w.to_ascii_lowercase().as_str()) {
                    w.to_ascii_uppercase()
                } else {
                    capitalize(w)
                }
            })
            .collect(),
        NamingCase::Camel => {
            let mut out = String::new();
            for (i, w) in words.iter().enumerate() {
                if i == 0 {
                    out.push_str(&w.to_ascii_lowercase());
                } else {
                    out.push_str(&capitalize(w));
                }
            }
            out
        }
        NamingCase::Snake => words
            .iter()
            .map(|w| w.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join("_"),
    }
}

// ------------------------------- Tests ------------------------------------- //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::infer;
    use crate::parse::parse;

    fn resolve_texts(texts: &[&str], root_name: &str, language: Language) -> Resolved {
        let samples: Vec<_> = texts.iter().map(|t| parse(t).unwrap().root).collect();
        let inferred = infer(&samples);
        resolve(&inferred.root, root_name, language, &GenerationConfig::default()).unwrap()
    }

    #[test]
    fn word_splitting() {
        let w = |s: &str| split_words(s).join("|");
        assert_eq!(w("created_at"), "created|at");
        assert_eq!(w("createdAt"), "created|At");
        assert_eq!(w("HTTPServer"), "HTTP|Server");
        assert_eq!(w("user-id"), "user|id");
        assert_eq!(w("__weird__key__"), "weird|key");
        assert_eq!(w("名前"), "");
        assert_eq!(w("v2Count"), "v2|Count");
    }

    #[test]
    fn casing_transforms() {
        let words = split_words("created_at");
        assert_eq!(apply_case(&words, NamingCase::Pascal, false), "CreatedAt");
        assert_eq!(apply_case(&words, NamingCase::Camel, false), "createdAt");
        assert_eq!(apply_case(&words, NamingCase::Snake, false), "created_at");
        // Go initialisms
        let id = split_words("id");
        assert_eq!(apply_case(&id, NamingCase::Pascal, true), "ID");
        let user_id = split_words("user_id");
        assert_eq!(apply_case(&user_id, NamingCase::Pascal, true), "UserID");
    }

    #[test]
    fn identical_shapes_dedupe_to_one_struct() {
        let out = resolve_texts(&[r#"{"a": {"k": 1}, "b": {"k": 1}}"#], "Root", Language::Go);
        // Root plus exactly one nested struct
        assert_eq!(out.registry.len(), 2);
        // shallowest/first-seen path names it
        let names: Vec<&str> = out
            .registry
            .ids()
            .map(|id| out.registry.get(id).name.as_str())
            .collect();
        assert!(names.contains(&"Root"));
        assert!(names.contains(&"RootA"));
    }

    #[test]
    fn distinct_shapes_stay_distinct() {
        let out = resolve_texts(
            &[r#"{"a": {"k": 1}, "b": {"k": "s"}}"#],
            "Root",
            Language::Go,
        );
        assert_eq!(out.registry.len(), 3);
    }

    #[test]
    fn nested_names_concatenate() {
        let out = resolve_texts(&[r#"{"address": {"street": "x"}}"#], "User", Language::Go);
        let names: Vec<&str> = out
            .registry
            .ids()
            .map(|id| out.registry.get(id).name.as_str())
            .collect();
        assert!(names.contains(&"UserAddress"), "{names:?}");
    }

    #[test]
    fn registry_order_is_children_first() {
        let out = resolve_texts(&[r#"{"a": {"b": {"c": 1}}}"#], "Root", Language::Go);
        let names: Vec<&str> = out
            .registry
            .ids()
            .map(|id| out.registry.get(id).name.as_str())
            .collect();
        // interned post-order: innermost first, root last
        assert_eq!(names, ["RootAB", "RootA", "Root"]);
    }

    #[test]
    fn reserved_words_get_suffixed() {
        let out = resolve_texts(&[r#"{"type": 1, "func": 2}"#], "Root", Language::Go);
        let cfg = GenerationConfig {
            naming_case: Some(NamingCase::Snake),
            ..GenerationConfig::default()
        };
        let samples = [parse(r#"{"type": 1, "func": 2}"#).unwrap().root];
        let inferred = infer(&samples);
        let snake = resolve(&inferred.root, "Root", Language::Go, &cfg).unwrap();
        let root = snake.registry.get(snake.registry.ids().last().unwrap());
        let idents: Vec<&str> = root.fields.iter().map(|f| f.ident.as_str()).collect();
        assert_eq!(idents, ["type_", "func_"]);
        // Pascal casing never collides with Go keywords
        let root = out.registry.get(out.registry.ids().last().unwrap());
        let idents: Vec<&str> = root.fields.iter().map(|f| f.ident.as_str()).collect();
        assert_eq!(idents, ["Type", "Func"]);
    }

    #[test]
    fn sibling_collisions_get_numeric_suffixes_first_seen() {
        let out = resolve_texts(&[r#"{"user_id": 1, "userId": 2, "UserID": 3}"#], "Root", Language::Go);
        let root = out.registry.get(out.registry.ids().last().unwrap());
        let idents: Vec<&str> = root.fields.iter().map(|f| f.ident.as_str()).collect();
        assert_eq!(idents, ["UserID", "UserID2", "UserID3"]);
        // every emitted identifier is valid and unique
        let set: HashSet<&&str> = idents.iter().collect();
        assert_eq!(set.len(), idents.len());
        assert!(idents.iter().all(|i| is_valid_identifier(i)));
    }

    #[test]
    fn digit_leading_keys_are_guarded() {
        let out = resolve_texts(&[r#"{"2fa": true}"#], "Root", Language::Go);
        let root = out.registry.get(out.registry.ids().last().unwrap());
        assert_eq!(root.fields[0].ident, "Field2fa");
        assert!(is_valid_identifier(&root.fields[0].ident));
    }

    #[test]
    fn unnameable_key_falls_back_with_warning() {
        let out = resolve_texts(&[r#"{"名前": 1}"#], "Root", Language::Go);
        let root = out.registry.get(out.registry.ids().last().unwrap());
        assert_eq!(root.fields[0].ident, "Field");
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn absence_clears_required_but_leaves_the_type_alone() {
        let out = resolve_texts(&[r#"{"a": 1}"#, r#"{}"#], "Root", Language::Go);
        let root = out.registry.get(out.registry.ids().last().unwrap());
        assert!(!root.fields[0].required);
        assert_eq!(
            root.fields[0].ty,
            InferredType::Primitive(PrimitiveKind::Int)
        );

        // observed null is what puts Optional into the type
        let out = resolve_texts(&[r#"{"a": 1}"#, r#"{"a": null}"#], "Root", Language::Go);
        let root = out.registry.get(out.registry.ids().last().unwrap());
        assert!(root.fields[0].required);
        assert_eq!(
            root.fields[0].ty,
            InferredType::Optional(Box::new(InferredType::Primitive(PrimitiveKind::Int)))
        );
    }

    #[test]
    fn identifier_disambiguation_gives_up_on_pathological_input() {
        // > MAX_DISAMBIGUATION sibling keys that all normalize to `A`
        let mut body = String::from("{");
        for i in 0..1100 {
            if i > 0 {
                body.push(',');
            }
            body.push_str(&format!("\"a{}\": 1", "_".repeat(i)));
        }
        body.push('}');
        let samples = [parse(&body).unwrap().root];
        let inferred = infer(&samples);
        let err = resolve(
            &inferred.root,
            "Root",
            Language::Go,
            &GenerationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ReservedIdentifierExhausted { ref base } if base == "A"
        ));
    }

    #[test]
    fn time_repr_gates_the_time_type() {
        let sample = r#"{"at": "2025-12-21T23:49:00Z"}"#;
        let out = resolve_texts(&[sample], "Root", Language::Go);
        let root = out.registry.get(out.registry.ids().last().unwrap());
        assert_eq!(root.fields[0].ty, InferredType::Time);

        let cfg = GenerationConfig { time_repr: TimeRepr::String, ..GenerationConfig::default() };
        let samples = [parse(sample).unwrap().root];
        let inferred = infer(&samples);
        let as_str = resolve(&inferred.root, "Root", Language::Go, &cfg).unwrap();
        let root = as_str.registry.get(as_str.registry.ids().last().unwrap());
        assert_eq!(root.fields[0].ty, InferredType::Primitive(PrimitiveKind::Str));
    }

    #[test]
    fn root_array_of_objects_leaves_root_name_for_the_alias() {
        let out = resolve_texts(&[r#"[{"x": 1}, {"x": 2}]"#], "User", Language::Go);
        assert_eq!(out.registry.len(), 1);
        let only = out.registry.get(StructId(0));
        assert_eq!(only.name, "UserItem");
        assert!(matches!(out.root, InferredType::ArrayOf(_)));
    }
}

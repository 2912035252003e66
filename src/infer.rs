//! Shape inference over one or more value trees.
//!
//! Each sample is observed into a `Shape` lattice element, then joined into
//! a running accumulator. The join is idempotent and associative, and
//! commutative up to field order; samples are still processed strictly in
//! caller order because declared field order and required flags depend on it.
//!
//! Join laws:
//! - `Unknown` is the identity (empty arrays contribute no evidence).
//! - `Int ⊔ Float = Float` (numeric widening).
//! - `Null ⊔ T = Optional(T)`; `Null ⊔ Null = Null`.
//! - Cross-kind conflicts (e.g. string vs object) join to `Any` with a
//!   per-path warning — a degraded result, never a failure.

use indexmap::IndexMap;

use crate::parse::ValueNode;

// ------------------------------- Shapes ----------------------------------- //

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// No evidence yet.
    Unknown,
    /// Only nulls observed.
    Null,
    Bool,
    Int,
    Float,
    Str {
        /// True while every observed literal parsed as RFC 3339; feeds the
        /// native-temporal time representation downstream.
        all_rfc3339: bool,
    },
    Array(Box<Shape>),
    Object(ObjectShape),
    /// Concrete shape that also saw nulls. Inner is never `Null`, `Unknown`
    /// or `Optional`.
    Optional(Box<Shape>),
    /// Irreconcilable evidence; emitted as the target language's dynamic type.
    Any,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectShape {
    /// First-seen key order: the first sample's order wins, later-only keys
    /// append in the order they appear.
    pub fields: IndexMap<String, FieldShape>,
    /// Objects observed at this path.
    pub seen: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    pub shape: Shape,
    /// Samples (at this path) in which the key was present at all.
    pub present_in: u64,
}

/// Inference output: the joined root shape plus per-path warnings.
#[derive(Debug, Clone)]
pub struct Inferred {
    pub root: Shape,
    pub warnings: Vec<String>,
}

// ------------------------------- Observe ---------------------------------- //

fn observe(warnings: &mut Vec<String>, path: &str, node: &ValueNode) -> Shape {
    match node {
        ValueNode::Null => Shape::Null,
        ValueNode::Bool(_) => Shape::Bool,
        ValueNode::Number { is_integer: true, .. } => Shape::Int,
        ValueNode::Number { is_integer: false, .. } => Shape::Float,
        ValueNode::String(s) => Shape::Str { all_rfc3339: looks_like_rfc3339(s) },
        ValueNode::Array(items) => {
            // single merged element accumulator; [] yields Array(Unknown)
            let elem_path = format!("{path}[]");
            let mut elem = Shape::Unknown;
            for item in items {
                let obs = observe(warnings, &elem_path, item);
                elem = join_at(warnings, &elem_path, elem, obs);
            }
            Shape::Array(Box::new(elem))
        }
        ValueNode::Object(map) => {
            let mut fields = IndexMap::new();
            for (k, v) in map {
                let field_path = format!("{path}.{k}");
                fields.insert(
                    k.clone(),
                    FieldShape {
                        shape: observe(warnings, &field_path, v),
                        present_in: 1,
                    },
                );
            }
            Shape::Object(ObjectShape { fields, seen: 1 })
        }
    }
}

pub fn looks_like_rfc3339(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

// -------------------------------- Join (⊔) --------------------------------- //

fn kind_name(s: &Shape) -> &'static str {
    match s {
        Shape::Unknown => "unknown",
        Shape::Null => "null",
        Shape::Bool => "bool",
        Shape::Int => "integer",
        Shape::Float => "float",
        Shape::Str { .. } => "string",
        Shape::Array(_) => "array",
        Shape::Object(_) => "object",
        Shape::Optional(inner) => kind_name(inner),
        Shape::Any => "any",
    }
}

/// Lattice join. `path` is only used to label conflict warnings pushed into
/// `warnings`; the join itself never fails.
fn join_at(warnings: &mut Vec<String>, path: &str, a: Shape, b: Shape) -> Shape {
    use Shape::*;
    match (a, b) {
        (Unknown, x) | (x, Unknown) => x,
        (Any, _) | (_, Any) => Any,

        (Null, Null) => Null,
        (Null, Optional(t)) | (Optional(t), Null) => Optional(t),
        (Null, t) | (t, Null) => Optional(Box::new(t)),

        (Optional(x), Optional(y)) => {
            Optional(Box::new(join_at(warnings, path, *x, *y)))
        }
        (Optional(x), y) | (y, Optional(x)) => {
            Optional(Box::new(join_at(warnings, path, *x, y)))
        }

        (Bool, Bool) => Bool,
        (Int, Int) => Int,
        (Float, Float) | (Int, Float) | (Float, Int) => Float,
        (Str { all_rfc3339: x }, Str { all_rfc3339: y }) => {
            Str { all_rfc3339: x && y }
        }

        (Array(x), Array(y)) => {
            let elem_path = format!("{path}[]");
            Array(Box::new(join_at(warnings, &elem_path, *x, *y)))
        }

        (Object(x), Object(y)) => Object(join_objects(warnings, path, x, y)),

        (a, b) => {
            warnings.push(format!(
                "irreconcilable types at {path}: {} vs {}; falling back to a dynamic type",
                kind_name(&a),
                kind_name(&b)
            ));
            Any
        }
    }
}

fn join_objects(
    warnings: &mut Vec<String>,
    path: &str,
    a: ObjectShape,
    b: ObjectShape,
) -> ObjectShape {
    let mut out = ObjectShape { fields: a.fields, seen: a.seen + b.seen };
    for (key, fb) in b.fields {
        match out.fields.get_mut(&key) {
            None => {
                // later-only key appends in first-seen order
                out.fields.insert(key, fb);
            }
            Some(fa) => {
                let field_path = format!("{path}.{key}");
                let merged = join_at(
                    warnings,
                    &field_path,
                    std::mem::replace(&mut fa.shape, Shape::Unknown),
                    fb.shape,
                );
                fa.shape = merged;
                fa.present_in += fb.present_in;
            }
        }
    }
    out
}

// ------------------------------- Front API --------------------------------- //

impl Default for Shape {
    fn default() -> Self {
        Shape::Unknown
    }
}

/// Running accumulator: observe samples one at a time, in caller order.
#[derive(Debug, Default)]
pub struct Inference {
    state: Shape,
    warnings: Vec<String>,
}

impl Inference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, node: &ValueNode) {
        let obs = observe(&mut self.warnings, "$", node);
        let state = std::mem::take(&mut self.state);
        self.state = join_at(&mut self.warnings, "$", state, obs);
    }

    pub fn finish(self) -> Inferred {
        Inferred { root: self.state, warnings: self.warnings }
    }
}

/// Convenience: infer over a slice of samples, left to right.
pub fn infer(samples: &[ValueNode]) -> Inferred {
    let mut inf = Inference::new();
    for s in samples {
        inf.observe(s);
    }
    inf.finish()
}

// ------------------------------- Tests ------------------------------------ //

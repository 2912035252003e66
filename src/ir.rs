// Strongly-typed IR shared by the resolver and the emitters. No raw JSON here.

use std::collections::HashMap;

/// Index into the [`StructRegistry`] for one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Int,
    Float,
    Str,
    /// Only nulls were ever observed at this path.
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InferredType {
    Primitive(PrimitiveKind),
    Optional(Box<InferredType>),
    ArrayOf(Box<InferredType>),
    StructRef(StructId),
    /// String field whose every observed literal was an RFC 3339 timestamp.
    Time,
    /// Irreconcilable or evidence-free; emitters render their dynamic type.
    Unknown,
}

impl InferredType {
    /// Strip `Optional` layers; emitters decide the wrapper syntax once.
    pub fn unwrap_optional(&self) -> (&InferredType, bool) {
        match self {
            InferredType::Optional(inner) => (inner.unwrap_optional().0, true),
            other => (other, false),
        }
    }
}

/// One field of a generated struct. `source_key` is the JSON key as seen;
/// `ident` is the collision-free identifier the resolver produced.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub source_key: String,
    pub ident: String,
    pub ty: InferredType,
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    /// Declared order: first sample's key order, later-only keys appended
    /// in first-seen order.
    pub fields: Vec<FieldDef>,
}

/// Structural signature used for deduplication: field (key, type, required)
/// triples, order-insensitive. Two shapes with equal signatures share one
/// [`StructDef`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(Vec<(String, InferredType, bool)>);

impl Signature {
    pub fn new(mut entries: Vec<(String, InferredType, bool)>) -> Self {
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Signature(entries)
    }
}

/// Owns every `StructDef` of one generation run. Built during resolution,
/// consumed by emission, dropped with the call; never shared across calls.
#[derive(Debug, Default)]
pub struct StructRegistry {
    defs: Vec<StructDef>,
    by_signature: HashMap<Signature, StructId>,
}

impl StructRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a shape. Returns the existing id when the signature was seen
    /// before (`fresh == false`), so structurally identical shapes are
    /// emitted exactly once.
    pub fn intern(&mut self, sig: Signature, def: StructDef) -> (StructId, bool) {
        if let Some(&id) = self.by_signature.get(&sig) {
            return (id, false);
        }
        let id = StructId(self.defs.len());
        self.defs.push(def);
        self.by_signature.insert(sig, id);
        (id, true)
    }

    pub fn get(&self, id: StructId) -> &StructDef {
        &self.defs[id.0]
    }

    pub fn get_mut(&mut self, id: StructId) -> &mut StructDef {
        &mut self.defs[id.0]
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Ids in insertion order (children interned before parents, so this is
    /// already a dependency order for emission).
    pub fn ids(&self) -> impl Iterator<Item = StructId> + '_ {
        (0..self.defs.len()).map(StructId)
    }
}

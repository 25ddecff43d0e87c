// Schema registry: named record and enum definitions.
//
// A `SchemaBuilder` collects definitions; `build` resolves every name
// reference, precomputes per-type size bounds and freezes the result.
// A built `Schema` is never mutated and can be shared across threads.

use std::collections::HashMap;

use log::debug;

use super::field::{Field, FieldDef};
use super::shape::{Shape, TypeId};
use super::variant::{Alternative, VariantRegistry};
use crate::error::{Error, Result};

/// An ordered, named aggregate.
#[derive(Debug, Clone)]
pub struct RecordDef {
    name: Box<str>,
    fields: Vec<Field>,
}

impl RecordDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration (and wire) order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }
}

/// A named definition.
#[derive(Debug, Clone)]
pub enum TypeDef {
    Record(RecordDef),
    Enum(VariantRegistry),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            Self::Record(r) => r.name(),
            Self::Enum(e) => e.name(),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects definitions before they are frozen into a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    /// `None` marks a name that is declared but not yet defined.
    defs: Vec<Option<TypeDef>>,
    names: HashMap<Box<str>, TypeId>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a name so a definition can refer to itself while its fields
    /// are being described. Returns `false` if the name was already known.
    pub fn declare(&mut self, name: &str) -> bool {
        if self.names.contains_key(name) {
            return false;
        }
        let id = TypeId(self.defs.len());
        self.defs.push(None);
        self.names.insert(name.into(), id);
        true
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Define a record. Field tags are parsed and validated here, once.
    /// Returns a shape referring to the new definition.
    pub fn record(
        &mut self,
        name: &str,
        fields: impl IntoIterator<Item = FieldDef>,
    ) -> Result<Shape> {
        let mut resolved: Vec<Field> = Vec::new();
        for def in fields {
            let field = def.resolve()?;
            if resolved.iter().any(|f| f.name() == field.name()) {
                return Err(Error::DuplicateField {
                    ty: name.to_owned(),
                    field: field.name().to_owned(),
                });
            }
            resolved.push(field);
        }
        self.define(
            name,
            TypeDef::Record(RecordDef {
                name: name.into(),
                fields: resolved,
            }),
        )
    }

    /// Define an enum from its alternatives.
    pub fn enumeration(
        &mut self,
        name: &str,
        alternatives: impl IntoIterator<Item = Alternative>,
    ) -> Result<Shape> {
        let registry = VariantRegistry::new(name, alternatives)?;
        self.define(name, TypeDef::Enum(registry))
    }

    fn define(&mut self, name: &str, def: TypeDef) -> Result<Shape> {
        self.declare(name);
        let id = self.names[name];
        let slot = &mut self.defs[id.0];
        if slot.is_some() {
            return Err(Error::DuplicateType { name: name.to_owned() });
        }
        *slot = Some(def);
        Ok(Shape::named(name))
    }

    /// Resolve all references and freeze the schema.
    pub fn build(self) -> Result<Schema> {
        let Self { defs, names } = self;

        let mut frozen = Vec::with_capacity(defs.len());
        for (idx, def) in defs.into_iter().enumerate() {
            match def {
                Some(def) => frozen.push(def),
                None => {
                    let name = names
                        .iter()
                        .find(|(_, id)| id.0 == idx)
                        .map(|(name, _)| name.to_string())
                        .unwrap_or_default();
                    return Err(Error::UnknownType { name });
                }
            }
        }

        for def in &mut frozen {
            match def {
                TypeDef::Record(r) => {
                    for field in &mut r.fields {
                        resolve_refs(&mut field.shape, &names)?;
                    }
                }
                TypeDef::Enum(e) => {
                    for payload in e.payloads_mut() {
                        resolve_refs(payload, &names)?;
                    }
                }
            }
        }

        let min_len = compute_min_lengths(&frozen, &names);
        debug!("schema built: {} definitions", frozen.len());

        Ok(Schema {
            defs: frozen,
            names,
            min_len,
        })
    }
}

fn resolve_refs(shape: &mut Shape, names: &HashMap<Box<str>, TypeId>) -> Result<()> {
    match shape {
        Shape::Named(name) => {
            let id = *names.get(&**name).ok_or_else(|| Error::UnknownType {
                name: name.to_string(),
            })?;
            *shape = Shape::Ref(id);
        }
        Shape::Seq(elem) | Shape::Array(elem, _) | Shape::Option(elem) => {
            resolve_refs(elem, names)?
        }
        Shape::Map(key, value) => {
            resolve_refs(key, names)?;
            resolve_refs(value, names)?;
        }
        Shape::Unit
        | Shape::Bool
        | Shape::Int(_)
        | Shape::Bytes
        | Shape::String
        | Shape::Dynamic
        | Shape::Ref(_) => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Size bounds
// ---------------------------------------------------------------------------

/// Lower bound on the encoded size of `shape`, given per-definition bounds.
fn shape_min_len(shape: &Shape, table: &[usize], names: &HashMap<Box<str>, TypeId>) -> usize {
    match shape {
        Shape::Unit | Shape::Dynamic => 0,
        Shape::Bool => 1,
        Shape::Int(ty) => ty.width(),
        // A length prefix is at least one byte.
        Shape::Bytes | Shape::String | Shape::Seq(_) | Shape::Map(..) => 1,
        Shape::Array(elem, n) => n.saturating_mul(shape_min_len(elem, table, names)),
        Shape::Option(inner) => shape_min_len(inner, table, names),
        Shape::Named(name) => names
            .get(&**name)
            .and_then(|id| table.get(id.0))
            .copied()
            .unwrap_or(0),
        Shape::Ref(id) => table.get(id.0).copied().unwrap_or(0),
    }
}

fn field_min_len(field: &Field, table: &[usize], names: &HashMap<Box<str>, TypeId>) -> usize {
    let config = field.config();
    if config.is_skip() {
        return 0;
    }
    if config.is_optional() {
        return 1;
    }
    match (config.fixed_len, field.shape()) {
        (Some(n), Shape::Seq(elem)) => n.saturating_mul(shape_min_len(elem, table, names)),
        (Some(n), _) => n,
        (None, shape) => shape_min_len(shape, table, names),
    }
}

/// Fixed-point iteration from zero. Every intermediate table is a valid
/// lower bound, so stopping early (recursive types that only terminate
/// through nullable edges can grow for a while) is still sound.
fn compute_min_lengths(defs: &[TypeDef], names: &HashMap<Box<str>, TypeId>) -> Vec<usize> {
    let mut table = vec![0usize; defs.len()];
    for _ in 0..=defs.len() {
        let mut changed = false;
        for (idx, def) in defs.iter().enumerate() {
            let next = match def {
                TypeDef::Record(r) => r
                    .fields()
                    .iter()
                    .map(|f| field_min_len(f, &table, names))
                    .fold(0usize, usize::saturating_add),
                TypeDef::Enum(e) => e
                    .iter()
                    .map(|alt| shape_min_len(alt.payload(), &table, names))
                    .min()
                    .unwrap_or(0)
                    .saturating_add(1),
            };
            if next != table[idx] {
                table[idx] = next;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    table
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Frozen set of definitions shared by encoders and decoders.
#[derive(Debug, Clone)]
pub struct Schema {
    defs: Vec<TypeDef>,
    names: HashMap<Box<str>, TypeId>,
    min_len: Vec<usize>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// A schema with no definitions; enough for shapes built only from
    /// primitives and containers.
    pub fn empty() -> Self {
        Self {
            defs: Vec::new(),
            names: HashMap::new(),
            min_len: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeDef> {
        self.defs.get(id.0)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&TypeDef> {
        self.lookup(name).and_then(|id| self.get(id))
    }

    /// The definition a `Named` or `Ref` shape points at.
    pub fn definition(&self, shape: &Shape) -> Result<&TypeDef> {
        match shape {
            Shape::Named(name) => self.get_by_name(name).ok_or_else(|| Error::UnknownType {
                name: name.to_string(),
            }),
            Shape::Ref(id) => self.get(*id).ok_or_else(|| Error::UnknownType {
                name: format!("#{}", id.0),
            }),
            other => Err(Error::UnsupportedType {
                shape: other.kind().to_owned(),
            }),
        }
    }

    /// Lower bound on the encoded size of any value of `shape`.
    pub fn min_encoded_len(&self, shape: &Shape) -> usize {
        shape_min_len(shape, &self.min_len, &self.names)
    }
}

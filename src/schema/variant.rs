// Tagged-union registry: binds each alternative of an enum to a stable
// wire index and a payload shape.
//
// Indices are part of the wire format. Re-numbering an alternative changes
// every encoding that uses it.

use std::collections::HashMap;

use super::shape::Shape;
use crate::error::{Error, Result};
use crate::value::{Value, VariantValue};

/// One alternative of an enum definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    name: Box<str>,
    index: u64,
    payload: Shape,
}

impl Alternative {
    pub fn new(name: impl Into<Box<str>>, index: u64, payload: Shape) -> Self {
        Self {
            name: name.into(),
            index,
            payload,
        }
    }

    /// An alternative that carries no data.
    pub fn unit(name: impl Into<Box<str>>, index: u64) -> Self {
        Self::new(name, index, Shape::Unit)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn payload(&self) -> &Shape {
        &self.payload
    }
}

/// Bidirectional index <-> alternative table for one enum.
#[derive(Debug, Clone)]
pub struct VariantRegistry {
    ty: Box<str>,
    alternatives: Vec<Alternative>,
    by_index: HashMap<u64, usize>,
    by_name: HashMap<Box<str>, usize>,
}

impl VariantRegistry {
    /// Build the table, rejecting duplicate indices and names.
    pub fn new(
        ty: impl Into<Box<str>>,
        alternatives: impl IntoIterator<Item = Alternative>,
    ) -> Result<Self> {
        let ty = ty.into();
        let alternatives: Vec<Alternative> = alternatives.into_iter().collect();
        let mut by_index = HashMap::with_capacity(alternatives.len());
        let mut by_name = HashMap::with_capacity(alternatives.len());

        for (slot, alt) in alternatives.iter().enumerate() {
            if by_index.insert(alt.index, slot).is_some() {
                return Err(Error::DuplicateVariant {
                    ty: ty.to_string(),
                    kind: alt.index.to_string(),
                });
            }
            if by_name.insert(alt.name.clone(), slot).is_some() {
                return Err(Error::DuplicateVariant {
                    ty: ty.to_string(),
                    kind: alt.name.to_string(),
                });
            }
        }

        Ok(Self {
            ty,
            alternatives,
            by_index,
            by_name,
        })
    }

    /// Enum definition name.
    pub fn name(&self) -> &str {
        &self.ty
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Alternatives in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Alternative> {
        self.alternatives.iter()
    }

    pub fn by_index(&self, index: u64) -> Option<&Alternative> {
        self.by_index.get(&index).map(|&slot| &self.alternatives[slot])
    }

    pub fn by_name(&self, name: &str) -> Option<&Alternative> {
        self.by_name.get(name).map(|&slot| &self.alternatives[slot])
    }

    /// Encode direction: the alternative an active value reports.
    pub fn resolve_encode(&self, value: &VariantValue) -> Result<&Alternative> {
        self.by_index(value.index).ok_or_else(|| Error::InvalidVariant {
            ty: self.ty.to_string(),
            kind: value.index.to_string(),
        })
    }

    /// Decode direction: the alternative a wire index selects.
    pub fn resolve_decode(&self, index: u64) -> Result<&Alternative> {
        self.by_index(index).ok_or_else(|| Error::UnknownVariant {
            ty: self.ty.to_string(),
            index,
        })
    }

    /// Build the value of a named alternative.
    pub fn select(&self, name: &str, payload: Value) -> Result<Value> {
        let alt = self.by_name(name).ok_or_else(|| Error::InvalidVariant {
            ty: self.ty.to_string(),
            kind: name.to_owned(),
        })?;
        Ok(Value::variant(alt.index, payload))
    }

    /// Name of the alternative a value reports, if registered.
    pub fn name_of(&self, value: &VariantValue) -> Option<&str> {
        self.by_index(value.index).map(Alternative::name)
    }

    pub(crate) fn payloads_mut(&mut self) -> impl Iterator<Item = &mut Shape> {
        self.alternatives.iter_mut().map(|alt| &mut alt.payload)
    }
}

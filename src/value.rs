// Dynamic value tree.
//
// Values are transient: they are projections of caller-owned data built
// for one encode call, or materialized by one decode call.
//
// Byte sequences (`Bytes`, `Seq(U8)`, `Array(U8, N)`) always decode to
// `Value::Bytes`; the encoder also accepts a `Value::Seq` of `U8` items
// for them.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// A decoded or to-be-encoded value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// Absent. Only valid under an `optional` field.
    Null,
    Unit,
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Bytes(Vec<u8>),
    String(String),
    Seq(Vec<Value>),
    Map(BTreeMap<Value, Value>),
    Record(RecordValue),
    Variant(VariantValue),
}

impl Value {
    /// Short kind name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Unit => "unit",
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Seq(_) => "seq",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
            Self::Variant(_) => "variant",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn variant(index: u64, payload: Value) -> Self {
        Self::Variant(VariantValue {
            index,
            payload: Box::new(payload),
        })
    }

    pub fn record<N, I>(fields: I) -> Self
    where
        N: Into<Box<str>>,
        I: IntoIterator<Item = (N, Value)>,
    {
        Self::Record(fields.into_iter().collect())
    }

    pub fn map<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        Self::Map(entries.into_iter().collect())
    }

    pub fn into_record(self) -> Result<RecordValue> {
        match self {
            Self::Record(record) => Ok(record),
            other => Err(Error::TypeMismatch {
                expected: "record",
                found: other.kind(),
            }),
        }
    }

    pub fn into_variant(self) -> Result<VariantValue> {
        match self {
            Self::Variant(variant) => Ok(variant),
            other => Err(Error::TypeMismatch {
                expected: "variant",
                found: other.kind(),
            }),
        }
    }
}

/// Fields of a record value, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordValue {
    pub fields: Vec<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldValue {
    pub name: Box<str>,
    pub value: Value,
}

impl RecordValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<Box<str>>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing an earlier value of the same name.
    pub fn insert(&mut self, name: impl Into<Box<str>>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(slot) => slot.value = value,
            None => self.fields.push(FieldValue { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| &*f.name == name).map(|f| &f.value)
    }

    /// Remove a field and return its value.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|f| &*f.name == name)?;
        Some(self.fields.remove(pos).value)
    }

    /// Like [`take`](Self::take), but a missing field is an error naming
    /// the record type `ty`.
    pub fn take_required(&mut self, ty: &str, name: &str) -> Result<Value> {
        self.take(name).ok_or_else(|| Error::MissingField {
            ty: ty.to_owned(),
            field: name.to_owned(),
        })
    }
}

impl<N: Into<Box<str>>> FromIterator<(N, Value)> for RecordValue {
    fn from_iter<T: IntoIterator<Item = (N, Value)>>(iter: T) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// The active alternative of an enum: its wire index and payload.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariantValue {
    pub index: u64,
    pub payload: Box<Value>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    String => String,
    Vec<u8> => Bytes,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<RecordValue> for Value {
    fn from(v: RecordValue) -> Self {
        Self::Record(v)
    }
}

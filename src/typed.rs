// Typed front end: Rust types that describe, project and materialize
// themselves through the dynamic value tree.
//
// A type's schema is described once when a `TypedCodec` is built; encode
// and decode calls then only walk values.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::marker::PhantomData;

use crate::engine::{self, DecodeOptions, EncodeOptions};
use crate::error::{Error, Result};
use crate::schema::{Schema, SchemaBuilder, Shape};
use crate::value::Value;

/// A type with a canonical encoding.
///
/// Records and enums register a named definition in `describe` (see
/// [`define_once`]) and return a reference to it; primitives and
/// containers return their shape directly.
pub trait Canonical: Sized {
    /// Register any definitions this type needs and return its shape.
    fn describe(schema: &mut SchemaBuilder) -> Result<Shape>;

    /// Borrowing projection into a value tree.
    fn project(&self) -> Value;

    /// Rebuild from a decoded value tree.
    fn materialize(value: Value) -> Result<Self>;

    /// Project a run of elements. `u8` overrides this to produce one
    /// `Value::Bytes` instead of a value per byte.
    fn project_seq(items: &[Self]) -> Value {
        Value::Seq(items.iter().map(Self::project).collect())
    }

    /// Rebuild a run of elements from a decoded sequence.
    fn materialize_seq(value: Value) -> Result<Vec<Self>> {
        match value {
            Value::Seq(items) => items.into_iter().map(Self::materialize).collect(),
            Value::Bytes(bytes) => bytes
                .into_iter()
                .map(|b| Self::materialize(Value::U8(b)))
                .collect(),
            other => Err(mismatch("seq", &other)),
        }
    }
}

/// Describe a named definition at most once per builder.
///
/// The name is declared before `define` runs, so a definition may refer to
/// itself (directly or through other types) by calling `describe` again.
pub fn define_once<F>(schema: &mut SchemaBuilder, name: &str, define: F) -> Result<Shape>
where
    F: FnOnce(&mut SchemaBuilder) -> Result<Shape>,
{
    if !schema.declare(name) {
        return Ok(Shape::named(name));
    }
    define(schema)
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Schema and options for one root type, built once.
pub struct TypedCodec<T> {
    schema: Schema,
    shape: Shape,
    encode_opts: EncodeOptions,
    decode_opts: DecodeOptions,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Canonical> TypedCodec<T> {
    pub fn new() -> Result<Self> {
        Self::with_options(EncodeOptions::default(), DecodeOptions::default())
    }

    pub fn with_options(encode_opts: EncodeOptions, decode_opts: DecodeOptions) -> Result<Self> {
        let mut builder = Schema::builder();
        let shape = T::describe(&mut builder)?;
        Ok(Self {
            schema: builder.build()?,
            shape,
            encode_opts,
            decode_opts,
            _marker: PhantomData,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn encode(&self, value: &T) -> Result<Vec<u8>> {
        engine::encode_with_options(&self.schema, &self.shape, &value.project(), &self.encode_opts)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<T> {
        let opts = self.decode_opts.clone();
        let (value, _) = engine::decode_with_options(&self.schema, &self.shape, bytes, opts)?;
        T::materialize(value)
    }
}

/// One-shot encode with default options.
pub fn to_bytes<T: Canonical>(value: &T) -> Result<Vec<u8>> {
    TypedCodec::<T>::new()?.encode(value)
}

/// One-shot decode with default options; the whole input must be consumed.
pub fn from_bytes<T: Canonical>(bytes: &[u8]) -> Result<T> {
    TypedCodec::<T>::new()?.decode(bytes)
}

// ---------------------------------------------------------------------------
// Primitive impls
// ---------------------------------------------------------------------------

fn mismatch(expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

macro_rules! impl_canonical_scalar {
    ($($ty:ty => $shape:ident, $variant:ident);* $(;)?) => {
        $(
            impl Canonical for $ty {
                fn describe(_: &mut SchemaBuilder) -> Result<Shape> {
                    Ok(Shape::$shape)
                }

                fn project(&self) -> Value {
                    Value::$variant(*self)
                }

                fn materialize(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(mismatch(stringify!($ty), &other)),
                    }
                }
            }
        )*
    };
}

impl_canonical_scalar! {
    bool => Bool, Bool;
    u16 => U16, U16;
    u32 => U32, U32;
    u64 => U64, U64;
    i8 => I8, I8;
    i16 => I16, I16;
    i32 => I32, I32;
    i64 => I64, I64;
}

impl Canonical for u8 {
    fn describe(_: &mut SchemaBuilder) -> Result<Shape> {
        Ok(Shape::U8)
    }

    fn project(&self) -> Value {
        Value::U8(*self)
    }

    fn materialize(value: Value) -> Result<Self> {
        match value {
            Value::U8(v) => Ok(v),
            other => Err(mismatch("u8", &other)),
        }
    }

    fn project_seq(items: &[Self]) -> Value {
        Value::Bytes(items.to_vec())
    }

    fn materialize_seq(value: Value) -> Result<Vec<Self>> {
        match value {
            Value::Bytes(bytes) => Ok(bytes),
            Value::Seq(items) => items.into_iter().map(Self::materialize).collect(),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

impl Canonical for () {
    fn describe(_: &mut SchemaBuilder) -> Result<Shape> {
        Ok(Shape::Unit)
    }

    fn project(&self) -> Value {
        Value::Unit
    }

    fn materialize(value: Value) -> Result<Self> {
        match value {
            Value::Unit => Ok(()),
            other => Err(mismatch("unit", &other)),
        }
    }
}

impl Canonical for String {
    fn describe(_: &mut SchemaBuilder) -> Result<Shape> {
        Ok(Shape::String)
    }

    fn project(&self) -> Value {
        Value::String(self.clone())
    }

    fn materialize(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Container impls
// ---------------------------------------------------------------------------

impl<T: Canonical> Canonical for Vec<T> {
    fn describe(schema: &mut SchemaBuilder) -> Result<Shape> {
        Ok(Shape::seq(T::describe(schema)?))
    }

    fn project(&self) -> Value {
        T::project_seq(self)
    }

    fn materialize(value: Value) -> Result<Self> {
        T::materialize_seq(value)
    }
}

impl<T: Canonical, const N: usize> Canonical for [T; N] {
    fn describe(schema: &mut SchemaBuilder) -> Result<Shape> {
        Ok(Shape::array(T::describe(schema)?, N))
    }

    fn project(&self) -> Value {
        T::project_seq(self)
    }

    fn materialize(value: Value) -> Result<Self> {
        let items = T::materialize_seq(value)?;
        let actual = items.len();
        items
            .try_into()
            .map_err(|_| Error::LengthMismatch { expected: N, actual })
    }
}

/// `None` projects to `Value::Null`, which only encodes under an
/// `optional` field.
impl<T: Canonical> Canonical for Option<T> {
    fn describe(schema: &mut SchemaBuilder) -> Result<Shape> {
        Ok(Shape::option(T::describe(schema)?))
    }

    fn project(&self) -> Value {
        match self {
            Some(v) => v.project(),
            None => Value::Null,
        }
    }

    fn materialize(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            present => T::materialize(present).map(Some),
        }
    }
}

impl<T: Canonical> Canonical for Box<T> {
    fn describe(schema: &mut SchemaBuilder) -> Result<Shape> {
        T::describe(schema)
    }

    fn project(&self) -> Value {
        (**self).project()
    }

    fn materialize(value: Value) -> Result<Self> {
        T::materialize(value).map(Box::new)
    }
}

impl<K: Canonical + Ord, V: Canonical> Canonical for BTreeMap<K, V> {
    fn describe(schema: &mut SchemaBuilder) -> Result<Shape> {
        Ok(Shape::map(K::describe(schema)?, V::describe(schema)?))
    }

    fn project(&self) -> Value {
        Value::map(self.iter().map(|(k, v)| (k.project(), v.project())))
    }

    fn materialize(value: Value) -> Result<Self> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::materialize(k)?, V::materialize(v)?)))
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}

impl<K: Canonical + Eq + Hash, V: Canonical> Canonical for HashMap<K, V> {
    fn describe(schema: &mut SchemaBuilder) -> Result<Shape> {
        Ok(Shape::map(K::describe(schema)?, V::describe(schema)?))
    }

    fn project(&self) -> Value {
        Value::map(self.iter().map(|(k, v)| (k.project(), v.project())))
    }

    fn materialize(value: Value) -> Result<Self> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::materialize(k)?, V::materialize(v)?)))
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Type shapes: the runtime description the encoder and decoder dispatch on.

/// Fixed-width integer types. All are encoded little-endian at full width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
}

impl IntType {
    /// Encoded width in bytes.
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 => 4,
            Self::U64 | Self::I64 => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
        }
    }
}

/// Index of a definition inside a built [`Schema`](super::Schema).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The shape of a value on the wire.
///
/// Records and enums are never inlined: they are defined once in a
/// [`SchemaBuilder`](super::SchemaBuilder) and referenced by name, which is
/// also what makes recursive types expressible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Zero bytes. Payload of data-less enum alternatives.
    Unit,
    /// One byte, 0 or 1.
    Bool,
    /// Fixed-width little-endian integer.
    Int(IntType),
    /// Length-prefixed raw bytes.
    Bytes,
    /// Length-prefixed UTF-8.
    String,
    /// Length-prefixed sequence of elements.
    Seq(Box<Shape>),
    /// Exactly `N` elements, no prefix.
    Array(Box<Shape>, usize),
    /// Length-prefixed key/value pairs in canonical key-byte order.
    Map(Box<Shape>, Box<Shape>),
    /// Pointer-like nullable. Transparent on the wire unless the enclosing
    /// field is flagged `optional`.
    Option(Box<Shape>),
    /// A value whose concrete type is not known to the schema.
    Dynamic,
    /// Reference to a record or enum definition by name.
    Named(Box<str>),
    /// Resolved reference, produced when a schema is built.
    Ref(TypeId),
}

impl Shape {
    pub const U8: Shape = Shape::Int(IntType::U8);
    pub const U16: Shape = Shape::Int(IntType::U16);
    pub const U32: Shape = Shape::Int(IntType::U32);
    pub const U64: Shape = Shape::Int(IntType::U64);
    pub const I8: Shape = Shape::Int(IntType::I8);
    pub const I16: Shape = Shape::Int(IntType::I16);
    pub const I32: Shape = Shape::Int(IntType::I32);
    pub const I64: Shape = Shape::Int(IntType::I64);

    pub fn seq(elem: Shape) -> Self {
        Self::Seq(Box::new(elem))
    }

    pub fn array(elem: Shape, len: usize) -> Self {
        Self::Array(Box::new(elem), len)
    }

    pub fn map(key: Shape, value: Shape) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    pub fn option(inner: Shape) -> Self {
        Self::Option(Box::new(inner))
    }

    pub fn named(name: impl Into<Box<str>>) -> Self {
        Self::Named(name.into())
    }

    /// Whether a value of this shape can be absent, which is what an
    /// `optional` field needs to encode its presence byte.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            Self::Option(_) | Self::Seq(_) | Self::Bytes | Self::Map(..) | Self::Dynamic
        )
    }

    /// Whether a `fixed_len` field configuration applies to this shape.
    pub fn accepts_fixed_len(&self) -> bool {
        matches!(self, Self::Seq(_) | Self::Bytes | Self::String)
    }

    /// Whether elements of this sequence/array are single bytes.
    pub(crate) fn is_byte(&self) -> bool {
        matches!(self, Self::Int(IntType::U8))
    }

    /// Short kind name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Bool => "bool",
            Self::Int(ty) => ty.name(),
            Self::Bytes => "bytes",
            Self::String => "string",
            Self::Seq(_) => "seq",
            Self::Array(..) => "array",
            Self::Map(..) => "map",
            Self::Option(_) => "option",
            Self::Dynamic => "dynamic",
            Self::Named(_) | Self::Ref(_) => "named",
        }
    }
}

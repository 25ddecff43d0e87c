// Error taxonomy shared by the schema builder, encoder and decoder.
//
// Every variant aborts the whole operation; there is no partial output and
// no internal retry.

use thiserror::Error;

use crate::lcs::varint::VarIntError;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building a schema or encoding/decoding values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The shape has no encoding rule (e.g. an unresolved dynamic value).
    #[error("unsupported type: {shape}")]
    UnsupportedType {
        /// Short description of the offending shape.
        shape: String,
    },
    /// The value's kind does not match the shape it is encoded as.
    #[error("type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        /// Kind required by the shape.
        expected: &'static str,
        /// Kind of the supplied value.
        found: &'static str,
    },
    /// Declared and observed lengths disagree.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length fixed by the shape or field configuration.
        expected: usize,
        /// Length actually present.
        actual: usize,
    },
    /// Fewer bytes remain than the shape requires.
    #[error("truncated input at offset {at}: need {need} bytes, remaining {remaining}")]
    Truncated {
        /// Byte offset where the read was attempted.
        at: usize,
        /// Bytes required.
        need: usize,
        /// Bytes still available.
        remaining: usize,
    },
    /// Ill-formed variable-length integer.
    #[error("malformed varint at offset {at}: {reason}")]
    Malformed {
        /// Byte offset of the first varint byte.
        at: usize,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// A decoded discriminant has no registered alternative.
    #[error("unknown variant index {index} for enum {ty}")]
    UnknownVariant {
        /// Enum definition name.
        ty: String,
        /// Decoded discriminant.
        index: u64,
    },
    /// A value reports a discriminant with no bound payload shape.
    #[error("invalid variant {kind} for enum {ty}")]
    InvalidVariant {
        /// Enum definition name.
        ty: String,
        /// Index or name the value reported.
        kind: String,
    },
    /// Two alternatives of one enum share an index or a name.
    #[error("duplicate variant {kind} in enum {ty}")]
    DuplicateVariant {
        /// Enum definition name.
        ty: String,
        /// Duplicated index or name.
        kind: String,
    },
    /// Malformed field configuration.
    #[error("field {field}: invalid configuration {tag:?}: {reason}")]
    TagParse {
        /// Field the configuration belongs to.
        field: String,
        /// Raw configuration text.
        tag: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A named type reference does not resolve to a definition.
    #[error("unknown type {name}")]
    UnknownType {
        /// Referenced name.
        name: String,
    },
    /// A type name was defined twice.
    #[error("type {name} defined twice")]
    DuplicateType {
        /// Duplicated name.
        name: String,
    },
    /// A record declares the same field name twice.
    #[error("field {field} declared twice on {ty}")]
    DuplicateField {
        /// Record definition name.
        ty: String,
        /// Duplicated field name.
        field: String,
    },
    /// A non-optional record field has no value.
    #[error("missing field {field} on {ty}")]
    MissingField {
        /// Record definition name.
        ty: String,
        /// Field that was absent.
        field: String,
    },
    /// A record value carries a field its definition does not declare.
    #[error("unknown field {field} on {ty}")]
    UnknownField {
        /// Record definition name.
        ty: String,
        /// Undeclared field name.
        field: String,
    },
    /// Two map keys encode to the same bytes.
    #[error("duplicate map key after encoding")]
    DuplicateMapKey,
    /// Map entries are not in strictly increasing key-byte order.
    #[error("non-canonical map entry order at offset {at}")]
    NonCanonicalMap {
        /// Offset of the out-of-order key.
        at: usize,
    },
    /// A bool or presence byte other than 0 or 1.
    #[error("invalid bool byte 0x{byte:02x} at offset {at}")]
    InvalidBool {
        /// Byte offset.
        at: usize,
        /// Offending byte.
        byte: u8,
    },
    /// String bytes are not valid UTF-8.
    #[error("invalid utf-8 in string at offset {at}")]
    InvalidUtf8 {
        /// Offset of the string payload.
        at: usize,
    },
    /// Input remained after a complete value was decoded.
    #[error("{count} trailing bytes after value")]
    TrailingBytes {
        /// Unconsumed bytes.
        count: usize,
    },
    /// Nesting depth exceeded the configured limit.
    #[error("depth exceeded (max={max_depth})")]
    DepthExceeded {
        /// Configured ceiling.
        max_depth: usize,
    },
    /// A decoded length exceeds the configured container limit.
    #[error("container too large: len={len}, max={max}")]
    ContainerTooLarge {
        /// Decoded length.
        len: u64,
        /// Maximum permitted length.
        max: usize,
    },
}

impl Error {
    pub(crate) fn varint(err: VarIntError, at: usize, available: usize) -> Self {
        match err {
            VarIntError::Underflow => Self::Truncated {
                at,
                need: available + 1,
                remaining: available,
            },
            VarIntError::Overflow => Self::Malformed {
                at,
                reason: "value exceeds 64 bits",
            },
            VarIntError::Unterminated => Self::Malformed {
                at,
                reason: "no terminating byte within 10 bytes",
            },
        }
    }
}

// Codec engine: one-shot entry points over a built schema.
//
// Provides high-level encode/decode APIs that:
//   - Drive the schema-directed `Encoder` over a value tree
//   - Drive the `Decoder` over a byte slice, enforcing full consumption
//   - Carry the resource limits (depth, container length) and strictness

use log::trace;

use crate::error::Result;
use crate::lcs::{Decoder, Encoder};
use crate::schema::{Schema, Shape};
use crate::value::Value;

/// Default nesting ceiling for both directions.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default ceiling on any decoded length prefix (`2^31 - 1`).
pub const DEFAULT_MAX_CONTAINER_LEN: usize = (1 << 31) - 1;

/// Default budget of elements that occupy no input bytes, shared by every
/// container in one decode.
pub const DEFAULT_MAX_ZERO_WIDTH_ELEMS: usize = 1 << 16;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for encoding.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Maximum nesting depth of the value tree.
    pub max_depth: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Configuration for decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Maximum nesting depth of the decoded value.
    pub max_depth: usize,
    /// Largest length prefix accepted for any container.
    pub max_container_len: usize,
    /// Total elements of zero-width shapes (unit, empty records, empty
    /// arrays) accepted across one decode. Their length prefix cannot be
    /// checked against the remaining input.
    pub max_zero_width_elems: usize,
    /// Accept input with bytes left after the value.
    pub allow_trailing: bool,
    /// Reject non-canonical input: overlong varints, flag bytes other than
    /// 0/1, and map entries out of key-byte order.
    pub strict: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_container_len: DEFAULT_MAX_CONTAINER_LEN,
            max_zero_width_elems: DEFAULT_MAX_ZERO_WIDTH_ELEMS,
            allow_trailing: false,
            strict: true,
        }
    }
}

// ---------------------------------------------------------------------------
// High-level encode
// ---------------------------------------------------------------------------

/// Encode `value` as `shape` into a fresh buffer.
pub fn encode(schema: &Schema, shape: &Shape, value: &Value) -> Result<Vec<u8>> {
    encode_with_options(schema, shape, value, &EncodeOptions::default())
}

/// Encode with custom options.
pub fn encode_with_options(
    schema: &Schema,
    shape: &Shape,
    value: &Value,
    opts: &EncodeOptions,
) -> Result<Vec<u8>> {
    trace!("encode {} (max_depth={})", shape.kind(), opts.max_depth);
    let mut enc = Encoder::with_options(schema, opts);
    enc.encode(shape, value)?;
    Ok(enc.finish())
}

// ---------------------------------------------------------------------------
// High-level decode
// ---------------------------------------------------------------------------

/// Decode exactly one value of `shape` from `bytes`.
///
/// The whole input must be consumed.
pub fn decode(schema: &Schema, shape: &Shape, bytes: &[u8]) -> Result<Value> {
    decode_with_options(schema, shape, bytes, DecodeOptions::default()).map(|(value, _)| value)
}

/// Decode with custom options. Returns the value and the number of bytes
/// consumed.
pub fn decode_with_options(
    schema: &Schema,
    shape: &Shape,
    bytes: &[u8],
    opts: DecodeOptions,
) -> Result<(Value, usize)> {
    trace!(
        "decode {} from {} bytes (strict={}, allow_trailing={})",
        shape.kind(),
        bytes.len(),
        opts.strict,
        opts.allow_trailing
    );
    let mut dec = Decoder::with_options(schema, bytes, opts);
    let value = dec.decode(shape)?;
    let consumed = dec.finish()?;
    Ok((value, consumed))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

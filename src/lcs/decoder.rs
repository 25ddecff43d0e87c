// LCS decoder: mirror of the encoder over a borrowed input cursor.
//
// Lengths are checked against the remaining input before anything is
// allocated: `len * min_encoded_len(elem)` must fit, and `len` must not
// exceed the configured container ceiling. Elements that encode to zero
// bytes draw from a budget shared by the whole decode instead.

use std::collections::BTreeMap;

use log::debug;

use super::varint;
use crate::engine::DecodeOptions;
use crate::error::{Error, Result};
use crate::schema::{IntType, RecordDef, Schema, Shape, TypeDef, VariantRegistry};
use crate::value::{FieldValue, RecordValue, Value, VariantValue};

/// Reads values of known shape from the front of a byte slice.
pub struct Decoder<'s, 'a> {
    schema: &'s Schema,
    input: &'a [u8],
    pos: usize,
    zero_width_left: usize,
    opts: DecodeOptions,
}

impl<'s, 'a> Decoder<'s, 'a> {
    pub fn new(schema: &'s Schema, input: &'a [u8]) -> Self {
        Self::with_options(schema, input, DecodeOptions::default())
    }

    pub fn with_options(schema: &'s Schema, input: &'a [u8], opts: DecodeOptions) -> Self {
        Self {
            schema,
            input,
            pos: 0,
            zero_width_left: opts.max_zero_width_elems,
            opts,
        }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Decode one value of `shape` starting at the current position.
    pub fn decode(&mut self, shape: &Shape) -> Result<Value> {
        self.decode_node(shape, None, 0)
    }

    /// Read a bare ULEB128 integer.
    pub fn read_uleb128(&mut self) -> Result<u64> {
        let at = self.pos;
        let input = self.input;
        let rest = &input[at..];
        let (value, used) = varint::read_u64(rest).map_err(|e| Error::varint(e, at, rest.len()))?;
        if self.opts.strict && used != varint::sizeof_u64(value) {
            debug!("rejecting overlong varint at offset {at} ({used} bytes for {value})");
            return Err(Error::Malformed {
                at,
                reason: "non-minimal encoding",
            });
        }
        self.pos += used;
        Ok(value)
    }

    /// Read a byte blob with a varint length prefix.
    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_length(1)?;
        self.take(len)
    }

    /// Read exactly `n` bytes with no prefix.
    pub fn read_fixed_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Check that the input was fully consumed, unless trailing bytes are
    /// allowed. Returns the consumed length.
    pub fn finish(self) -> Result<usize> {
        let count = self.remaining();
        if count > 0 && !self.opts.allow_trailing {
            return Err(Error::TrailingBytes { count });
        }
        Ok(self.pos)
    }

    // -----------------------------------------------------------------------
    // Cursor primitives
    // -----------------------------------------------------------------------

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Error::Truncated {
                at: self.pos,
                need: n,
                remaining,
            });
        }
        let input = self.input;
        let bytes = &input[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// A bool or presence byte.
    fn read_flag(&mut self) -> Result<bool> {
        let at = self.pos;
        let [byte] = self.read_array::<1>()?;
        match byte {
            0 => Ok(false),
            1 => Ok(true),
            _ if self.opts.strict => {
                debug!("rejecting flag byte 0x{byte:02x} at offset {at}");
                Err(Error::InvalidBool { at, byte })
            }
            _ => Ok(true),
        }
    }

    /// Read a container length and check it can possibly be satisfied by
    /// the remaining input, given each element needs `min_elem` bytes.
    /// Zero-width elements are charged to the decode-wide budget.
    fn read_length(&mut self, min_elem: usize) -> Result<usize> {
        let len = self.read_uleb128()?;
        let max = self.opts.max_container_len;
        if len > max as u64 {
            return Err(Error::ContainerTooLarge { len, max });
        }
        let len = len as usize;
        if min_elem == 0 {
            let max = self.zero_width_left;
            if len > max {
                debug!("rejecting {len} zero-width elements at offset {}, {max} left", self.pos);
                return Err(Error::ContainerTooLarge { len: len as u64, max });
            }
            self.zero_width_left -= len;
        }
        let need = len.saturating_mul(min_elem);
        let remaining = self.remaining();
        if need > remaining {
            return Err(Error::Truncated {
                at: self.pos,
                need,
                remaining,
            });
        }
        Ok(len)
    }

    /// Length from the field configuration, or from the wire.
    fn container_len(&mut self, fixed_len: Option<usize>, min_elem: usize) -> Result<usize> {
        match fixed_len {
            Some(n) => Ok(n),
            None => self.read_length(min_elem),
        }
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    fn decode_node(
        &mut self,
        shape: &Shape,
        fixed_len: Option<usize>,
        depth: usize,
    ) -> Result<Value> {
        if depth >= self.opts.max_depth {
            return Err(Error::DepthExceeded {
                max_depth: self.opts.max_depth,
            });
        }

        match shape {
            Shape::Unit => Ok(Value::Unit),
            Shape::Bool => Ok(Value::Bool(self.read_flag()?)),
            Shape::Int(ty) => self.decode_int(*ty),
            Shape::Bytes => {
                let len = self.container_len(fixed_len, 1)?;
                Ok(Value::Bytes(self.take(len)?.to_vec()))
            }
            Shape::String => {
                let len = self.container_len(fixed_len, 1)?;
                let at = self.pos;
                let raw = self.take(len)?;
                let s = std::str::from_utf8(raw).map_err(|_| Error::InvalidUtf8 { at })?;
                Ok(Value::String(s.to_owned()))
            }
            Shape::Seq(elem) if elem.is_byte() => {
                let len = self.container_len(fixed_len, 1)?;
                Ok(Value::Bytes(self.take(len)?.to_vec()))
            }
            Shape::Seq(elem) => {
                let len = self.container_len(fixed_len, self.schema.min_encoded_len(elem))?;
                self.decode_elems(elem, len, depth)
            }
            Shape::Array(elem, n) if elem.is_byte() => Ok(Value::Bytes(self.take(*n)?.to_vec())),
            Shape::Array(elem, n) => self.decode_elems(elem, *n, depth),
            Shape::Map(key, val) => self.decode_map(key, val, depth),
            Shape::Option(inner) => self.decode_node(inner, fixed_len, depth + 1),
            Shape::Dynamic => Err(Error::UnsupportedType {
                shape: "dynamic".into(),
            }),
            Shape::Named(_) | Shape::Ref(_) => match self.schema.definition(shape)? {
                TypeDef::Record(def) => self.decode_record(def, depth),
                TypeDef::Enum(reg) => self.decode_variant(reg, depth),
            },
        }
    }

    fn decode_int(&mut self, ty: IntType) -> Result<Value> {
        Ok(match ty {
            IntType::U8 => Value::U8(u8::from_le_bytes(self.read_array()?)),
            IntType::U16 => Value::U16(u16::from_le_bytes(self.read_array()?)),
            IntType::U32 => Value::U32(u32::from_le_bytes(self.read_array()?)),
            IntType::U64 => Value::U64(u64::from_le_bytes(self.read_array()?)),
            IntType::I8 => Value::I8(i8::from_le_bytes(self.read_array()?)),
            IntType::I16 => Value::I16(i16::from_le_bytes(self.read_array()?)),
            IntType::I32 => Value::I32(i32::from_le_bytes(self.read_array()?)),
            IntType::I64 => Value::I64(i64::from_le_bytes(self.read_array()?)),
        })
    }

    fn decode_elems(&mut self, elem: &Shape, len: usize, depth: usize) -> Result<Value> {
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            items.push(self.decode_node(elem, None, depth + 1)?);
        }
        Ok(Value::Seq(items))
    }

    fn decode_map(
        &mut self,
        key_shape: &Shape,
        value_shape: &Shape,
        depth: usize,
    ) -> Result<Value> {
        let min_entry = self
            .schema
            .min_encoded_len(key_shape)
            .saturating_add(self.schema.min_encoded_len(value_shape));
        let len = self.read_length(min_entry)?;

        let input = self.input;
        let mut entries = BTreeMap::new();
        let mut prev_key: Option<&'a [u8]> = None;
        for _ in 0..len {
            let key_start = self.pos;
            let key = self.decode_node(key_shape, None, depth + 1)?;
            let key_bytes = &input[key_start..self.pos];
            if self.opts.strict
                && let Some(prev) = prev_key
                && key_bytes <= prev
            {
                debug!("rejecting out-of-order map key at offset {key_start}");
                return Err(Error::NonCanonicalMap { at: key_start });
            }
            prev_key = Some(key_bytes);

            let value = self.decode_node(value_shape, None, depth + 1)?;
            if entries.insert(key, value).is_some() {
                return Err(Error::DuplicateMapKey);
            }
        }
        Ok(Value::Map(entries))
    }

    fn decode_record(&mut self, def: &RecordDef, depth: usize) -> Result<Value> {
        let mut record = RecordValue::new();
        for field in def.fields() {
            let config = field.config();
            if config.is_skip() {
                continue;
            }
            let value = if config.is_optional() && !self.read_flag()? {
                Value::Null
            } else {
                self.decode_node(field.shape(), config.fixed_len, depth + 1)?
            };
            record.fields.push(FieldValue {
                name: field.name().into(),
                value,
            });
        }
        Ok(Value::Record(record))
    }

    fn decode_variant(&mut self, reg: &VariantRegistry, depth: usize) -> Result<Value> {
        let index = self.read_uleb128()?;
        let alt = reg.resolve_decode(index)?;
        let payload = self.decode_node(alt.payload(), None, depth + 1)?;
        Ok(Value::Variant(VariantValue {
            index,
            payload: Box::new(payload),
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Alternative, FieldDef};

    fn decode(schema: &Schema, shape: &Shape, bytes: &[u8]) -> Result<Value> {
        let mut dec = Decoder::new(schema, bytes);
        let value = dec.decode(shape)?;
        dec.finish()?;
        Ok(value)
    }

    fn lenient() -> DecodeOptions {
        DecodeOptions {
            strict: false,
            ..DecodeOptions::default()
        }
    }

    #[test]
    fn primitives() {
        let schema = Schema::empty();
        assert_eq!(decode(&schema, &Shape::U16, &[0x34, 0x12]).unwrap(), Value::U16(0x1234));
        assert_eq!(decode(&schema, &Shape::I32, &[0xFF; 4]).unwrap(), Value::I32(-1));
        assert_eq!(decode(&schema, &Shape::Bool, &[0]).unwrap(), Value::Bool(false));
        assert_eq!(decode(&schema, &Shape::Unit, &[]).unwrap(), Value::Unit);
    }

    #[test]
    fn short_integer_is_truncated() {
        let schema = Schema::empty();
        assert_eq!(
            decode(&schema, &Shape::U32, &[1, 2]).unwrap_err(),
            Error::Truncated {
                at: 0,
                need: 4,
                remaining: 2
            }
        );
    }

    #[test]
    fn byte_sequences_decode_as_bytes() {
        let schema = Schema::empty();
        let expected = Value::from(vec![0xCAu8, 0xFE]);
        assert_eq!(decode(&schema, &Shape::Bytes, &[2, 0xCA, 0xFE]).unwrap(), expected);
        assert_eq!(decode(&schema, &Shape::seq(Shape::U8), &[2, 0xCA, 0xFE]).unwrap(), expected);
        assert_eq!(decode(&schema, &Shape::array(Shape::U8, 2), &[0xCA, 0xFE]).unwrap(), expected);
    }

    #[test]
    fn invalid_utf8() {
        let schema = Schema::empty();
        assert_eq!(
            decode(&schema, &Shape::String, &[2, 0xC3, 0x28]).unwrap_err(),
            Error::InvalidUtf8 { at: 1 }
        );
    }

    #[test]
    fn strict_flags() {
        let schema = Schema::empty();
        assert_eq!(
            decode(&schema, &Shape::Bool, &[2]).unwrap_err(),
            Error::InvalidBool { at: 0, byte: 2 }
        );
        let mut dec = Decoder::with_options(&schema, &[2], lenient());
        assert_eq!(dec.decode(&Shape::Bool).unwrap(), Value::Bool(true));
    }

    #[test]
    fn overlong_varint_rejected_in_strict_mode() {
        let schema = Schema::empty();
        assert!(matches!(
            decode(&schema, &Shape::Bytes, &[0x80, 0x00]),
            Err(Error::Malformed { at: 0, .. })
        ));
        let mut dec = Decoder::with_options(&schema, &[0x80, 0x00], lenient());
        assert_eq!(dec.decode(&Shape::Bytes).unwrap(), Value::Bytes(Vec::new()));
        assert_eq!(dec.finish().unwrap(), 2);
    }

    #[test]
    fn length_larger_than_input_is_truncated() {
        let schema = Schema::empty();
        // Claims 2^20 u64 elements with nothing behind it.
        let bytes = [0x80, 0x80, 0x40];
        assert_eq!(
            decode(&schema, &Shape::seq(Shape::U64), &bytes).unwrap_err(),
            Error::Truncated {
                at: 3,
                need: 8 << 20,
                remaining: 0
            }
        );
    }

    #[test]
    fn container_ceiling() {
        let schema = Schema::empty();
        let opts = DecodeOptions {
            max_container_len: 4,
            ..DecodeOptions::default()
        };
        let mut dec = Decoder::with_options(&schema, &[5, 0, 0, 0, 0, 0], opts);
        assert_eq!(
            dec.decode(&Shape::seq(Shape::Unit)).unwrap_err(),
            Error::ContainerTooLarge { len: 5, max: 4 }
        );
    }

    #[test]
    fn zero_width_elements_draw_from_a_budget() {
        let mut b = Schema::builder();
        b.record("Empty", Vec::<FieldDef>::new()).unwrap();
        b.record("Hidden", [FieldDef::new("memo", Shape::U64).skip()]).unwrap();
        let schema = b.build().unwrap();

        // 2^31 - 1: passes the container ceiling, occupies no input.
        let huge = [0xFF, 0xFF, 0xFF, 0xFF, 0x07];
        for shape in [
            Shape::seq(Shape::Unit),
            Shape::seq(Shape::named("Empty")),
            Shape::seq(Shape::named("Hidden")),
            Shape::seq(Shape::array(Shape::U32, 0)),
        ] {
            assert_eq!(
                decode(&schema, &shape, &huge).unwrap_err(),
                Error::ContainerTooLarge {
                    len: (1 << 31) - 1,
                    max: 1 << 16
                },
                "{shape:?}"
            );
        }
        assert!(matches!(
            decode(&schema, &Shape::map(Shape::Unit, Shape::Unit), &huge),
            Err(Error::ContainerTooLarge { .. })
        ));

        // 2^24 units in four bytes.
        assert!(matches!(
            decode(&schema, &Shape::seq(Shape::Unit), &[0x80, 0x80, 0x80, 0x08]),
            Err(Error::ContainerTooLarge { len: 16_777_216, .. })
        ));
    }

    #[test]
    fn zero_width_budget_is_shared_across_containers() {
        let schema = Schema::empty();
        let opts = DecodeOptions {
            max_zero_width_elems: 5,
            ..DecodeOptions::default()
        };
        let shape = Shape::seq(Shape::seq(Shape::Unit));

        let mut dec = Decoder::with_options(&schema, &[2, 3, 2], opts.clone());
        let value = dec.decode(&shape).unwrap();
        assert_eq!(
            value,
            Value::Seq(vec![
                Value::Seq(vec![Value::Unit; 3]),
                Value::Seq(vec![Value::Unit; 2]),
            ])
        );

        let mut dec = Decoder::with_options(&schema, &[2, 3, 3], opts);
        assert_eq!(
            dec.decode(&shape).unwrap_err(),
            Error::ContainerTooLarge { len: 3, max: 2 }
        );
    }

    #[test]
    fn trailing_bytes() {
        let schema = Schema::empty();
        assert_eq!(
            decode(&schema, &Shape::U8, &[1, 2, 3]).unwrap_err(),
            Error::TrailingBytes { count: 2 }
        );
        let opts = DecodeOptions {
            allow_trailing: true,
            ..DecodeOptions::default()
        };
        let mut dec = Decoder::with_options(&schema, &[1, 2, 3], opts);
        assert_eq!(dec.decode(&Shape::U8).unwrap(), Value::U8(1));
        assert_eq!(dec.finish().unwrap(), 1);
    }

    #[test]
    fn map_order_enforced() {
        let schema = Schema::empty();
        let shape = Shape::map(Shape::U8, Shape::Unit);
        let ok = decode(&schema, &shape, &[2, 1, 2]).unwrap();
        assert_eq!(ok, Value::map([(Value::U8(1), Value::Unit), (Value::U8(2), Value::Unit)]));

        assert_eq!(
            decode(&schema, &shape, &[2, 2, 1]).unwrap_err(),
            Error::NonCanonicalMap { at: 2 }
        );
        assert_eq!(
            decode(&schema, &shape, &[2, 1, 1]).unwrap_err(),
            Error::NonCanonicalMap { at: 2 }
        );

        let mut dec = Decoder::with_options(&schema, &[2, 2, 1], lenient());
        assert_eq!(dec.decode(&shape).unwrap(), ok);
        let mut dec = Decoder::with_options(&schema, &[2, 1, 1], lenient());
        assert_eq!(dec.decode(&shape).unwrap_err(), Error::DuplicateMapKey);
    }

    #[test]
    fn optional_and_fixed_fields() {
        let mut b = Schema::builder();
        b.record(
            "R",
            [
                FieldDef::new("note", Shape::option(Shape::String)).tagged("optional"),
                FieldDef::new("key", Shape::Bytes).tagged("len=2"),
                FieldDef::new("memo", Shape::U64).skip(),
            ],
        )
        .unwrap();
        let schema = b.build().unwrap();
        let shape = Shape::named("R");

        let value = decode(&schema, &shape, &[0, 0xAB, 0xCD]).unwrap();
        assert_eq!(
            value,
            Value::record([("note", Value::Null), ("key", Value::from(vec![0xABu8, 0xCD]))])
        );

        let value = decode(&schema, &shape, &[1, 1, b'x', 0xAB, 0xCD]).unwrap();
        assert_eq!(
            value,
            Value::record([("note", Value::from("x")), ("key", Value::from(vec![0xABu8, 0xCD]))])
        );
    }

    #[test]
    fn unknown_variant_index() {
        let mut b = Schema::builder();
        b.enumeration("E", [Alternative::unit("A", 0), Alternative::new("B", 2, Shape::Bool)])
            .unwrap();
        let schema = b.build().unwrap();
        let shape = Shape::named("E");

        assert_eq!(
            decode(&schema, &shape, &[2, 1]).unwrap(),
            Value::variant(2, Value::Bool(true))
        );
        assert_eq!(
            decode(&schema, &shape, &[1]).unwrap_err(),
            Error::UnknownVariant {
                ty: "E".into(),
                index: 1
            }
        );
    }

    #[test]
    fn depth_is_bounded() {
        let mut b = Schema::builder();
        b.declare("Node");
        b.enumeration(
            "Node",
            [Alternative::unit("Leaf", 0), Alternative::new("Branch", 1, Shape::named("Node"))],
        )
        .unwrap();
        let schema = b.build().unwrap();

        let mut bytes = vec![1u8; 300];
        bytes.push(0);
        assert_eq!(
            decode(&schema, &Shape::named("Node"), &bytes).unwrap_err(),
            Error::DepthExceeded { max_depth: 256 }
        );
    }

    #[test]
    fn raw_passthrough() {
        let schema = Schema::empty();
        let input = [0x04, b'm', b'o', b'v', b'e', 0xAA, 0xAA, 0x80, 0x01];
        let mut dec = Decoder::new(&schema, &input);
        assert_eq!(dec.read_bytes().unwrap(), b"move");
        assert_eq!(dec.read_fixed_bytes(2).unwrap(), [0xAA, 0xAA]);
        assert_eq!(dec.read_uleb128().unwrap(), 128);
        assert_eq!(dec.position(), input.len());
        assert_eq!(dec.finish().unwrap(), input.len());
    }
}

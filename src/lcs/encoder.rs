// LCS encoder: depth-first, schema-driven traversal producing canonical bytes.
//
// Dispatch happens once per value node on its shape. Records are emitted
// in declaration order, enum discriminants and lengths as ULEB128, and map
// entries sorted by the bytes of their encoded keys.

use std::collections::BTreeMap;

use super::varint;
use crate::engine::{DEFAULT_MAX_DEPTH, EncodeOptions};
use crate::error::{Error, Result};
use crate::schema::{IntType, RecordDef, Schema, Shape, TypeDef, VariantRegistry};
use crate::value::Value;

/// Accumulates the canonical encoding of one or more values.
pub struct Encoder<'s> {
    schema: &'s Schema,
    out: Vec<u8>,
    max_depth: usize,
}

impl<'s> Encoder<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            out: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_options(schema: &'s Schema, opts: &EncodeOptions) -> Self {
        Self {
            schema,
            out: Vec::new(),
            max_depth: opts.max_depth,
        }
    }

    /// Append the encoding of `value` as `shape`.
    ///
    /// On error nothing from this call is left in the buffer.
    pub fn encode(&mut self, shape: &Shape, value: &Value) -> Result<()> {
        let start = self.out.len();
        let result = self.encode_node(shape, value, None, 0);
        if result.is_err() {
            self.out.truncate(start);
        }
        result
    }

    /// Append a bare ULEB128 integer.
    pub fn write_uleb128(&mut self, num: u64) {
        varint::put_u64(&mut self.out, num);
    }

    /// Append a byte blob with a varint length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        varint::put_usize(&mut self.out, bytes.len());
        self.out.extend_from_slice(bytes);
    }

    /// Append a byte blob whose length the reader knows out of band.
    pub fn write_fixed_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.out
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    fn encode_node(
        &mut self,
        shape: &Shape,
        value: &Value,
        fixed_len: Option<usize>,
        depth: usize,
    ) -> Result<()> {
        if depth >= self.max_depth {
            return Err(Error::DepthExceeded {
                max_depth: self.max_depth,
            });
        }

        match shape {
            Shape::Unit => match value {
                Value::Unit => Ok(()),
                other => Err(mismatch("unit", other)),
            },
            Shape::Bool => match value {
                Value::Bool(b) => {
                    self.out.push(u8::from(*b));
                    Ok(())
                }
                other => Err(mismatch("bool", other)),
            },
            Shape::Int(ty) => self.encode_int(*ty, value),
            Shape::Bytes => match value {
                Value::Bytes(bytes) => self.encode_byte_run(bytes, fixed_len),
                Value::Seq(items) => self.encode_seq(&Shape::U8, items, fixed_len, true, depth),
                other => Err(mismatch("bytes", other)),
            },
            Shape::String => match value {
                Value::String(s) => self.encode_byte_run(s.as_bytes(), fixed_len),
                other => Err(mismatch("string", other)),
            },
            Shape::Seq(elem) => match value {
                Value::Seq(items) => self.encode_seq(elem, items, fixed_len, true, depth),
                Value::Bytes(bytes) if elem.is_byte() => self.encode_byte_run(bytes, fixed_len),
                other => Err(mismatch("seq", other)),
            },
            Shape::Array(elem, n) => match value {
                Value::Seq(items) => self.encode_seq(elem, items, Some(*n), false, depth),
                Value::Bytes(bytes) if elem.is_byte() => self.encode_byte_run(bytes, Some(*n)),
                other => Err(mismatch("array", other)),
            },
            Shape::Map(key, val) => match value {
                Value::Map(entries) => self.encode_map(key, val, entries, depth),
                other => Err(mismatch("map", other)),
            },
            Shape::Option(inner) => match value {
                Value::Null => Err(mismatch(inner.kind(), value)),
                present => self.encode_node(inner, present, fixed_len, depth + 1),
            },
            Shape::Dynamic => Err(Error::UnsupportedType {
                shape: "dynamic".into(),
            }),
            Shape::Named(_) | Shape::Ref(_) => match self.schema.definition(shape)? {
                TypeDef::Record(def) => self.encode_record(def, value, depth),
                TypeDef::Enum(reg) => self.encode_variant(reg, value, depth),
            },
        }
    }

    fn encode_int(&mut self, ty: IntType, value: &Value) -> Result<()> {
        match (ty, value) {
            (IntType::U8, Value::U8(n)) => self.out.push(*n),
            (IntType::U16, Value::U16(n)) => self.out.extend_from_slice(&n.to_le_bytes()),
            (IntType::U32, Value::U32(n)) => self.out.extend_from_slice(&n.to_le_bytes()),
            (IntType::U64, Value::U64(n)) => self.out.extend_from_slice(&n.to_le_bytes()),
            (IntType::I8, Value::I8(n)) => self.out.extend_from_slice(&n.to_le_bytes()),
            (IntType::I16, Value::I16(n)) => self.out.extend_from_slice(&n.to_le_bytes()),
            (IntType::I32, Value::I32(n)) => self.out.extend_from_slice(&n.to_le_bytes()),
            (IntType::I64, Value::I64(n)) => self.out.extend_from_slice(&n.to_le_bytes()),
            (ty, other) => return Err(mismatch(ty.name(), other)),
        }
        Ok(())
    }

    fn encode_byte_run(&mut self, bytes: &[u8], fixed_len: Option<usize>) -> Result<()> {
        self.write_length(bytes.len(), fixed_len)?;
        self.out.extend_from_slice(bytes);
        Ok(())
    }

    /// Emit the length prefix, or check the length against a fixed one.
    fn write_length(&mut self, len: usize, fixed_len: Option<usize>) -> Result<()> {
        match fixed_len {
            Some(expected) if expected != len => Err(Error::LengthMismatch {
                expected,
                actual: len,
            }),
            Some(_) => Ok(()),
            None => {
                varint::put_usize(&mut self.out, len);
                Ok(())
            }
        }
    }

    fn encode_seq(
        &mut self,
        elem: &Shape,
        items: &[Value],
        fixed_len: Option<usize>,
        prefixed: bool,
        depth: usize,
    ) -> Result<()> {
        if prefixed {
            self.write_length(items.len(), fixed_len)?;
        } else if let Some(expected) = fixed_len
            && expected != items.len()
        {
            return Err(Error::LengthMismatch {
                expected,
                actual: items.len(),
            });
        }
        for item in items {
            self.encode_node(elem, item, None, depth + 1)?;
        }
        Ok(())
    }

    fn encode_record(&mut self, def: &RecordDef, value: &Value, depth: usize) -> Result<()> {
        let Value::Record(record) = value else {
            return Err(mismatch("record", value));
        };

        if let Some(stray) = record.fields.iter().find(|f| def.field(&f.name).is_none()) {
            return Err(Error::UnknownField {
                ty: def.name().to_owned(),
                field: stray.name.to_string(),
            });
        }

        for field in def.fields() {
            let config = field.config();
            if config.is_skip() {
                continue;
            }
            let present = record.get(field.name()).filter(|v| !v.is_null());

            if config.is_optional() {
                match present {
                    Some(v) => {
                        self.out.push(1);
                        self.encode_node(field.shape(), v, config.fixed_len, depth + 1)?;
                    }
                    None => self.out.push(0),
                }
                continue;
            }

            let v = present.ok_or_else(|| Error::MissingField {
                ty: def.name().to_owned(),
                field: field.name().to_owned(),
            })?;
            self.encode_node(field.shape(), v, config.fixed_len, depth + 1)?;
        }
        Ok(())
    }

    fn encode_variant(&mut self, reg: &VariantRegistry, value: &Value, depth: usize) -> Result<()> {
        let Value::Variant(active) = value else {
            return Err(mismatch("variant", value));
        };
        let alt = reg.resolve_encode(active)?;
        varint::put_u64(&mut self.out, alt.index());
        self.encode_node(alt.payload(), &active.payload, None, depth + 1)
    }

    /// Keys and values are encoded as standalone documents, then entries are
    /// ordered by unsigned byte-wise comparison of the key bytes.
    fn encode_map(
        &mut self,
        key_shape: &Shape,
        value_shape: &Shape,
        entries: &BTreeMap<Value, Value>,
        depth: usize,
    ) -> Result<()> {
        let mut encoded = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let key_bytes = self.encode_standalone(key_shape, key, depth + 1)?;
            let value_bytes = self.encode_standalone(value_shape, value, depth + 1)?;
            encoded.push((key_bytes, value_bytes));
        }
        encoded.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        if encoded.windows(2).any(|pair| pair[0].0 == pair[1].0) {
            return Err(Error::DuplicateMapKey);
        }

        varint::put_usize(&mut self.out, encoded.len());
        for (key_bytes, value_bytes) in &encoded {
            self.out.extend_from_slice(key_bytes);
            self.out.extend_from_slice(value_bytes);
        }
        Ok(())
    }

    fn encode_standalone(&mut self, shape: &Shape, value: &Value, depth: usize) -> Result<Vec<u8>> {
        let start = self.out.len();
        self.encode_node(shape, value, None, depth)?;
        Ok(self.out.split_off(start))
    }
}

fn mismatch(expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

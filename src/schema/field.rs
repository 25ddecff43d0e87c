// Record field descriptors and their wire configuration.
//
// Configuration can be given through builder calls or as a tag string
// (`"-"`, `"optional"`, `"len=32"`, comma-separated). Tags are parsed once,
// when the enclosing record is defined, never while encoding.

use bitflags::bitflags;

use super::shape::Shape;
use crate::error::{Error, Result};

bitflags! {
    /// Boolean field options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        /// Never encoded or decoded.
        const SKIP = 1 << 0;
        /// Preceded by a one-byte presence flag; the value is omitted when absent.
        const OPTIONAL = 1 << 1;
    }
}

/// Resolved wire configuration of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldConfig {
    pub flags: FieldFlags,
    /// Suppresses the length prefix and requires exactly this many elements.
    pub fixed_len: Option<usize>,
}

impl FieldConfig {
    #[inline]
    pub fn is_skip(&self) -> bool {
        self.flags.contains(FieldFlags::SKIP)
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.flags.contains(FieldFlags::OPTIONAL)
    }

    /// Parse a tag string such as `"optional,len=4"`.
    ///
    /// An empty tag yields the default configuration. `"-"` must stand alone.
    pub fn parse(field: &str, tag: &str) -> Result<Self> {
        let tag_err = |reason: String| Error::TagParse {
            field: field.to_owned(),
            tag: tag.to_owned(),
            reason,
        };

        let mut config = Self::default();
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Ok(config);
        }
        if trimmed == "-" {
            config.flags |= FieldFlags::SKIP;
            return Ok(config);
        }

        for part in trimmed.split(',') {
            let part = part.trim();
            let (key, value) = match part.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (part, None),
            };
            match (key, value) {
                ("optional", None) => {
                    if config.is_optional() {
                        return Err(tag_err("optional given twice".into()));
                    }
                    config.flags |= FieldFlags::OPTIONAL;
                }
                ("len", Some(raw)) => {
                    if config.fixed_len.is_some() {
                        return Err(tag_err("len given twice".into()));
                    }
                    let len = raw
                        .parse::<usize>()
                        .map_err(|e| tag_err(format!("len {raw:?}: {e}")))?;
                    config.fixed_len = Some(len);
                }
                ("len", None) => return Err(tag_err("len needs a value".into())),
                ("-", _) => return Err(tag_err("'-' cannot be combined".into())),
                ("", _) => return Err(tag_err("empty option".into())),
                (other, _) => return Err(tag_err(format!("unknown option {other:?}"))),
            }
        }
        Ok(config)
    }

    /// Reject options that do not apply to the field's shape.
    pub(crate) fn validate(&self, field: &str, shape: &Shape) -> Result<()> {
        let invalid = |reason: &str| Error::TagParse {
            field: field.to_owned(),
            tag: self.describe(),
            reason: reason.to_owned(),
        };
        if self.is_skip() {
            if self.is_optional() || self.fixed_len.is_some() {
                return Err(invalid("skipped fields take no other options"));
            }
            return Ok(());
        }
        if self.is_optional() && !shape.is_nullable() {
            return Err(invalid("optional requires an option, seq, bytes, map or dynamic shape"));
        }
        if self.fixed_len.is_some() && !shape.accepts_fixed_len() {
            return Err(invalid("len requires a seq, bytes or string shape"));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.is_skip() {
            parts.push("-".to_owned());
        }
        if self.is_optional() {
            parts.push("optional".to_owned());
        }
        if let Some(len) = self.fixed_len {
            parts.push(format!("len={len}"));
        }
        parts.join(",")
    }
}

/// A field as written by the caller, before its record is defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub(crate) name: Box<str>,
    pub(crate) shape: Shape,
    pub(crate) config: FieldConfig,
    pub(crate) tag: Option<Box<str>>,
}

impl FieldDef {
    pub fn new(name: impl Into<Box<str>>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            config: FieldConfig::default(),
            tag: None,
        }
    }

    pub fn skip(mut self) -> Self {
        self.config.flags |= FieldFlags::SKIP;
        self
    }

    pub fn optional(mut self) -> Self {
        self.config.flags |= FieldFlags::OPTIONAL;
        self
    }

    pub fn fixed_len(mut self, len: usize) -> Self {
        self.config.fixed_len = Some(len);
        self
    }

    /// Attach a tag string, parsed when the record is defined.
    pub fn tagged(mut self, tag: impl Into<Box<str>>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Merge the tag into the builder configuration and validate the result.
    pub(crate) fn resolve(self) -> Result<Field> {
        let mut config = self.config;
        if let Some(tag) = &self.tag {
            let parsed = FieldConfig::parse(&self.name, tag)?;
            config.flags |= parsed.flags;
            if let Some(len) = parsed.fixed_len {
                if config.fixed_len.is_some_and(|n| n != len) {
                    return Err(Error::TagParse {
                        field: self.name.to_string(),
                        tag: tag.to_string(),
                        reason: "len conflicts with fixed_len".into(),
                    });
                }
                config.fixed_len = Some(len);
            }
        }
        config.validate(&self.name, &self.shape)?;
        Ok(Field {
            name: self.name,
            shape: self.shape,
            config,
        })
    }
}

/// A resolved record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub(crate) name: Box<str>,
    pub(crate) shape: Shape,
    pub(crate) config: FieldConfig,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn config(&self) -> FieldConfig {
        self.config
    }
}

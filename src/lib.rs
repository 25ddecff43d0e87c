//! Oxilcs: canonical LCS binary serialization in Rust.
//!
//! Logically equal values always produce identical bytes. The crate provides:
//! - A runtime type description (`schema`) built once and shared
//! - A dynamic value tree (`value`)
//! - The wire codec: ULEB128 varints, encoder and decoder (`lcs`)
//! - High-level one-shot APIs with resource limits (`engine`)
//! - A typed front end for Rust types (`typed`)
//! - Optional parallel batch APIs (`parallel` feature)
//!
//! # Quick Start
//!
//! ```
//! use oxilcs::engine;
//! use oxilcs::schema::{FieldDef, Schema, Shape};
//! use oxilcs::value::Value;
//!
//! let mut builder = Schema::builder();
//! let point = builder
//!     .record("Point", [FieldDef::new("x", Shape::U16), FieldDef::new("y", Shape::U16)])
//!     .unwrap();
//! let schema = builder.build().unwrap();
//!
//! let value = Value::record([("x", Value::U16(1)), ("y", Value::U16(2))]);
//! let bytes = engine::encode(&schema, &point, &value).unwrap();
//! assert_eq!(bytes, [1, 0, 2, 0]);
//! assert_eq!(engine::decode(&schema, &point, &bytes).unwrap(), value);
//! ```

pub mod engine;
pub mod error;
pub mod lcs;
pub mod schema;
pub mod typed;
pub mod value;

#[cfg(feature = "parallel")]
pub mod batch;

pub use error::{Error, Result};
pub use typed::{Canonical, TypedCodec, from_bytes, to_bytes};

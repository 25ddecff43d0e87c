// Shared fixtures for integration tests.
#![allow(dead_code)]

use oxilcs::schema::{Alternative, FieldDef, Schema, Shape};
use oxilcs::value::Value;

pub const UINT64_KIND: u64 = 0;
pub const BYTES_KIND: u64 = 1;
pub const STRING_KIND: u64 = 2;

/// `MyStruct { boolean, bytes, label, scratch (skipped) }` and
/// `Wrapper { inner: optional MyStruct, name }`.
pub fn wrapper_schema() -> Schema {
    let mut b = Schema::builder();
    b.record(
        "MyStruct",
        [
            FieldDef::new("boolean", Shape::Bool),
            FieldDef::new("bytes", Shape::Bytes),
            FieldDef::new("label", Shape::String),
            FieldDef::new("scratch", Shape::U32).tagged("-"),
        ],
    )
    .unwrap();
    b.record(
        "Wrapper",
        [
            FieldDef::new("inner", Shape::option(Shape::named("MyStruct"))).tagged("optional"),
            FieldDef::new("name", Shape::String),
        ],
    )
    .unwrap();
    b.build().unwrap()
}

pub fn wrapper_value() -> Value {
    Value::record([
        (
            "inner",
            Value::record([
                ("boolean", Value::Bool(false)),
                ("bytes", Value::from(vec![1u8, 2, 3, 4])),
                ("label", Value::from("hello")),
            ]),
        ),
        ("name", Value::from("test")),
    ])
}

/// `TransactionArgument` enum and the `Program` record that carries a
/// sequence of them.
pub fn program_schema() -> Schema {
    let mut b = Schema::builder();
    b.enumeration(
        "TransactionArgument",
        [
            Alternative::new("Uint64", UINT64_KIND, Shape::U64),
            Alternative::new("Bytes", BYTES_KIND, Shape::Bytes),
            Alternative::new("String", STRING_KIND, Shape::String),
        ],
    )
    .unwrap();
    b.record(
        "Program",
        [
            FieldDef::new("code", Shape::Bytes),
            FieldDef::new("args", Shape::seq(Shape::named("TransactionArgument"))),
            FieldDef::new("modules", Shape::seq(Shape::Bytes)),
        ],
    )
    .unwrap();
    b.build().unwrap()
}

pub fn program_value() -> Value {
    Value::record([
        ("code", Value::from(b"move".to_vec())),
        (
            "args",
            Value::Seq(vec![
                Value::variant(STRING_KIND, Value::from("CAFE D00D")),
                Value::variant(BYTES_KIND, Value::from(vec![0xAAu8, 0x3D, 0x22])),
                Value::variant(UINT64_KIND, Value::U64(12)),
            ]),
        ),
        (
            "modules",
            Value::Seq(vec![
                Value::from(vec![0xCAu8]),
                Value::from(vec![0xFEu8, 0xD0]),
                Value::from(vec![0x0Du8]),
            ]),
        ),
    ])
}

pub const WRAPPER_HEX: &str = "010004010203040568656c6c6f0474657374";
pub const PROGRAM_HEX: &str = "046D6F76650302094341464520443030440103AA3D22000C000000000000000301CA02FED0010D";

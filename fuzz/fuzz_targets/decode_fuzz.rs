#![no_main]
use libfuzzer_sys::fuzz_target;
use oxilcs::engine::{self, DecodeOptions};
use oxilcs::schema::{Alternative, FieldDef, Schema, Shape};

fn schema() -> Schema {
    let mut b = Schema::builder();
    b.enumeration(
        "Node",
        [
            Alternative::new("Leaf", 0, Shape::U64),
            Alternative::new("Text", 1, Shape::String),
            Alternative::new("List", 2, Shape::seq(Shape::named("Node"))),
            Alternative::new("Table", 3, Shape::map(Shape::Bytes, Shape::named("Node"))),
        ],
    )
    .unwrap();
    b.record(
        "Doc",
        [
            FieldDef::new("id", Shape::Bytes).fixed_len(4),
            FieldDef::new("root", Shape::named("Node")),
            FieldDef::new("extra", Shape::option(Shape::seq(Shape::Bool))).optional(),
        ],
    )
    .unwrap();
    b.build().unwrap()
}

fuzz_target!(|data: &[u8]| {
    // The decoder must never panic, only return errors.
    let schema = schema();
    let shape = Shape::named("Doc");
    if let Ok(value) = engine::decode(&schema, &shape, data) {
        // Strictly decoded input is canonical: it re-encodes to itself.
        let again = engine::encode(&schema, &shape, &value).unwrap();
        assert_eq!(again, data);
    }

    let lenient = DecodeOptions {
        strict: false,
        allow_trailing: true,
        ..Default::default()
    };
    let _ = engine::decode_with_options(&schema, &shape, data, lenient);
});

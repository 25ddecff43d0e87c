#![no_main]
use libfuzzer_sys::fuzz_target;
use oxilcs::engine;
use oxilcs::schema::{Schema, Shape};
use oxilcs::value::Value;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the chunk size; the rest becomes map entries.
    let chunk = usize::from(data[0] % 8) + 1;
    let payload = &data[1..];

    let map = Value::map(payload.chunks(chunk).enumerate().map(|(i, key)| {
        (Value::Bytes(key.to_vec()), Value::U32(i as u32))
    }));
    let seq = Value::Seq(payload.iter().map(|&b| Value::I8(b as i8)).collect());
    let value = Value::Seq(vec![map]);

    let schema = Schema::empty();
    let map_shape = Shape::seq(Shape::map(Shape::Bytes, Shape::U32));
    let bytes = engine::encode(&schema, &map_shape, &value).unwrap();
    let decoded = engine::decode(&schema, &map_shape, &bytes).unwrap();
    assert_eq!(decoded, value);

    let seq_shape = Shape::seq(Shape::I8);
    let bytes = engine::encode(&schema, &seq_shape, &seq).unwrap();
    let decoded = engine::decode(&schema, &seq_shape, &bytes).unwrap();
    assert_eq!(decoded, seq);
});

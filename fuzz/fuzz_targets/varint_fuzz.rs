#![no_main]
use libfuzzer_sys::fuzz_target;
use oxilcs::lcs::varint;

fuzz_target!(|data: &[u8]| {
    // Parsing arbitrary bytes must never panic; anything accepted must
    // re-encode within the consumed length.
    if let Ok((value, used)) = varint::read_u64(data) {
        assert!(used <= varint::MAX_VARINT_LEN);
        assert!(varint::sizeof_u64(value) <= used);

        let mut out = Vec::new();
        varint::put_u64(&mut out, value);
        assert_eq!(varint::read_u64(&out), Ok((value, out.len())));
    }
});

// Unsigned LEB128 variable-length integers.
//
// Little-endian base-128: least-significant group first. Each byte has
// bit 7 set except the final byte. Used for every length prefix and enum
// discriminant on the wire.

/// Maximum encoded length for a 64-bit value (ceil(64/7) = 10).
pub const MAX_VARINT_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a `u64` as ULEB128 into `buf`.
/// Returns the number of bytes written (1..=10), starting at `buf[0]`.
#[inline]
pub fn encode_u64(mut num: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    loop {
        let group = (num & 0x7F) as u8;
        num >>= 7;
        if num == 0 {
            buf[i] = group;
            return i + 1;
        }
        buf[i] = group | 0x80;
        i += 1;
    }
}

/// Append a `u64` varint to `out`.
pub fn put_u64(out: &mut Vec<u8>, num: u64) {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u64(num, &mut buf);
    out.extend_from_slice(&buf[..len]);
}

/// Append a `usize` varint to `out`.
pub fn put_usize(out: &mut Vec<u8>, num: usize) {
    put_u64(out, num as u64);
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a `u64` from the front of a byte slice.
/// Returns `(value, bytes_consumed)` or an error.
///
/// Overlong encodings are accepted here; callers that need canonical input
/// compare `bytes_consumed` against [`sizeof_u64`].
pub fn read_u64(data: &[u8]) -> Result<(u64, usize), VarIntError> {
    let mut val: u64 = 0;
    for (i, &byte) in data.iter().take(MAX_VARINT_LEN).enumerate() {
        let group = u64::from(byte & 0x7F);
        // The tenth byte only has room for the top bit of a u64.
        if i == MAX_VARINT_LEN - 1 && group > 1 {
            return Err(VarIntError::Overflow);
        }
        val |= group << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((val, i + 1));
        }
    }
    if data.len() >= MAX_VARINT_LEN {
        Err(VarIntError::Unterminated)
    } else {
        Err(VarIntError::Underflow)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Return the minimal encoded byte-length of a `u64` value.
#[inline]
pub fn sizeof_u64(num: u64) -> usize {
    let bits = 64 - num.leading_zeros();
    (bits.max(1).div_ceil(7) as usize).min(MAX_VARINT_LEN)
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarIntError {
    /// Input ended before a terminating byte.
    Underflow,
    /// Value would overflow 64 bits.
    Overflow,
    /// Ten bytes read without a terminating byte.
    Unterminated,
}

impl std::fmt::Display for VarIntError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarIntError::Underflow => write!(f, "varint underflow (truncated input)"),
            VarIntError::Overflow => write!(f, "varint overflow"),
            VarIntError::Unterminated => write!(f, "varint not terminated within 10 bytes"),
        }
    }
}

impl std::error::Error for VarIntError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

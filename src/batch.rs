// Batch encoding/decoding across threads against one shared schema.
//
// Each item gets its own encoder or decoder; the schema is only read.
// Results keep input order, and the first error in input order wins.

use rayon::prelude::*;

use crate::engine::{self, DecodeOptions, EncodeOptions};
use crate::error::Result;
use crate::schema::{Schema, Shape};
use crate::value::Value;

/// Encode every value as `shape`, in parallel.
pub fn encode_batch(
    schema: &Schema,
    shape: &Shape,
    values: &[Value],
    opts: &EncodeOptions,
) -> Result<Vec<Vec<u8>>> {
    values
        .par_iter()
        .map(|value| engine::encode_with_options(schema, shape, value, opts))
        .collect()
}

/// Decode every buffer as one value of `shape`, in parallel.
pub fn decode_batch<B>(
    schema: &Schema,
    shape: &Shape,
    inputs: &[B],
    opts: &DecodeOptions,
) -> Result<Vec<Value>>
where
    B: AsRef<[u8]> + Sync,
{
    inputs
        .par_iter()
        .map(|bytes| {
            engine::decode_with_options(schema, shape, bytes.as_ref(), opts.clone())
                .map(|(value, _)| value)
        })
        .collect()
}

// Canonical wire codec.
//
// # Modules
//
// - `varint` : ULEB128 lengths and discriminants
// - `encoder`: Schema-directed value encoder
// - `decoder`: Schema-directed value decoder with strict-mode checks

pub mod decoder;
pub mod encoder;
pub mod varint;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use varint::VarIntError;

// Runtime type description.
//
// # Modules
//
// - `shape`   : Wire shapes (primitives, containers, named references)
// - `field`   : Record field descriptors and tag parsing
// - `variant` : Enum alternative registry (index <-> payload shape)
// - `registry`: Schema builder and the frozen, shareable schema

pub mod field;
pub mod registry;
pub mod shape;
pub mod variant;

pub use field::{Field, FieldConfig, FieldDef, FieldFlags};
pub use registry::{RecordDef, Schema, SchemaBuilder, TypeDef};
pub use shape::{IntType, Shape, TypeId};
pub use variant::{Alternative, VariantRegistry};

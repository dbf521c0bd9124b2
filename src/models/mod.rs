// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod code_unit;
pub mod entry;

pub use code_unit::{CodeUnit, LineRange, UnitKind};
pub use entry::DocumentationEntry;

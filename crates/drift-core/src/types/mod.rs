//! Shared type primitives: interned identifiers, interners, collections.

pub mod collections;
pub mod identifiers;
pub mod interning;

pub use identifiers::{ClassId, DetectorId, FileId, FunctionId, ModuleId, PatternId};
pub use interning::{InternerSnapshot, PathInterner, SymbolInterner};

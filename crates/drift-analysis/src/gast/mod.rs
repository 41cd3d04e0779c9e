//! GAST: the generic, language-agnostic AST detectors operate on.

mod normalize;
mod types;

pub use normalize::normalize_tree;
pub use types::{GastKind, GastNode};

//! Collection aliases for hot paths: Fx hashing, small-vector storage.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;

/// Inline storage for up to two elements (import specifiers, generic bounds).
pub type SmallVec2<T> = SmallVec<[T; 2]>;

/// Inline storage for up to four elements (parameters, pattern locations).
pub type SmallVec4<T> = SmallVec<[T; 4]>;

/// Inline storage for up to eight elements (per-function call edges).
pub type SmallVec8<T> = SmallVec<[T; 8]>;

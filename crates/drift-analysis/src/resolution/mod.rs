//! The resolution index: per-scan symbol tables built concurrently under
//! sharded locks, sealed into an immutable snapshot, then used to resolve
//! call sites via six ranked strategies.

mod index;
mod strategies;

pub use index::{FunctionKey, ResolutionIndex, ResolutionSnapshot};
pub use strategies::{
    name_similarity, Resolution, ResolutionDiagnostics, ResolvedCall,
};

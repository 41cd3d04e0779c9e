//! Newtype identifiers over interned strings.
//!
//! Every identifier wraps a `lasso::Spur` so the type system rejects a
//! `FileId` where a `FunctionId` is expected. Handles are process-local;
//! the store persists the interned string bodies, never the handles.

use lasso::Spur;
use serde::{Deserialize, Serialize};

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Spur);

        impl $name {
            pub fn new(key: Spur) -> Self {
                Self(key)
            }

            pub fn key(self) -> Spur {
                self.0
            }
        }

        impl From<Spur> for $name {
            fn from(key: Spur) -> Self {
                Self(key)
            }
        }
    };
}

interned_id!(
    /// Interned, separator-normalized file path.
    FileId
);

interned_id!(
    /// Interned function name, possibly qualified (`Class.method`).
    FunctionId
);

interned_id!(
    /// Stable pattern identifier (detector id + pattern body hash).
    PatternId
);

interned_id!(
    /// Interned class or type name.
    ClassId
);

interned_id!(
    /// Interned module path as written in an import.
    ModuleId
);

interned_id!(
    /// Interned detector identifier.
    DetectorId
);

#[cfg(test)]
mod tests {
    use super::*;
    use lasso::ThreadedRodeo;

    #[test]
    fn ids_compare_by_handle() {
        let rodeo = ThreadedRodeo::default();
        let a = FileId::new(rodeo.get_or_intern("src/a.ts"));
        let b = FileId::new(rodeo.get_or_intern("src/b.ts"));
        let a2 = FileId::new(rodeo.get_or_intern("src/a.ts"));
        assert_eq!(a, a2);
        assert_ne!(a, b);
    }
}

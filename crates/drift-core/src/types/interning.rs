//! Concurrent interners for paths and symbols.
//!
//! During a scan the engine interns through `lasso::ThreadedRodeo`; once the
//! build phase ends the interner freezes into a `RodeoReader` snapshot so the
//! query phase resolves without contention.

use lasso::{RodeoReader, Spur, ThreadedRodeo};

/// Read-only interner snapshot handed to the query phase.
pub type InternerSnapshot = RodeoReader;

/// Interner for file paths. Separators are normalized before interning so
/// the same file never gets two handles across platforms.
pub struct PathInterner {
    rodeo: ThreadedRodeo,
}

impl PathInterner {
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::default(),
        }
    }

    /// Intern a path after normalizing separators.
    pub fn intern(&self, path: &str) -> Spur {
        self.rodeo.get_or_intern(normalize_path(path))
    }

    /// Look up without inserting.
    pub fn get(&self, path: &str) -> Option<Spur> {
        self.rodeo.get(normalize_path(path))
    }

    pub fn resolve(&self, key: Spur) -> &str {
        self.rodeo.resolve(&key)
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }

    /// Freeze into a contention-free reader.
    pub fn freeze(self) -> InternerSnapshot {
        self.rodeo.into_reader()
    }
}

impl Default for PathInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Interner for function, class, and module symbols. Supports qualified
/// interning without an intermediate allocation at the call site.
pub struct SymbolInterner {
    rodeo: ThreadedRodeo,
}

impl SymbolInterner {
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::default(),
        }
    }

    pub fn intern(&self, symbol: &str) -> Spur {
        self.rodeo.get_or_intern(symbol)
    }

    /// Intern `owner.member` as a single qualified symbol.
    pub fn intern_qualified(&self, owner: &str, member: &str) -> Spur {
        self.rodeo.get_or_intern(format!("{owner}.{member}"))
    }

    pub fn get(&self, symbol: &str) -> Option<Spur> {
        self.rodeo.get(symbol)
    }

    pub fn resolve(&self, key: Spur) -> &str {
        self.rodeo.resolve(&key)
    }

    pub fn freeze(self) -> InternerSnapshot {
        self.rodeo.into_reader()
    }
}

impl Default for SymbolInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a path string: forward slashes only, no doubled or trailing
/// separators.
fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for ch in path.chars() {
        let c = if ch == '\\' { '/' } else { ch };
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

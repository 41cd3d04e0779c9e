//! Parser checkout pool.
//!
//! `tree_sitter::Parser` is not thread-safe; the pool hands parsers out
//! through a channel and takes them back when the guard drops. Checkout
//! blocks on exhaustion, which bounds peak parser memory.

use crossbeam_channel::{bounded, Receiver, Sender};
use drift_core::errors::ParseError;

pub struct ParserPool {
    slots: Receiver<tree_sitter::Parser>,
    returns: Sender<tree_sitter::Parser>,
}

impl ParserPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (returns, slots) = bounded(size);
        for _ in 0..size {
            returns
                .send(tree_sitter::Parser::new())
                .expect("pool channel sized to capacity");
        }
        Self { slots, returns }
    }

    /// Check out a parser configured for `grammar`. Blocks until a slot is
    /// free.
    pub fn checkout(
        &self,
        grammar: &tree_sitter::Language,
    ) -> Result<ParserGuard<'_>, ParseError> {
        let mut parser = self.slots.recv().map_err(|_| ParseError::PoolExhausted)?;
        parser
            .set_language(grammar)
            .map_err(|e| ParseError::GrammarLoadFailed {
                language: format!("{grammar:?}"),
                message: e.to_string(),
            })?;
        Ok(ParserGuard {
            parser: Some(parser),
            returns: &self.returns,
        })
    }
}

pub struct ParserGuard<'a> {
    parser: Option<tree_sitter::Parser>,
    returns: &'a Sender<tree_sitter::Parser>,
}

impl ParserGuard<'_> {
    pub fn parse(&mut self, source: &[u8]) -> Option<tree_sitter::Tree> {
        self.parser.as_mut()?.parse(source, None)
    }
}

impl Drop for ParserGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut parser) = self.parser.take() {
            parser.reset();
            let _ = self.returns.send(parser);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_and_return_cycle() {
        let pool = ParserPool::new(2);
        let grammar: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();
        for _ in 0..8 {
            let mut guard = pool.checkout(&grammar).unwrap();
            let tree = guard.parse(b"const x = 1;").unwrap();
            assert!(!tree.root_node().has_error());
        }
    }
}

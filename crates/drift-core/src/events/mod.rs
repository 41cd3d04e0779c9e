//! Typed, synchronous event bus with no-op defaults.
//!
//! Handlers implement `DriftEventHandler` and override only what they care
//! about. No persistence, no replay; dispatch is ordered per producer.

mod dispatcher;
mod handler;
mod types;

pub use dispatcher::EventDispatcher;
pub use handler::DriftEventHandler;
pub use types::*;

//! Foundation crate for the drift engine: identifiers, errors, events,
//! configuration, and cancellation. No analysis logic lives here.

pub mod cancellation;
pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod types;

pub use cancellation::CancellationToken;
pub use config::DriftConfig;

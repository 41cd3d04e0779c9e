//! Bayesian confidence: Beta posterior, five factors, momentum, tiers.

mod beta;
mod factors;
mod momentum;
mod scorer;
mod types;

pub use beta::{credible_interval, posterior_mean, posterior_params};
pub use factors::{compute_factors, FactorInput, Factors};
pub use momentum::{temporal_decay, MomentumTracker};
pub use scorer::{ConfidenceDiagnostics, ConfidenceScorer, ScorerConfig};
pub use types::{ConfidenceScore, ConfidenceTier, Momentum};

//! Convention learning: Bayesian discovery over aggregated + scored
//! patterns, five categories, promotion and expiry.

mod dirichlet;
mod discovery;
mod promotion;
mod relearning;
mod types;

pub use dirichlet::DirichletMultinomial;
pub use discovery::{ConventionLearner, Gene};
pub use promotion::apply_promotions;
pub use relearning::{relearn_mode, RelearnMode};
pub use types::{Convention, ConventionCategory, ConventionScope, ConventionStatus};

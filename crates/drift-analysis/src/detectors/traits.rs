//! The detector contract.

use crate::engine::{DetectionContext, PatternCategory, PatternMatch};
use crate::parsers::ParseResult;
use crate::scanner::Language;

/// One pluggable pattern observer.
///
/// Three variants exist: `Base` detectors are deterministic, `Learning`
/// detectors record the dominant alternative during `learn` and flag
/// deviations during `detect`, and `Semantic` detectors consult the
/// resolution index or scopes. Learning state lives behind interior
/// mutability so the engine can keep running detectors by shared reference
/// across files.
pub trait Detector: Send + Sync {
    fn id(&self) -> &'static str;

    fn category(&self) -> PatternCategory;

    fn variant(&self) -> DetectorVariant;

    /// Languages this detector applies to; `None` means all.
    fn languages(&self) -> Option<&[Language]> {
        None
    }

    /// First pass over the project for Learning detectors. Base detectors
    /// keep the default no-op.
    fn learn(&self, _project: &[ParseResult]) {}

    /// Produce matches for one file.
    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<PatternMatch>;

    /// Incremental hook: a file changed and any per-file learning state
    /// derived from it is stale.
    fn on_file_change(&self, _file: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorVariant {
    Base,
    Learning,
    Semantic,
}

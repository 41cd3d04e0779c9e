//! The handler trait. Every method defaults to a no-op so implementors
//! subscribe only to what they need.

use super::types::*;

pub trait DriftEventHandler: Send + Sync {
    fn on_scan_started(&self, _event: &ScanStarted) {}
    fn on_scan_progress(&self, _event: &ScanProgress) {}
    fn on_scan_complete(&self, _event: &ScanComplete) {}
    fn on_pattern_discovered(&self, _event: &PatternDiscovered) {}
    fn on_pattern_approved(&self, _event: &PatternApproved) {}
    fn on_violation_detected(&self, _event: &ViolationDetected) {}
    fn on_convention_learned(&self, _event: &ConventionLearned) {}
    fn on_constraint_violated(&self, _event: &ConstraintViolated) {}
    fn on_memory_created(&self, _event: &MemoryCreated) {}
    fn on_detector_alert(&self, _event: &DetectorAlert) {}
    fn on_error(&self, _event: &EngineError) {}
}

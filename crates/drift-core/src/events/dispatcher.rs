//! Fan-out dispatcher with per-handler panic isolation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use super::handler::DriftEventHandler;
use super::types::*;

/// Dispatches events to registered handlers in registration order. A handler
/// that panics is skipped for that event; the remaining handlers still run.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn DriftEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn DriftEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    fn fan_out<F: Fn(&dyn DriftEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            if catch_unwind(AssertUnwindSafe(|| f(handler.as_ref()))).is_err() {
                tracing::warn!("event handler panicked; continuing dispatch");
            }
        }
    }

    pub fn scan_started(&self, event: &ScanStarted) {
        self.fan_out(|h| h.on_scan_started(event));
    }

    pub fn scan_progress(&self, event: &ScanProgress) {
        self.fan_out(|h| h.on_scan_progress(event));
    }

    pub fn scan_complete(&self, event: &ScanComplete) {
        self.fan_out(|h| h.on_scan_complete(event));
    }

    pub fn pattern_discovered(&self, event: &PatternDiscovered) {
        self.fan_out(|h| h.on_pattern_discovered(event));
    }

    pub fn pattern_approved(&self, event: &PatternApproved) {
        self.fan_out(|h| h.on_pattern_approved(event));
    }

    pub fn violation_detected(&self, event: &ViolationDetected) {
        self.fan_out(|h| h.on_violation_detected(event));
    }

    pub fn convention_learned(&self, event: &ConventionLearned) {
        self.fan_out(|h| h.on_convention_learned(event));
    }

    pub fn constraint_violated(&self, event: &ConstraintViolated) {
        self.fan_out(|h| h.on_constraint_violated(event));
    }

    pub fn memory_created(&self, event: &MemoryCreated) {
        self.fan_out(|h| h.on_memory_created(event));
    }

    pub fn detector_alert(&self, event: &DetectorAlert) {
        self.fan_out(|h| h.on_detector_alert(event));
    }

    pub fn error(&self, event: &EngineError) {
        self.fan_out(|h| h.on_error(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        seen: AtomicUsize,
    }

    impl DriftEventHandler for Counting {
        fn on_scan_complete(&self, _event: &ScanComplete) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Panicking;

    impl DriftEventHandler for Panicking {
        fn on_scan_complete(&self, _event: &ScanComplete) {
            panic!("handler bug");
        }
    }

    fn complete_event() -> ScanComplete {
        ScanComplete {
            added: 1,
            modified: 0,
            deleted: 0,
            unchanged: 0,
            cancelled: false,
            duration_ms: 10,
        }
    }

    #[test]
    fn empty_dispatcher_is_a_no_op() {
        let dispatcher = EventDispatcher::new();
        dispatcher.scan_complete(&complete_event());
    }

    #[test]
    fn panicking_handler_does_not_block_others() {
        let counting = Arc::new(Counting {
            seen: AtomicUsize::new(0),
        });
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(Arc::new(Panicking));
        dispatcher.register(counting.clone());
        dispatcher.scan_complete(&complete_event());
        assert_eq!(counting.seen.load(Ordering::SeqCst), 1);
    }
}

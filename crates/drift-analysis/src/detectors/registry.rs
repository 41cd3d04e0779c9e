//! Detector registry.

use std::sync::Arc;

use crate::parsers::ParseResult;
use crate::scanner::Language;

use super::traits::Detector;
use super::{api, auth, data_access, errors, logging, naming, security, testing};

pub struct DetectorRegistry {
    detectors: Vec<Arc<dyn Detector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// The compiled-in default set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(naming::NamingDetector::new()));
        registry.register(Arc::new(errors::ErrorHandlingDetector));
        registry.register(Arc::new(testing::TestingDetector));
        registry.register(Arc::new(data_access::DataAccessDetector));
        registry.register(Arc::new(auth::AuthDetector));
        registry.register(Arc::new(security::SecurityStringsDetector::new()));
        registry.register(Arc::new(logging::LoggingDetector));
        registry.register(Arc::new(api::ApiRouteDetector));
        registry
    }

    pub fn register(&mut self, detector: Arc<dyn Detector>) {
        self.detectors.push(detector);
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Detectors applicable to a language.
    pub fn for_language(&self, language: Language) -> impl Iterator<Item = &Arc<dyn Detector>> {
        self.detectors.iter().filter(move |d| {
            d.languages()
                .map(|langs| langs.contains(&language))
                .unwrap_or(true)
        })
    }

    /// Run every Learning detector's first pass.
    pub fn learn_all(&self, project: &[ParseResult]) {
        for detector in &self.detectors {
            detector.learn(project);
        }
    }

    pub fn notify_file_change(&self, file: &str) {
        for detector in &self.detectors {
            detector.on_file_change(file);
        }
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

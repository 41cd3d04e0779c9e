//! Logging-style detection: raw console/print versus a structured logger.

use crate::engine::{pattern_id_for, DetectionContext, PatternCategory, PatternMatch};

use super::traits::{Detector, DetectorVariant};

const CONSOLE_RECEIVERS: &[&str] = &["console"];
const CONSOLE_CALLS: &[&str] = &["print", "println", "puts", "var_dump", "dbg"];
const LOGGER_RECEIVERS: &[&str] = &["logger", "log", "tracing", "slog", "winston", "pino"];

pub struct LoggingDetector;

impl Detector for LoggingDetector {
    fn id(&self) -> &'static str {
        "logging-style"
    }

    fn category(&self) -> PatternCategory {
        PatternCategory::Logging
    }

    fn variant(&self) -> DetectorVariant {
        DetectorVariant::Base
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<PatternMatch> {
        let mut matches = Vec::new();

        for call in &ctx.parse.call_sites {
            let receiver_tail = call
                .receiver
                .as_deref()
                .map(|r| r.rsplit('.').next().unwrap_or(r).to_lowercase());

            let body = match receiver_tail.as_deref() {
                Some(tail) if CONSOLE_RECEIVERS.contains(&tail) => Some("raw-console"),
                Some(tail) if LOGGER_RECEIVERS.iter().any(|l| tail == *l) => {
                    Some("structured-logger")
                }
                None if CONSOLE_CALLS.contains(&call.name.as_str()) => Some("raw-print"),
                _ => None,
            };

            if let Some(body) = body {
                matches.push(PatternMatch {
                    pattern_id: pattern_id_for(self.id(), body),
                    detector_id: self.id().to_string(),
                    category: self.category(),
                    file: ctx.file.to_string(),
                    line: call.line,
                    column: call.column,
                    confidence: 0.8,
                    snippet: Some(call.name.clone()),
                });
            }
        }

        matches
    }
}

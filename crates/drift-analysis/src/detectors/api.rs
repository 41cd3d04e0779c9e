//! API route detection across the common web frameworks.

use crate::engine::{pattern_id_for, DetectionContext, PatternCategory, PatternMatch};

use super::traits::{Detector, DetectorVariant};

const ROUTE_DECORATORS: &[&str] = &[
    "Get", "Post", "Put", "Delete", "Patch", "RequestMapping", "GetMapping", "PostMapping",
    "HttpGet", "HttpPost", "HttpPut", "HttpDelete", "Route", "route", "app.route",
];

const ROUTER_METHODS: &[&str] = &["get", "post", "put", "delete", "patch", "use", "all"];
const ROUTER_RECEIVERS: &[&str] = &["app", "router", "server", "api", "fastify"];

pub struct ApiRouteDetector;

impl ApiRouteDetector {
    /// Whether a function is an HTTP entry point, used for the entry-point
    /// flag persisted to the store.
    pub fn is_route_handler(decorators: &[String]) -> bool {
        decorators
            .iter()
            .any(|d| ROUTE_DECORATORS.iter().any(|m| route_marker_matches(d, m)))
    }
}

fn route_marker_matches(decorator: &str, marker: &str) -> bool {
    let trimmed = decorator.trim_start_matches(['@', '#', '[']);
    trimmed.starts_with(marker)
}

impl Detector for ApiRouteDetector {
    fn id(&self) -> &'static str {
        "api-routes"
    }

    fn category(&self) -> PatternCategory {
        PatternCategory::Api
    }

    fn variant(&self) -> DetectorVariant {
        DetectorVariant::Base
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<PatternMatch> {
        let mut matches = Vec::new();

        for deco in &ctx.parse.decorators {
            if ROUTE_DECORATORS
                .iter()
                .any(|m| route_marker_matches(&deco.raw, m))
            {
                matches.push(PatternMatch {
                    pattern_id: pattern_id_for(self.id(), "route-decorator"),
                    detector_id: self.id().to_string(),
                    category: self.category(),
                    file: ctx.file.to_string(),
                    line: deco.line,
                    column: 0,
                    confidence: 0.9,
                    snippet: Some(deco.raw.clone()),
                });
            }
        }

        // Express-style: router.get('/path', handler)
        for call in &ctx.parse.call_sites {
            let receiver_hit = call
                .receiver
                .as_deref()
                .map(|r| {
                    let tail = r.rsplit('.').next().unwrap_or(r).to_lowercase();
                    ROUTER_RECEIVERS.contains(&tail.as_str())
                })
                .unwrap_or(false);
            if receiver_hit && ROUTER_METHODS.contains(&call.name.as_str()) {
                matches.push(PatternMatch {
                    pattern_id: pattern_id_for(self.id(), "router-method"),
                    detector_id: self.id().to_string(),
                    category: self.category(),
                    file: ctx.file.to_string(),
                    line: call.line,
                    column: call.column,
                    confidence: 0.85,
                    snippet: Some(format!(
                        "{}.{}",
                        call.receiver.as_deref().unwrap_or(""),
                        call.name
                    )),
                });
            }
        }

        matches
    }
}

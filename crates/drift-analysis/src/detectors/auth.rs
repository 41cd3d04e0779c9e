//! Auth pattern detection: guard decorators, middleware, token checks.

use crate::engine::{pattern_id_for, DetectionContext, PatternCategory, PatternMatch};

use super::traits::{Detector, DetectorVariant};

const AUTH_DECORATORS: &[&str] = &[
    "UseGuards", "Authorized", "Authorize", "RequiresAuth", "login_required",
    "permission_required", "PreAuthorize", "Secured", "RolesAllowed",
];

const AUTH_CALLS: &[&str] = &[
    "authenticate", "authorize", "requireAuth", "ensureAuthenticated", "verifyToken",
    "checkPermission", "hasRole", "isAuthenticated", "verify",
];

const AUTH_RECEIVERS: &[&str] = &["jwt", "auth", "passport", "session", "oauth"];

pub struct AuthDetector;

impl AuthDetector {
    /// Whether a function looks like an auth handler, used for the
    /// function flag persisted to the store.
    pub fn is_auth_handler(decorators: &[String], name: &str) -> bool {
        decorators.iter().any(|d| {
            AUTH_DECORATORS
                .iter()
                .any(|marker| d.contains(marker))
        }) || AUTH_CALLS.iter().any(|c| name.eq_ignore_ascii_case(c))
    }
}

impl Detector for AuthDetector {
    fn id(&self) -> &'static str {
        "auth-guards"
    }

    fn category(&self) -> PatternCategory {
        PatternCategory::Auth
    }

    fn variant(&self) -> DetectorVariant {
        DetectorVariant::Base
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<PatternMatch> {
        let mut matches = Vec::new();

        for deco in &ctx.parse.decorators {
            if AUTH_DECORATORS.iter().any(|m| deco.name.contains(m)) {
                matches.push(PatternMatch {
                    pattern_id: pattern_id_for(self.id(), "guard-decorator"),
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

        for call in &ctx.parse.call_sites {
            let call_hit = AUTH_CALLS.contains(&call.name.as_str());
            let receiver_hit = call
                .receiver
                .as_deref()
                .map(|r| {
                    let tail = r.rsplit('.').next().unwrap_or(r).to_lowercase();
                    AUTH_RECEIVERS.iter().any(|hint| tail.contains(hint))
                })
                .unwrap_or(false);
            if call_hit || (receiver_hit && call.name == "verify") {
                matches.push(PatternMatch {
                    pattern_id: pattern_id_for(self.id(), "auth-call"),
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

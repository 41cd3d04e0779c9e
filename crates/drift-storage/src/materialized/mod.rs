//! Materialized "gold" summaries, rebuilt as the last transaction of a scan.
//!
//! Refresh order inside one `BEGIN IMMEDIATE`: security, then status (which
//! reads security's risk level), then a health-trend append. Once the
//! transaction commits, readers see one consistent snapshot.

mod security;
mod status;
mod trends;

use drift_core::errors::StorageError;

use crate::connection::Store;

pub use security::{load_security, refresh_security, SecuritySummary};
pub use status::{load_status, refresh_status, StatusSummary};
pub use trends::{append_trend, recent_trends, TrendRow};

/// Domains a scan can dirty. An empty set means nothing changed and the
/// refresh is skipped entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshDomains {
    pub files: bool,
    pub patterns: bool,
    pub violations: bool,
    pub security: bool,
}

impl RefreshDomains {
    pub fn all() -> Self {
        Self {
            files: true,
            patterns: true,
            violations: true,
            security: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.files || self.patterns || self.violations || self.security)
    }
}

/// Rebuild the gold layer. `domains` narrows the work for incremental
/// scans; anything security-adjacent forces the full ordered rebuild
/// because status depends on security.
pub fn refresh_gold(
    store: &Store,
    scan_id: i64,
    domains: RefreshDomains,
) -> Result<(), StorageError> {
    if domains.is_empty() {
        tracing::debug!(scan_id, "gold refresh skipped: no dirty domains");
        return Ok(());
    }

    store.with_write_tx(|tx| {
        let security = refresh_security(tx)?;
        let status = refresh_status(tx, &security)?;
        append_trend(tx, status.health_score, &security.risk_level, status.total_violations())?;
        tracing::info!(
            scan_id,
            health = status.health_score,
            risk = %security.risk_level,
            "gold layer refreshed"
        );
        Ok(())
    })
}

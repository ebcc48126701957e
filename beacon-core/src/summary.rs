use serde::{Deserialize, Serialize};

use crate::aggregate::AggregatedResult;

/// Population-level counts over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total: usize,
    pub http_ok: usize,
    pub https_ok: usize,
    pub ssl_ok: usize,
    /// All three channels OK.
    pub fully_healthy: usize,
    /// At least one channel OK, but not all.
    pub partially_healthy: usize,
    /// No channel OK.
    pub unhealthy: usize,
}

impl HealthSummary {
    pub fn from_results(results: &[AggregatedResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };

        for result in results {
            summary.http_ok += usize::from(result.http_status.is_ok());
            summary.https_ok += usize::from(result.https_status.is_ok());
            summary.ssl_ok += usize::from(result.ssl_status.is_ok());

            if result.is_fully_healthy() {
                summary.fully_healthy += 1;
            } else if result.is_partially_healthy() {
                summary.partially_healthy += 1;
            } else {
                summary.unhealthy += 1;
            }
        }

        summary
    }

    /// `count` as a percentage of the population; 0.0 when empty.
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }
}

//! Certificate expiry classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregatedResult, ChannelStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpirySeverity {
    Warning,
    Critical,
}

impl fmt::Display for ExpirySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpirySeverity::Warning => write!(f, "WARNING"),
            ExpirySeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A domain whose certificate expires inside the warning window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryWarning {
    pub domain: String,
    /// Negative when the certificate has already expired.
    pub days_remaining: i64,
    pub expiry_date: String,
    pub severity: ExpirySeverity,
}

/// Severity for a certificate `days` away from expiry, `None` outside the window.
pub fn classify_expiry(days: i64, warning_days: i64, critical_days: i64) -> Option<ExpirySeverity> {
    if days <= critical_days {
        Some(ExpirySeverity::Critical)
    } else if days <= warning_days {
        Some(ExpirySeverity::Warning)
    } else {
        None
    }
}

/// Warnings for every result with a valid certificate inside the window,
/// soonest-expiring first. The input order is left untouched.
pub fn collect_expiry_warnings(
    results: &[AggregatedResult],
    warning_days: i64,
    critical_days: i64,
) -> Vec<ExpiryWarning> {
    let mut warnings: Vec<ExpiryWarning> = results
        .iter()
        .filter(|r| r.ssl_status == ChannelStatus::Ok)
        .filter_map(|r| {
            let days = r.days_until_expiry?;
            let severity = classify_expiry(days, warning_days, critical_days)?;
            Some(ExpiryWarning {
                domain: r.domain.clone(),
                days_remaining: days,
                expiry_date: r
                    .ssl_expiry
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                severity,
            })
        })
        .collect();

    warnings.sort_by_key(|w| w.days_remaining);
    warnings
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::probe::TrialRecord;

/// Majority-vote verdict for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAIL")]
    Fail,
}

impl ChannelStatus {
    pub fn is_ok(self) -> bool {
        self == ChannelStatus::Ok
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelStatus::Ok => write!(f, "OK"),
            ChannelStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// Health verdict for one domain, reduced from all of its trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub domain: String,
    pub http_status: ChannelStatus,
    pub https_status: ChannelStatus,
    pub ssl_status: ChannelStatus,
    /// Percentage of trials (0-100) whose HTTP request returned 200.
    pub http_success_rate: f64,
    pub https_success_rate: f64,
    pub ssl_success_rate: f64,
    /// Expiry reported by the first trial that saw a valid certificate.
    pub ssl_expiry: Option<DateTime<Utc>>,
    /// Set only when `ssl_status` is OK and an expiry is known.
    pub days_until_expiry: Option<i64>,
    pub avg_http_latency_secs: Option<f64>,
    pub avg_https_latency_secs: Option<f64>,
    /// Every trial in execution order.
    pub trials: Vec<TrialRecord>,
}

impl AggregatedResult {
    pub fn is_fully_healthy(&self) -> bool {
        self.http_status.is_ok() && self.https_status.is_ok() && self.ssl_status.is_ok()
    }

    pub fn is_partially_healthy(&self) -> bool {
        let any = self.http_status.is_ok() || self.https_status.is_ok() || self.ssl_status.is_ok();
        any && !self.is_fully_healthy()
    }

    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }
}

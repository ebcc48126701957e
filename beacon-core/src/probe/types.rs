use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one HTTP or HTTPS request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChannelOutcome {
    /// Response status was exactly 200.
    Ok,
    /// A response arrived with another status.
    Failed { status: Option<u16> },
    /// No response: DNS, connect, TLS or timeout failure.
    Error { message: String },
}

impl ChannelOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ChannelOutcome::Ok)
    }
}

/// Result of one certificate inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SslOutcome {
    Valid { expiry: DateTime<Utc> },
    /// The handshake completed but the certificate is absent or outside its validity window.
    Invalid,
    Error { message: String },
}

impl SslOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, SslOutcome::Valid { .. })
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        match self {
            SslOutcome::Valid { expiry } => Some(*expiry),
            _ => None,
        }
    }
}

/// One probe execution against one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub domain: String,
    pub http: ChannelOutcome,
    pub https: ChannelOutcome,
    pub ssl: SslOutcome,
    /// Present whenever the HTTP request produced a response.
    pub http_latency_secs: Option<f64>,
    /// Present whenever the HTTPS request produced a response.
    pub https_latency_secs: Option<f64>,
}

impl TrialRecord {
    /// A trial in which every channel failed with the same error.
    pub fn failed(domain: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            domain: domain.into(),
            http: ChannelOutcome::Error {
                message: message.clone(),
            },
            https: ChannelOutcome::Error {
                message: message.clone(),
            },
            ssl: SslOutcome::Error { message },
            http_latency_secs: None,
            https_latency_secs: None,
        }
    }

    /// Whole days until this trial's certificate expires. Display only.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.ssl.expiry().map(|expiry| days_between(now, expiry))
    }
}

/// Floor of the difference in days; negative once `later` is in the past.
pub(crate) fn days_between(now: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later - now).num_seconds().div_euclid(86_400)
}

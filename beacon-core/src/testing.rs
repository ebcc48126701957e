//! Deterministic probe doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::time::Instant;

use crate::aggregate::Clock;
use crate::probe::{ChannelOutcome, Probe, SslOutcome, TrialRecord};

/// A trial where every channel succeeded.
pub fn trial(domain: &str) -> TrialRecord {
    TrialRecord {
        domain: domain.to_string(),
        http: ChannelOutcome::Ok,
        https: ChannelOutcome::Ok,
        ssl: SslOutcome::Valid {
            expiry: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        },
        http_latency_secs: Some(0.1),
        https_latency_secs: Some(0.2),
    }
}

pub fn frozen_clock(now: DateTime<Utc>) -> Clock {
    Arc::new(move || now)
}

#[derive(Default)]
struct FakeState {
    scripts: HashMap<String, Vec<TrialRecord>>,
    calls: HashMap<String, Vec<Instant>>,
    delays: HashMap<String, Duration>,
}

/// Replays canned trials per domain, cycling through the script.
///
/// Domains without a script get an all-error trial.
#[derive(Clone, Default)]
pub struct FakeProbe {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trials(self, domain: &str, trials: Vec<TrialRecord>) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripts
            .insert(domain.to_string(), trials);
        self
    }

    /// Make every probe of `domain` take `delay`.
    pub fn with_delay(self, domain: &str, delay: Duration) -> Self {
        self.state
            .lock()
            .unwrap()
            .delays
            .insert(domain.to_string(), delay);
        self
    }

    pub fn calls(&self, domain: &str) -> usize {
        self.call_instants(domain).len()
    }

    pub fn call_instants(&self, domain: &str) -> Vec<Instant> {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl Probe for FakeProbe {
    async fn probe(&self, domain: &str) -> TrialRecord {
        let (record, delay) = {
            let mut state = self.state.lock().unwrap();
            let index = {
                let calls = state.calls.entry(domain.to_string()).or_default();
                calls.push(Instant::now());
                calls.len() - 1
            };

            let record = match state.scripts.get(domain) {
                Some(script) if !script.is_empty() => {
                    let mut record = script[index % script.len()].clone();
                    record.domain = domain.to_string();
                    record
                }
                _ => TrialRecord::failed(domain, "no route to host"),
            };
            (record, state.delays.get(domain).copied())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        record
    }
}

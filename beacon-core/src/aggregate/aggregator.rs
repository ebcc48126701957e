use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{debug, info, instrument};

use super::types::{AggregatedResult, ChannelStatus};
use crate::config::CheckConfig;
use crate::probe::{days_between, Probe, TrialRecord};

/// Source of "now" for expiry arithmetic.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Runs a probe repeatedly against one domain and reduces the trials.
pub struct TrialAggregator<P> {
    probe: P,
    trial_count: usize,
    trial_delay: Duration,
    clock: Clock,
    cancel: Option<Arc<AtomicBool>>,
}

impl<P: Probe> TrialAggregator<P> {
    /// Aggregator using the wall clock and no cancellation.
    pub fn new(probe: P, config: &CheckConfig) -> Self {
        Self {
            probe,
            trial_count: config.trial_count,
            trial_delay: config.trial_delay,
            clock: Arc::new(Utc::now),
            cancel: None,
        }
    }

    /// Replace the wall clock, e.g. to freeze time in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Stop starting new trials once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn trial_count(&self) -> usize {
        self.trial_count
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Run every trial for `domain` and aggregate them.
    ///
    /// Returns `None` only when cancellation interrupted the trial sequence;
    /// an interrupted domain is never reported from partial trials.
    #[instrument(skip(self), fields(domain = %domain, trials = self.trial_count))]
    pub async fn check(&self, domain: &str) -> Option<AggregatedResult> {
        let trials = self.run_trials(domain).await?;
        let now = (self.clock)();
        let result = aggregate(domain, trials, now);

        info!(
            http = %result.http_status,
            https = %result.https_status,
            ssl = %result.ssl_status,
            "Domain checked"
        );
        Some(result)
    }

    async fn run_trials(&self, domain: &str) -> Option<Vec<TrialRecord>> {
        let mut trials = Vec::with_capacity(self.trial_count);

        for index in 0..self.trial_count {
            if self.is_cancelled() {
                debug!(completed = index, "Cancelled before trial");
                return None;
            }

            debug!(trial = index + 1, total = self.trial_count, "Running trial");
            trials.push(self.probe.probe(domain).await);

            if index + 1 < self.trial_count && !self.trial_delay.is_zero() {
                sleep(self.trial_delay).await;
            }
        }

        Some(trials)
    }
}

/// Reduce trials into a single verdict.
///
/// Total over any mix of outcomes: a domain whose every trial errored still
/// yields a result, with every channel FAIL and no latency or expiry data.
pub fn aggregate(domain: &str, trials: Vec<TrialRecord>, now: DateTime<Utc>) -> AggregatedResult {
    let total = trials.len();

    let http_ok = trials.iter().filter(|t| t.http.is_ok()).count();
    let https_ok = trials.iter().filter(|t| t.https.is_ok()).count();
    let ssl_ok = trials.iter().filter(|t| t.ssl.is_valid()).count();

    let ssl_status = majority_vote(ssl_ok, total);
    let ssl_expiry = trials.iter().find_map(|t| t.ssl.expiry());
    let days_until_expiry = match (ssl_status, ssl_expiry) {
        (ChannelStatus::Ok, Some(expiry)) => Some(days_between(now, expiry)),
        _ => None,
    };

    AggregatedResult {
        domain: domain.to_string(),
        http_status: majority_vote(http_ok, total),
        https_status: majority_vote(https_ok, total),
        ssl_status,
        http_success_rate: success_rate(http_ok, total),
        https_success_rate: success_rate(https_ok, total),
        ssl_success_rate: success_rate(ssl_ok, total),
        ssl_expiry,
        days_until_expiry,
        avg_http_latency_secs: mean(trials.iter().filter_map(|t| t.http_latency_secs)),
        avg_https_latency_secs: mean(trials.iter().filter_map(|t| t.https_latency_secs)),
        trials,
    }
}

/// OK when `successes >= total / 2` in real division.
///
/// For odd totals this needs a strict majority (3 of 5); for even totals
/// exactly half is enough (2 of 4).
pub fn majority_vote(successes: usize, total: usize) -> ChannelStatus {
    if total > 0 && successes as f64 >= total as f64 / 2.0 {
        ChannelStatus::Ok
    } else {
        ChannelStatus::Fail
    }
}

pub fn success_rate(successes: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    successes as f64 / total as f64 * 100.0
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::{AggregatedResult, Clock, TrialAggregator};
use crate::config::CheckConfig;
use crate::error::Result;
use crate::expiry::{collect_expiry_warnings, ExpiryWarning};
use crate::probe::{HttpProbe, Probe};
use crate::summary::HealthSummary;

pub type ProgressCallback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Everything a run produces, handed to the reporting formatters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub trial_count: usize,
    pub warning_days: i64,
    pub critical_days: i64,
    /// One entry per checked domain, in input order.
    pub results: Vec<AggregatedResult>,
    /// Soonest-expiring first.
    pub expiry_warnings: Vec<ExpiryWarning>,
    pub summary: HealthSummary,
    /// Domains not checked because the run was cancelled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

/// Drives the trial aggregator over a whole domain list.
pub struct BatchRunner<P> {
    aggregator: TrialAggregator<P>,
    concurrency: usize,
    warning_days: i64,
    critical_days: i64,
    clock: Clock,
    cancel: Arc<AtomicBool>,
}

impl BatchRunner<HttpProbe> {
    /// Runner backed by the network probe.
    pub fn from_config(config: &CheckConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(HttpProbe::new(config)?, config))
    }
}

impl<P: Probe> BatchRunner<P> {
    /// Runner over any [`Probe`], with its own cancellation flag.
    pub fn new(probe: P, config: &CheckConfig) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let clock: Clock = Arc::new(Utc::now);
        let aggregator = TrialAggregator::new(probe, config)
            .with_clock(clock.clone())
            .with_cancel_flag(cancel.clone());

        Self {
            aggregator,
            concurrency: config.concurrency.max(1),
            warning_days: config.warning_days,
            critical_days: config.critical_days,
            clock,
            cancel,
        }
    }

    /// Replace the clock used for expiry days and the report timestamp.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.aggregator = self.aggregator.with_clock(clock.clone());
        self.clock = clock;
        self
    }

    /// Share an externally owned cancellation flag (e.g. set from a signal handler).
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.aggregator = self.aggregator.with_cancel_flag(flag.clone());
        self.cancel = flag;
        self
    }

    /// Setting this flag stops the run from starting new domains or trials.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Check every domain and classify certificate expiry.
    ///
    /// Up to `concurrency` domains run at once, each with its own sequential,
    /// paced trials. Results come back in input order regardless of
    /// completion order.
    pub async fn run(&self, domains: Vec<String>, progress: Option<ProgressCallback>) -> BatchReport {
        let total = domains.len();
        let completed = Arc::new(AtomicUsize::new(0));

        info!(
            total = total,
            concurrency = self.concurrency,
            trials = self.aggregator.trial_count(),
            "Starting batch run"
        );

        let mut outcomes: Vec<(usize, String, Option<AggregatedResult>)> =
            stream::iter(domains.into_iter().enumerate())
                .map(|(index, domain)| {
                    let completed = completed.clone();
                    let progress = progress.as_ref();
                    let aggregator = &self.aggregator;

                    async move {
                        if aggregator.is_cancelled() {
                            return (index, domain, None);
                        }

                        let result = aggregator.check(&domain).await;

                        if result.is_some() {
                            let count = completed.fetch_add(1, Ordering::Relaxed) + 1;
                            if let Some(progress) = progress {
                                progress(count, total, &domain);
                            }
                        }

                        (index, domain, result)
                    }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut results = Vec::with_capacity(total);
        let mut skipped = Vec::new();
        for (_, domain, result) in outcomes {
            match result {
                Some(result) => results.push(result),
                None => skipped.push(domain),
            }
        }

        if !skipped.is_empty() {
            warn!(skipped = skipped.len(), "Run cancelled before every domain was checked");
        }

        let expiry_warnings =
            collect_expiry_warnings(&results, self.warning_days, self.critical_days);
        let summary = HealthSummary::from_results(&results);

        debug!(
            checked = results.len(),
            warnings = expiry_warnings.len(),
            "Batch run finished"
        );

        BatchReport {
            generated_at: (self.clock)(),
            trial_count: self.aggregator.trial_count(),
            warning_days: self.warning_days,
            critical_days: self.critical_days,
            results,
            expiry_warnings,
            summary,
            skipped,
        }
    }
}

/// One domain per line; surrounding whitespace trimmed and blank lines dropped.
pub fn parse_domains_from_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn read_domains_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_domains_from_file(&content))
}

pub mod aggregate;
pub mod bulk;
pub mod colors;
pub mod config;
pub mod error;
pub mod expiry;
pub mod output;
pub mod probe;
pub mod summary;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{BeaconError, Result};
pub use validation::ProbeTargets;

pub use aggregate::{AggregatedResult, ChannelStatus, TrialAggregator};
pub use bulk::{BatchReport, BatchRunner};
pub use config::CheckConfig;
pub use expiry::{ExpirySeverity, ExpiryWarning};
pub use output::{OutputFormat, OutputFormatter};
pub use probe::{ChannelOutcome, HttpProbe, Probe, SslOutcome, TrialRecord};
pub use summary::HealthSummary;

//! Single-trial probing.
//!
//! A probe issues one HTTP GET, one HTTPS GET and one TLS certificate fetch
//! for a domain and reports the three outcomes as a [`TrialRecord`]. Probes
//! never retry and never return errors; repetition and aggregation happen in
//! [`crate::aggregate`].

mod client;
mod types;

pub use client::{HttpProbe, Probe};
pub use types::{ChannelOutcome, SslOutcome, TrialRecord};

pub(crate) use types::days_between;

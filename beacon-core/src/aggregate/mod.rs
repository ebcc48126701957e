//! Multi-trial aggregation.
//!
//! Each domain is probed a configured number of times, paced by a fixed delay,
//! and the trials are reduced into one [`AggregatedResult`] by majority vote.

mod aggregator;
mod types;

pub use aggregator::{aggregate, majority_vote, success_rate, Clock, TrialAggregator};
pub use types::{AggregatedResult, ChannelStatus};

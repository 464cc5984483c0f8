//! Reducing classified commits to a single bump decision

pub mod aggregator;

pub use aggregator::{aggregate, Aggregation, AggregationConfig};

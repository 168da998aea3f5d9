// Score aggregation: reduce a gap classification to one alignment percentage.

pub mod alignment;

pub use alignment::{alignment_score, AggregationPolicy};

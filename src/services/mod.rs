pub mod aggregation;
pub mod metrics;
pub mod ratings;
pub mod sessions;
pub mod store;

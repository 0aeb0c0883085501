pub mod bid_packages;
pub mod contractors;
pub mod criteria_sets;
pub mod evaluations;
pub mod files;
pub mod liveness;
pub mod readiness;

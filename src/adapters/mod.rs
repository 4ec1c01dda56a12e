// Adapters layer: concrete implementations of the domain ports (local files, estimation providers).

pub mod estimator;
pub mod storage;

pub use estimator::{EstimationAdapter, EstimationSettings, HttpEstimator, LocalEstimator};
pub use storage::LocalStorage;

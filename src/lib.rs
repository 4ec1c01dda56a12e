pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{EstimationAdapter, LocalStorage};
pub use config::CatalogConfig;
pub use crate::core::{
    aggregator::{classify_complexity, classify_risk, compute_totals, Policies},
    catalog::Catalog,
    engine::{Configurator, ToggleOutcome},
    validator::{validate_module_action, validate_module_deselect, validate_package_action},
};
pub use utils::error::{Result, ScopeError};

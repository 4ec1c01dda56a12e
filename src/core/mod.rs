pub mod aggregator;
pub mod catalog;
pub mod engine;
pub mod validator;

pub use crate::domain::model::{Package, SelectionSnapshot, Totals, ValidationResult};
pub use crate::domain::ports::{Estimator, Storage};
pub use crate::utils::error::Result;

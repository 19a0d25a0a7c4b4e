//! # Store Math
//!
//! Numeric building blocks for store-level sales analysis.
//! This crate provides descriptive statistics, feature standardization and a
//! seeded k-means implementation used to segment stores by sales behavior.

use thiserror::Error;

pub mod clustering;
pub mod stats;

pub use crate::clustering::{kmeans, KMeansConfig, KMeansResult};
pub use crate::stats::{max, mean, population_std_dev, sample_std_dev, standardize_columns};

/// Errors that can occur in store statistics calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for store math operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_problem() {
        let err = MathError::InsufficientData("need 3 points, have 2".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 3 points, have 2"
        );
    }
}

//! Descriptive statistics over sales series
//!
//! Contains the aggregate measures used to describe a store:
//! - Mean and maximum
//! - Sample and population standard deviation
//! - Column-wise standardization (z-scores)

use crate::{MathError, Result};

/// Arithmetic mean of the values
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute the mean of an empty series".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Largest value in the series
pub fn max(values: &[f64]) -> Result<f64> {
    values
        .iter()
        .copied()
        .fold(None, |acc: Option<f64>, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
        .ok_or_else(|| {
            MathError::InsufficientData("Cannot compute the maximum of an empty series".to_string())
        })
}

/// Sample standard deviation (`n - 1` denominator).
///
/// Returns `None` when fewer than two values are available, where the
/// statistic is undefined.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;

    Some(variance.sqrt())
}

/// Population standard deviation (`n` denominator)
pub fn population_std_dev(values: &[f64]) -> Result<f64> {
    let avg = mean(values)?;
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;

    Ok(variance.sqrt())
}

/// Standardize every column of a row-major feature matrix to zero mean and
/// unit (population) variance.
///
/// A constant column has no spread to scale by; it is centered only, which
/// leaves it at zero for every row.
pub fn standardize_columns(rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let width = first.len();

    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(MathError::InvalidInput(format!(
            "Row {} has {} features, expected {}",
            i,
            row.len(),
            width
        )));
    }

    let mut scaled = rows.to_vec();
    for col in 0..width {
        let column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
        let avg = mean(&column)?;
        let spread = population_std_dev(&column)?;

        if !avg.is_finite() || !spread.is_finite() {
            return Err(MathError::CalculationError(format!(
                "Feature column {} contains non-finite values",
                col
            )));
        }

        for row in scaled.iter_mut() {
            let centered = row[col] - avg;
            row[col] = if spread > 0.0 { centered / spread } else { 0.0 };
        }
    }

    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_max() {
        let values = [10.0, 20.0, 30.0, 40.0];
        assert_relative_eq!(mean(&values).unwrap(), 25.0);
        assert_relative_eq!(max(&values).unwrap(), 40.0);

        assert!(mean(&[]).is_err());
        assert!(max(&[]).is_err());
    }

    #[test]
    fn test_sample_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // Sum of squares is 32 over 7 degrees of freedom
        assert_relative_eq!(
            sample_std_dev(&values).unwrap(),
            (32.0_f64 / 7.0).sqrt(),
            epsilon = 1e-12
        );

        assert_eq!(sample_std_dev(&[5.0]), None);
        assert_eq!(sample_std_dev(&[]), None);
    }

    #[test]
    fn test_population_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(population_std_dev(&values).unwrap(), 2.0);
    }

    #[test]
    fn test_standardize_columns() {
        let rows = vec![
            vec![10.0, 1.0, 0.5],
            vec![20.0, 1.0, 0.5],
            vec![30.0, 1.0, 0.5],
        ];
        let scaled = standardize_columns(&rows).unwrap();

        let first: Vec<f64> = scaled.iter().map(|r| r[0]).collect();
        assert_relative_eq!(mean(&first).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(population_std_dev(&first).unwrap(), 1.0, epsilon = 1e-12);

        // Constant columns collapse to zero
        assert!(scaled.iter().all(|r| r[1] == 0.0 && r[2] == 0.0));
    }

    #[test]
    fn test_standardize_rejects_ragged_rows() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            standardize_columns(&rows),
            Err(MathError::InvalidInput(_))
        ));
    }
}

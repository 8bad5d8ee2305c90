//! Z-score standardisation of the numeric feature block.

use serde::{Deserialize, Serialize};
use tripweaver_core::NUMERIC_FEATURES;

const WIDTH: usize = NUMERIC_FEATURES.len();

/// Standardises each numeric column with the training mean and population
/// standard deviation. Constant columns are centred but not scaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: [f64; WIDTH],
    scale: [f64; WIDTH],
}

#[expect(
    clippy::cast_precision_loss,
    reason = "corpus sizes are far below 2^52"
)]
fn as_count(n: usize) -> f64 {
    n as f64
}

impl StandardScaler {
    /// Compute frozen statistics from `rows`.
    ///
    /// An empty slice yields zero means and unit scales.
    #[must_use]
    pub fn fit(rows: &[[f64; WIDTH]]) -> Self {
        let mut mean = [0.0; WIDTH];
        let mut scale = [1.0; WIDTH];
        if rows.is_empty() {
            return Self { mean, scale };
        }
        let n = as_count(rows.len());
        for (col, (m, s)) in mean.iter_mut().zip(scale.iter_mut()).enumerate() {
            let column = || rows.iter().filter_map(move |row| row.get(col).copied());
            *m = column().sum::<f64>() / n;
            let variance = column().map(|v| (v - *m).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();
            *s = if std > 0.0 && std.is_finite() { std } else { 1.0 };
        }
        Self { mean, scale }
    }

    /// Append the standardised `row` to `out`.
    pub fn transform_into(&self, row: &[f64; WIDTH], out: &mut Vec<f64>) {
        out.extend(
            row.iter()
                .zip(self.mean.iter().zip(self.scale.iter()))
                .map(|(value, (mean, scale))| (value - mean) / scale),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(first: f64) -> [f64; WIDTH] {
        let mut row = [0.0; WIDTH];
        row[0] = first;
        row
    }

    #[rstest]
    fn uses_population_variance() {
        let scaler = StandardScaler::fit(&[row(1.0), row(3.0)]);
        let mut out = Vec::new();
        scaler.transform_into(&row(3.0), &mut out);
        assert!((out[0] - 1.0).abs() < 1e-12);
    }

    #[rstest]
    fn constant_columns_are_centred_only() {
        let scaler = StandardScaler::fit(&[row(2.0), row(2.0)]);
        let mut out = Vec::new();
        scaler.transform_into(&row(5.0), &mut out);
        assert!((out[0] - 3.0).abs() < 1e-12);
        assert!(out[1..].iter().all(|v| *v == 0.0));
    }
}

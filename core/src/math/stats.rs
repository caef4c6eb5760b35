use serde::{Deserialize, Serialize};

/// Divisor convention for the standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StdDevMode {
    /// Divides by `n - 1`; fewer than two points yield zero.
    Sample,
    /// Divides by `n`; an empty window yields zero.
    Population,
}

pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Two-pass standard deviation: mean first, then squared deviations.
    ///
    /// A window holding one repeated value has exactly zero spread; the
    /// rounded mean of such a window can sit a few ULPs off the value.
    pub fn stddev(values: &[f64], mode: StdDevMode) -> f64 {
        let divisor = match mode {
            StdDevMode::Sample if values.len() < 2 => return 0.0,
            StdDevMode::Population if values.is_empty() => return 0.0,
            StdDevMode::Sample => (values.len() - 1) as f64,
            StdDevMode::Population => values.len() as f64,
        };
        if values.iter().all(|&v| v == values[0]) {
            return 0.0;
        }
        let mean = Self::mean(values);
        let sum_sq: f64 = values.iter().map(|&v| (v - mean) * (v - mean)).sum();
        (sum_sq / divisor).sqrt()
    }

    pub fn sample_stddev(values: &[f64]) -> f64 {
        Self::stddev(values, StdDevMode::Sample)
    }

    pub fn population_stddev(values: &[f64]) -> f64 {
        Self::stddev(values, StdDevMode::Population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_window_has_zero_spread() {
        assert_eq!(StatsHelper::sample_stddev(&[4.2; 30]), 0.0);
        assert_eq!(StatsHelper::population_stddev(&[4.2; 5]), 0.0);
    }

    #[test]
    fn repeated_non_dyadic_values_are_exactly_flat() {
        for value in [4.2, 0.1, 0.7, 1.1, 12.345, 100.037, -3.3] {
            for len in [2, 5, 30, 31] {
                let window = vec![value; len];
                assert_eq!(StatsHelper::sample_stddev(&window), 0.0, "{} x {}", value, len);
                assert_eq!(StatsHelper::population_stddev(&window), 0.0, "{} x {}", value, len);
            }
        }
    }

    #[test]
    fn one_outlier_still_spreads() {
        let mut window = vec![4.2; 30];
        window[29] = 4.3;
        assert!(StatsHelper::sample_stddev(&window) > 0.0);
    }

    #[test]
    fn short_windows_are_guarded() {
        assert_eq!(StatsHelper::sample_stddev(&[]), 0.0);
        assert_eq!(StatsHelper::sample_stddev(&[7.0]), 0.0);
        assert_eq!(StatsHelper::population_stddev(&[]), 0.0);
        assert_eq!(StatsHelper::population_stddev(&[7.0]), 0.0);
    }

    #[test]
    fn reference_values_for_one_to_five() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(StatsHelper::population_stddev(&values), 2.0_f64.sqrt());
        assert_eq!(StatsHelper::sample_stddev(&values), 2.5_f64.sqrt());
        assert!((StatsHelper::population_stddev(&values) - 1.414).abs() < 1e-3);
        assert!((StatsHelper::sample_stddev(&values) - 1.581).abs() < 1e-3);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(StatsHelper::mean(&[]), 0.0);
        assert_eq!(StatsHelper::mean(&[1.0, 3.0]), 2.0);
    }
}

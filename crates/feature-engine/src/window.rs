//! Shift and trailing-window aggregates over one group's series

/// Value `offset` observations earlier in the series.
///
/// The first `offset` positions have no prior value and are `None`.
pub fn lag(values: &[Option<f64>], offset: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| if i >= offset { values[i - offset] } else { None })
        .collect()
}

/// Mean of the `window` observations strictly before each position.
///
/// The current value never contributes. A position with fewer than
/// `window` prior observations, or with a missing value inside its window,
/// yields `None`.
pub fn shifted_rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i < window {
                return None;
            }
            let sum = values[i - window..i]
                .iter()
                .try_fold(0.0, |acc, v| (*v).map(|x| acc + x))?;
            Some(sum / window as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(n: usize) -> Vec<Option<f64>> {
        (0..n).map(|i| Some(i as f64)).collect()
    }

    #[test]
    fn test_lag() {
        let lagged = lag(&series(4), 1);
        assert_eq!(lagged, vec![None, Some(0.0), Some(1.0), Some(2.0)]);
        assert_eq!(lag(&series(3), 7), vec![None; 3]);
    }

    #[test]
    fn test_rolling_excludes_current_row() {
        let means = shifted_rolling_mean(&series(9), 7);
        assert_eq!(&means[..7], &[None; 7]);
        // rows 0..7 -> mean 3.0, rows 1..8 -> mean 4.0
        assert_eq!(means[7], Some(3.0));
        assert_eq!(means[8], Some(4.0));
    }

    #[test]
    fn test_rolling_missing_in_window() {
        let mut values = series(9);
        values[2] = None;
        let means = shifted_rolling_mean(&values, 7);
        assert_eq!(means[7], None);
        assert_eq!(means[8], None);
    }

    #[test]
    fn test_single_row() {
        assert_eq!(shifted_rolling_mean(&[Some(5.0)], 7), vec![None]);
        assert_eq!(lag(&[Some(5.0)], 1), vec![None]);
        assert!(shifted_rolling_mean(&[], 7).is_empty());
    }
}

//! Cross-sectional statistics over partially defined columns.
//!
//! `None` and non-finite entries are undefined: they are excluded from the
//! mean and the population standard deviation (N counts defined values only)
//! and come out of `zscore` as `None`.

fn defined(values: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    values.iter().flatten().copied().filter(|v| v.is_finite())
}

/// Arithmetic mean of the defined values, `None` if there are none.
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, n) = defined(values).fold((0.0_f64, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}

/// Population standard deviation (divide by N) of the defined values.
pub fn population_stddev(values: &[Option<f64>]) -> Option<f64> {
    let mu = mean(values)?;
    let (sq, n) = defined(values).fold((0.0_f64, 0usize), |(s, n), v| (s + (v - mu).powi(2), n + 1));
    Some((sq / n as f64).sqrt())
}

/// `(x - mean) / stddev` per entry. A zero stddev is replaced by 1.
pub fn zscore(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let Some(mu) = mean(values) else {
        return vec![None; values.len()];
    };
    let sd = match population_stddev(values) {
        Some(sd) if sd != 0.0 => sd,
        _ => 1.0,
    };
    values
        .iter()
        .map(|v| v.filter(|x| x.is_finite()).map(|x| (x - mu) / sd))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn mean_skips_missing() {
        let m = mean(&[Some(1.0), None, Some(3.0)]).unwrap();
        assert_abs_diff_eq!(m, 2.0);
    }

    #[test]
    fn mean_of_all_missing_is_none() {
        assert!(mean(&[None, None]).is_none());
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn stddev_is_population() {
        // 2,4,4,4,5,5,7,9 has population stddev 2 (sample stddev ~2.14)
        let values: Vec<Option<f64>> = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .iter()
            .map(|&v| Some(v))
            .collect();
        assert_abs_diff_eq!(population_stddev(&values).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn zscore_constant_column_is_all_zero() {
        let z = zscore(&[Some(0.3), Some(0.3), Some(0.3)]);
        for v in z {
            let v = v.unwrap();
            assert!(v.is_finite());
            assert_abs_diff_eq!(v, 0.0);
        }
    }

    #[test]
    fn zscore_single_value_is_zero() {
        assert_eq!(zscore(&[Some(42.0)]), vec![Some(0.0)]);
    }

    #[test]
    fn zscore_keeps_missing_entries_missing() {
        let z = zscore(&[Some(1.0), None, Some(3.0)]);
        assert!(z[1].is_none());
        assert_abs_diff_eq!(z[0].unwrap(), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(z[2].unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn non_finite_entries_are_undefined() {
        let values = [Some(1.0), Some(f64::NAN), Some(3.0), Some(f64::INFINITY)];
        assert_abs_diff_eq!(mean(&values).unwrap(), 2.0);
        assert_abs_diff_eq!(population_stddev(&values).unwrap(), 1.0);

        let z = zscore(&values);
        assert_abs_diff_eq!(z[0].unwrap(), -1.0, epsilon = 1e-12);
        assert!(z[1].is_none());
        assert_abs_diff_eq!(z[2].unwrap(), 1.0, epsilon = 1e-12);
        assert!(z[3].is_none());
    }

    #[test]
    fn zscore_all_missing_stays_missing() {
        assert_eq!(zscore(&[None, None]), vec![None, None]);
    }

    #[test]
    fn zscore_empty_column() {
        assert!(zscore(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn zscore_has_zero_mean_and_unit_stddev(
            xs in prop::collection::vec(-1.0e3f64..1.0e3, 2..40)
        ) {
            let values: Vec<Option<f64>> = xs.iter().map(|&x| Some(x)).collect();
            prop_assume!(population_stddev(&values).unwrap() > 1.0);

            let z = zscore(&values);
            let m = mean(&z).unwrap();
            let sd = population_stddev(&z).unwrap();
            prop_assert!(m.abs() < 1e-9);
            prop_assert!((sd - 1.0).abs() < 1e-9);
        }
    }
}

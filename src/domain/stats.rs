use statrs::statistics::{Data, Distribution};

/// Descriptive statistics over report columns.
///
/// Every function ignores non-finite values, matching how missing cells are skipped
/// when a report is summarised.
pub struct Stats;

impl Stats {
    fn finite(values: &[f64]) -> Vec<f64> {
        values.iter().copied().filter(|v| v.is_finite()).collect()
    }

    pub fn mean(values: &[f64]) -> Option<f64> {
        let finite = Self::finite(values);
        if finite.is_empty() {
            return None;
        }
        Data::new(finite).mean()
    }

    /// Sample standard deviation (n - 1 denominator).
    pub fn std_dev(values: &[f64]) -> Option<f64> {
        let finite = Self::finite(values);
        if finite.len() < 2 {
            return None;
        }
        Data::new(finite).std_dev()
    }

    pub fn min(values: &[f64]) -> Option<f64> {
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
    }

    pub fn max(values: &[f64]) -> Option<f64> {
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// Sample variance, 0.0 for fewer than two values.
    pub fn sample_variance(values: &[f64]) -> f64 {
        let finite = Self::finite(values);
        if finite.len() <= 1 {
            return 0.0;
        }
        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let sum_sq: f64 = finite.iter().map(|v| (v - mean) * (v - mean)).sum();
        sum_sq / (n - 1.0)
    }

    /// Pearson correlation over pairwise-complete observations.
    ///
    /// Returns `None` for fewer than two pairs or when either side is constant.
    pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
        let pairs: Vec<(f64, f64)> = x
            .iter()
            .zip(y)
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .map(|(a, b)| (*a, *b))
            .collect();
        if pairs.len() < 2 {
            return None;
        }

        let n = pairs.len() as f64;
        let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
        let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for (a, b) in &pairs {
            let dx = a - mean_x;
            let dy = b - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x <= 1e-12 || var_y <= 1e-12 {
            return None;
        }
        Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
    }

    /// Equal-width histogram over the data range.
    ///
    /// Returns `(bin_start, bin_width, count)` triples. The maximum value lands in the
    /// last bin; a degenerate range is widened by 0.5 on each side.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
        let (Some(mut lo), Some(mut hi)) = (Self::min(values), Self::max(values)) else {
            return Vec::new();
        };
        if bins == 0 {
            return Vec::new();
        }
        if (hi - lo).abs() < f64::EPSILON {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0usize; bins];
        for v in values.iter().filter(|v| v.is_finite()) {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| (lo + i as f64 * width, width, count))
            .collect()
    }

    /// Share of the total spend already used, in percent.
    pub fn budget_utilization(total_cost: f64, available_budget: f64) -> f64 {
        let pct = total_cost / (total_cost + available_budget) * 100.0;
        if pct.is_finite() { pct } else { f64::NAN }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std_skip_missing() {
        let values = vec![2.0, 4.0, f64::NAN, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((Stats::mean(&values).unwrap() - 5.0).abs() < 1e-9);
        // sample std of the eight finite values
        assert!((Stats::std_dev(&values).unwrap() - 2.138089935).abs() < 1e-6);
        assert_eq!(Stats::std_dev(&[1.0]), None);
        assert_eq!(Stats::mean(&[]), None);
    }

    #[test]
    fn test_min_max() {
        let values = vec![3.0, f64::NAN, -1.0, 8.5];
        assert_eq!(Stats::min(&values), Some(-1.0));
        assert_eq!(Stats::max(&values), Some(8.5));
        assert_eq!(Stats::max(&[f64::NAN]), None);
    }

    #[test]
    fn test_sample_variance() {
        assert_eq!(Stats::sample_variance(&[10.0]), 0.0);
        assert!((Stats::sample_variance(&[10.0, 20.0, 30.0]) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y = vec![2.0, 4.0, 6.0, 8.0];
        assert!((Stats::pearson(&x, &y).unwrap() - 1.0).abs() < 1e-9);

        let inverse = vec![8.0, 6.0, 4.0, 2.0];
        assert!((Stats::pearson(&x, &inverse).unwrap() + 1.0).abs() < 1e-9);

        let constant = vec![5.0, 5.0, 5.0, 5.0];
        assert_eq!(Stats::pearson(&x, &constant), None);
    }

    #[test]
    fn test_pearson_uses_complete_pairs_only() {
        let x = vec![1.0, 2.0, f64::NAN, 3.0];
        let y = vec![1.0, 2.0, 100.0, 3.0];
        assert!((Stats::pearson(&x, &y).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_histogram_bins() {
        let values = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let bins = Stats::histogram(&values, 4);
        assert_eq!(bins.len(), 4);
        let counts: Vec<usize> = bins.iter().map(|(_, _, c)| *c).collect();
        assert_eq!(counts, vec![1, 1, 1, 2]);
        assert_eq!(counts.iter().sum::<usize>(), values.len());
        assert!((bins[0].0 - 0.0).abs() < 1e-12);
        assert!((bins[0].1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_constant_values() {
        let bins = Stats::histogram(&[3.0, 3.0, 3.0], 3);
        assert_eq!(bins.iter().map(|(_, _, c)| c).sum::<usize>(), 3);
        assert!((bins[0].0 - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_budget_utilization() {
        assert!((Stats::budget_utilization(25.0, 75.0) - 25.0).abs() < 1e-9);
        assert!(Stats::budget_utilization(0.0, 0.0).is_nan());
    }
}

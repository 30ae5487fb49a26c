use std::f64::consts::PI;

use crate::analyzers::types::{Distribution, HistogramBin};
use crate::analyzers::utility::{mean, stddev};
use crate::filter::FilteredView;
use crate::schema::Measure;

pub const HISTOGRAM_BINS: usize = 30;

/// Number of points the density curve is evaluated at.
pub const KDE_GRID_POINTS: usize = 200;

/// Histogram and density curve for one measure of the view.
pub fn distribution(view: &FilteredView, measure: Measure, bins: usize) -> Distribution {
    let values: Vec<f64> = view.readings.iter().filter_map(|r| r.value(measure)).collect();
    let bins = histogram(&values, bins);
    let width = bins.first().map(|b| b.upper - b.lower).unwrap_or(0.0);

    Distribution {
        measure,
        kde: kde_counts(&values, width),
        bins,
    }
}

/// Equal-width bins over `[min, max]`. The last bin is closed on the right.
/// A constant sample is spread over `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

/// Gaussian kernel density with Scott's bandwidth, scaled so its area
/// matches a histogram of the same values with bins of `bin_width`.
///
/// Evaluated over the observed range only; empty when the sample is too
/// small or constant.
pub fn kde_counts(values: &[f64], bin_width: f64) -> Vec<(f64, f64)> {
    let Some(avg) = mean(values) else {
        return Vec::new();
    };
    let Some(sd) = stddev(values, avg) else {
        return Vec::new();
    };
    if sd == 0.0 {
        return Vec::new();
    }

    let n = values.len() as f64;
    let bandwidth = sd * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (hi - lo) / (KDE_GRID_POINTS - 1) as f64;

    (0..KDE_GRID_POINTS)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density * n * bin_width)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_every_value() {
        let values: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        let bins = histogram(&values, HISTOGRAM_BINS);

        assert_eq!(bins.len(), 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 101);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[29].upper, 100.0);
        // the maximum lands in the last bin
        assert!(bins[29].count >= 1);
    }

    #[test]
    fn test_histogram_constant_sample() {
        let bins = histogram(&[5.0, 5.0, 5.0], 2);
        assert_eq!(bins[0].lower, 4.5);
        assert_eq!(bins[1].upper, 5.5);
        assert_eq!(bins[0].count + bins[1].count, 3);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[], 30).is_empty());
    }

    #[test]
    fn test_kde_is_positive_over_range() {
        let values = [1.0, 2.0, 2.5, 3.0, 7.0];
        let curve = kde_counts(&values, 0.5);

        assert_eq!(curve.len(), KDE_GRID_POINTS);
        assert_eq!(curve[0].0, 1.0);
        assert!((curve[KDE_GRID_POINTS - 1].0 - 7.0).abs() < 1e-9);
        assert!(curve.iter().all(|(_, y)| *y > 0.0));
    }

    #[test]
    fn test_kde_needs_spread() {
        assert!(kde_counts(&[4.0], 1.0).is_empty());
        assert!(kde_counts(&[4.0, 4.0], 1.0).is_empty());
    }
}

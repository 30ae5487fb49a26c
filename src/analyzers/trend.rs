use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

use crate::analyzers::types::TrendLine;
use crate::filter::FilteredView;
use crate::schema::{Measure, Reading};

/// Share of rows drawn for the weather scatter plots.
pub const SAMPLE_FRACTION: f64 = 0.1;

/// Fixed seed so the same selection always shows the same points.
pub const SAMPLE_SEED: u64 = 42;

/// Deterministic random sample of `round(fraction * n)` rows, in file order.
pub fn sample_rows<'a>(view: &'a FilteredView, fraction: f64, seed: u64) -> Vec<&'a Reading> {
    let n = view.len();
    let amount = ((fraction.clamp(0.0, 1.0) * n as f64).round() as usize).min(n);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = index::sample(&mut rng, n, amount).into_vec();
    picked.sort_unstable();

    picked.into_iter().map(|i| &view.readings[i]).collect()
}

/// `(x, y)` pairs where both measures are present.
pub fn pairs<'a>(
    readings: impl IntoIterator<Item = &'a Reading>,
    x: Measure,
    y: Measure,
) -> Vec<(f64, f64)> {
    readings
        .into_iter()
        .filter_map(|r| Some((r.value(x)?, r.value(y)?)))
        .collect()
}

/// Ordinary least-squares fit of `y` on `x`.
pub fn linear_trend(points: &[(f64, f64)]) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();

    let slope = sxy / sxx;
    let x_min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);

    Some(TrendLine {
        slope,
        intercept: mean_y - slope * mean_x,
        x_min,
        x_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn view(n: usize) -> FilteredView {
        let base = NaiveDate::from_ymd_opt(2017, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        FilteredView::new(
            (0..n)
                .map(|i| {
                    Reading::empty(base + chrono::Duration::hours(i as i64), "A")
                        .with(Measure::Temp, i as f64)
                        .with(Measure::Pm25, 3.0 + 2.0 * i as f64)
                })
                .collect(),
        )
    }

    #[test]
    fn test_linear_trend_recovers_line() {
        let v = view(10);
        let line = linear_trend(&pairs(&v.readings, Measure::Temp, Measure::Pm25)).unwrap();

        assert!((line.slope - 2.0).abs() < 1e-12);
        assert!((line.intercept - 3.0).abs() < 1e-12);
        assert_eq!(line.x_min, 0.0);
        assert_eq!(line.x_max, 9.0);
    }

    #[test]
    fn test_linear_trend_degenerate() {
        assert!(linear_trend(&[]).is_none());
        assert!(linear_trend(&[(1.0, 2.0), (1.0, 3.0)]).is_none());
    }

    #[test]
    fn test_sample_rows_size_and_determinism() {
        let v = view(200);
        let a = sample_rows(&v, SAMPLE_FRACTION, SAMPLE_SEED);
        let b = sample_rows(&v, SAMPLE_FRACTION, SAMPLE_SEED);

        assert_eq!(a.len(), 20);
        assert_eq!(a, b);
        assert!(a.windows(2).all(|w| w[0].datetime < w[1].datetime));
    }

    #[test]
    fn test_sample_rows_empty_view() {
        assert!(sample_rows(&FilteredView::default(), SAMPLE_FRACTION, SAMPLE_SEED).is_empty());
    }
}

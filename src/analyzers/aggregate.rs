use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use crate::analyzers::types::{MonthlyMean, RollingSeries};
use crate::analyzers::utility::mean_present;
use crate::filter::FilteredView;
use crate::schema::{Measure, Reading};

/// Trailing window length, in observations, for the smoothed series.
pub const ROLLING_WINDOW: usize = 30;

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

/// Resamples the view to one row per calendar month.
///
/// Rows run from the first to the last month present, keyed by month end.
/// Months without readings are kept with every mean missing.
pub fn monthly_means(view: &FilteredView) -> Vec<MonthlyMean> {
    let mut by_month: BTreeMap<NaiveDate, Vec<&Reading>> = BTreeMap::new();
    for r in &view.readings {
        by_month.entry(month_end(r.date())).or_default().push(r);
    }

    let (Some(&first), Some(&last)) = (by_month.keys().next(), by_month.keys().next_back())
    else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    let mut key = first;
    while key <= last {
        let readings = by_month.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        let means = Measure::ALL
            .iter()
            .map(|&m| (m, mean_present(readings.iter().map(|r| r.value(m)))))
            .collect();

        rows.push(MonthlyMean {
            month_end: key,
            observations: readings.len(),
            means,
        });

        match key.succ_opt() {
            Some(next) => key = month_end(next),
            None => break,
        }
    }

    rows
}

/// Trailing mean over the last `window` observations.
///
/// Undefined for the first `window - 1` positions and for any window that
/// contains a missing value.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let mut sum = 0.0;
            for v in slice {
                sum += (*v)?;
            }
            Some(sum / window as f64)
        })
        .collect()
}

/// Rolling mean of every pollutant, aligned to the view's timestamps.
pub fn rolling_means(view: &FilteredView, window: usize) -> Vec<RollingSeries> {
    Measure::POLLUTANTS
        .iter()
        .map(|&m| rolling_series(view, m, window))
        .collect()
}

pub fn rolling_series(view: &FilteredView, measure: Measure, window: usize) -> RollingSeries {
    let values: Vec<Option<f64>> = view.readings.iter().map(|r| r.value(measure)).collect();
    let smoothed = rolling_mean(&values, window);

    RollingSeries {
        measure,
        window,
        points: view
            .readings
            .iter()
            .map(|r| r.datetime)
            .zip(smoothed)
            .collect(),
    }
}

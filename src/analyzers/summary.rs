use crate::analyzers::types::ColumnSummary;
use crate::analyzers::utility::{mean, quantile, stddev};
use crate::filter::FilteredView;
use crate::schema::Measure;

/// Count, mean, std, min, quartiles and max for every measure.
///
/// Missing cells are skipped. A column with no values reports a zero count
/// and nothing else; `std` also stays empty below two values.
pub fn summarize(view: &FilteredView) -> Vec<ColumnSummary> {
    Measure::ALL
        .iter()
        .map(|&m| summarize_column(m, view.readings.iter().filter_map(|r| r.value(m))))
        .collect()
}

pub fn summarize_column(column: Measure, values: impl Iterator<Item = f64>) -> ColumnSummary {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(f64::total_cmp);

    let avg = mean(&sorted);

    ColumnSummary {
        column,
        count: sorted.len(),
        mean: avg,
        std: avg.and_then(|a| stddev(&sorted, a)),
        min: sorted.first().copied(),
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Reading;
    use chrono::NaiveDate;

    fn view(values: &[Option<f64>]) -> FilteredView {
        let base = NaiveDate::from_ymd_opt(2014, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        FilteredView::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let mut r = Reading::empty(base + chrono::Duration::hours(i as i64), "Dongsi");
                    r.set(Measure::Pm25, *v);
                    r
                })
                .collect(),
        )
    }

    #[test]
    fn test_summary_of_pm25() {
        let stats = summarize(&view(&[Some(4.0), Some(1.0), None, Some(3.0), Some(2.0)]));
        let pm25 = &stats[0];

        assert_eq!(pm25.column, Measure::Pm25);
        assert_eq!(pm25.count, 4);
        assert_eq!(pm25.mean, Some(2.5));
        assert_eq!(pm25.min, Some(1.0));
        assert_eq!(pm25.q25, Some(1.75));
        assert_eq!(pm25.median, Some(2.5));
        assert_eq!(pm25.q75, Some(3.25));
        assert_eq!(pm25.max, Some(4.0));
        assert!((pm25.std.unwrap() - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_summary_covers_every_measure() {
        let stats = summarize(&view(&[Some(1.0)]));
        assert_eq!(stats.len(), Measure::ALL.len());
        // only PM2.5 was set
        assert_eq!(stats[1].count, 0);
        assert_eq!(stats[1].mean, None);
        assert_eq!(stats[0].std, None);
    }

    #[test]
    fn test_summary_of_empty_view() {
        let stats = summarize(&FilteredView::default());
        assert!(stats.iter().all(|s| s.count == 0 && s.mean.is_none() && s.max.is_none()));
    }
}

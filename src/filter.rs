//! Date-range and station selection.

use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::loader::Dataset;
use crate::schema::Reading;

/// The user's current filter choice: an inclusive date range and one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub station: String,
}

impl Selection {
    pub fn new(start: NaiveDate, end: NaiveDate, station: impl Into<String>) -> Self {
        Selection {
            start,
            end,
            station: station.into(),
        }
    }

    /// Builds a selection the way the dashboard controls would.
    ///
    /// Missing bounds default to the full date span of the data and given
    /// bounds are clamped into it. A missing station falls back to the first
    /// observed one; an unknown station is rejected.
    pub fn resolve(
        dataset: &Dataset,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        station: Option<&str>,
    ) -> Result<Self> {
        let Some((min, max)) = dataset.date_bounds() else {
            bail!("cannot build a selection over an empty dataset");
        };

        let station = match station {
            Some(s) if dataset.has_station(s) => s.to_string(),
            Some(s) => bail!(
                "unknown station {:?} (expected one of: {})",
                s,
                dataset.stations().join(", ")
            ),
            None => match dataset.stations().into_iter().next() {
                Some(first) => first,
                None => bail!("dataset has no stations"),
            },
        };

        let start = start.unwrap_or(min).clamp(min, max);
        let end = end.unwrap_or(max).clamp(min, max);

        Ok(Selection {
            start,
            end,
            station,
        })
    }

    pub fn matches(&self, reading: &Reading) -> bool {
        let date = reading.date();
        reading.station == self.station && self.start <= date && date <= self.end
    }
}

/// Readings that passed a [`Selection`], file order preserved.
#[derive(Debug, Clone, Default)]
pub struct FilteredView {
    pub readings: Vec<Reading>,
}

impl FilteredView {
    pub fn new(readings: Vec<Reading>) -> Self {
        FilteredView { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.readings.iter().map(|r| r.datetime).min()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.readings.iter().map(|r| r.datetime).max()
    }
}

/// Narrows a dataset to a selection. No match is an empty view, not an error.
pub fn filter_readings(dataset: &Dataset, selection: &Selection) -> FilteredView {
    let readings: Vec<Reading> = dataset
        .readings
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect();

    debug!(
        station = %selection.station,
        start = %selection.start,
        end = %selection.end,
        matched = readings.len(),
        "Filtered readings"
    );

    FilteredView::new(readings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            Reading::empty(at(2013, 3, 1, 0), "Dongsi"),
            Reading::empty(at(2013, 3, 1, 23), "Wanliu"),
            Reading::empty(at(2013, 3, 2, 12), "Dongsi"),
            Reading::empty(at(2013, 3, 3, 23), "Dongsi"),
            Reading::empty(at(2013, 3, 4, 0), "Dongsi"),
        ])
    }

    #[test]
    fn test_filter_keeps_station_and_closed_interval() {
        let ds = sample();
        let sel = Selection::new(date(2013, 3, 2), date(2013, 3, 3), "Dongsi");
        let view = filter_readings(&ds, &sel);

        assert_eq!(view.len(), 2);
        for r in &view.readings {
            assert_eq!(r.station, "Dongsi");
            assert!(r.date() >= sel.start && r.date() <= sel.end);
        }
        // the last hour of the end date is still inside the range
        assert_eq!(view.last_timestamp(), Some(at(2013, 3, 3, 23)));
    }

    #[test]
    fn test_no_match_is_empty() {
        let ds = sample();
        let sel = Selection::new(date(2013, 3, 2), date(2013, 3, 3), "Wanliu");
        let view = filter_readings(&ds, &sel);

        assert!(view.is_empty());
        assert_eq!(view.first_timestamp(), None);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let ds = sample();
        let sel = Selection::new(date(2013, 3, 4), date(2013, 3, 1), "Dongsi");
        assert!(filter_readings(&ds, &sel).is_empty());
    }

    #[test]
    fn test_resolve_defaults_to_full_range_and_first_station() {
        let ds = sample();
        let sel = Selection::resolve(&ds, None, None, None).unwrap();

        assert_eq!(sel.station, "Dongsi");
        assert_eq!(sel.start, date(2013, 3, 1));
        assert_eq!(sel.end, date(2013, 3, 4));
    }

    #[test]
    fn test_resolve_clamps_bounds() {
        let ds = sample();
        let sel = Selection::resolve(
            &ds,
            Some(date(2012, 1, 1)),
            Some(date(2020, 1, 1)),
            Some("Wanliu"),
        )
        .unwrap();

        assert_eq!(sel.start, date(2013, 3, 1));
        assert_eq!(sel.end, date(2013, 3, 4));
        assert_eq!(sel.station, "Wanliu");
    }

    #[test]
    fn test_resolve_rejects_unknown_station() {
        let ds = sample();
        let err = Selection::resolve(&ds, None, None, Some("Atlantis")).unwrap_err();
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn test_resolve_on_empty_dataset_fails() {
        assert!(Selection::resolve(&Dataset::default(), None, None, None).is_err());
    }
}

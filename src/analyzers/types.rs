//! Data types produced by the aggregation stage.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::fmt;

use crate::schema::Measure;

/// Descriptive statistics for one column, `describe()`-style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: Measure,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Per-measure means for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyMean {
    /// Last day of the month the row stands for.
    pub month_end: NaiveDate,
    pub observations: usize,
    /// One entry per [`Measure::ALL`], same order.
    pub means: Vec<(Measure, Option<f64>)>,
}

impl MonthlyMean {
    pub fn get(&self, measure: Measure) -> Option<f64> {
        self.means
            .iter()
            .find(|(m, _)| *m == measure)
            .and_then(|(_, v)| *v)
    }
}

/// A trailing-window mean for one pollutant, aligned to the raw timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingSeries {
    pub measure: Measure,
    pub window: usize,
    pub points: Vec<(NaiveDateTime, Option<f64>)>,
}

/// Four fixed, right-open partitions of the hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimeOfDay {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Night,
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
    ];

    /// `[0,6)` Night, `[6,12)` Morning, `[12,18)` Afternoon, `[18,24)` Evening.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeOfDay::Night,
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        }
    }

    pub fn of(datetime: &NaiveDateTime) -> Self {
        Self::from_hour(datetime.hour())
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Night => "Night",
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOfDayMean {
    pub bucket: TimeOfDay,
    pub observations: usize,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
}

/// Mean PM2.5 with and without rain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainSplit {
    pub no_rain: Option<f64>,
    pub rain: Option<f64>,
    pub no_rain_observations: usize,
    pub rain_observations: usize,
}

/// Pairwise Pearson correlations; `values[i][j]` pairs `columns[i]` with `columns[j]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<Measure>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Measure, b: Measure) -> Option<f64> {
        let i = self.columns.iter().position(|m| *m == a)?;
        let j = self.columns.iter().position(|m| *m == b)?;
        self.values[i][j]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram with a count-scaled kernel density curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub measure: Measure,
    pub bins: Vec<HistogramBin>,
    pub kde: Vec<(f64, f64)>,
}

/// Least-squares line `y = intercept + slope * x` over `[x_min, x_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl TrendLine {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Evening);
    }

    #[test]
    fn test_trend_line_at() {
        let line = TrendLine {
            slope: 2.0,
            intercept: 1.0,
            x_min: 0.0,
            x_max: 10.0,
        };
        assert_eq!(line.at(3.0), 7.0);
    }
}

//! Builds the dashboard view model.
//!
//! [`render`] is the whole dashboard as a pure function: the host (CLI, a
//! web front end, tests) calls it again on every filter change and draws
//! whatever comes back.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::aggregate::{ROLLING_WINDOW, monthly_means, rolling_means};
use crate::analyzers::correlation::correlation_matrix;
use crate::analyzers::distribution::{HISTOGRAM_BINS, distribution};
use crate::analyzers::grouping::{
    dominant_pollutant, pollutant_means, rain_means, time_of_day_means,
};
use crate::analyzers::summary::summarize;
use crate::analyzers::trend::{SAMPLE_FRACTION, SAMPLE_SEED, linear_trend, pairs, sample_rows};
use crate::analyzers::types::{
    ColumnSummary, CorrelationMatrix, Distribution, MonthlyMean, RainSplit, RollingSeries,
    TimeOfDayMean, TrendLine,
};
use crate::chart::{Chart, ChartKind, Grid, Point, Series, SeriesStyle};
use crate::filter::{FilteredView, Selection, filter_readings};
use crate::loader::Dataset;
use crate::schema::Measure;

/// Upper bound of the y axis on the weather scatter plots.
const SCATTER_Y_MAX: f64 = 300.0;

const OTHER_POLLUTANTS: [(Measure, &str); 4] = [
    (Measure::So2, "purple"),
    (Measure::No2, "orange"),
    (Measure::Co, "green"),
    (Measure::O3, "brown"),
];

const SCATTER_FEATURES: [Measure; 3] = [Measure::Temp, Measure::Dewp, Measure::Wspm];

/// Everything the dashboard shows for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub station: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub row_count: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub summary: Vec<ColumnSummary>,
    pub monthly: Vec<MonthlyMean>,
    pub rolling: Vec<RollingSeries>,
    pub pollutant_means: Vec<(Measure, Option<f64>)>,
    pub dominant_pollutant: Option<Measure>,
    pub time_of_day: Vec<TimeOfDayMean>,
    pub rain: RainSplit,
    pub correlation: CorrelationMatrix,
    pub distribution: Distribution,
    pub charts: Vec<Chart>,
}

impl DashboardView {
    pub fn title(&self) -> String {
        format!("Air Quality Summary for {}", self.station)
    }

    pub fn dominant_sentence(&self) -> String {
        match self.dominant_pollutant {
            Some(p) => format!("The dominant pollutant at {} is: {}", self.station, p),
            None => format!("No pollutant readings for {} in this range", self.station),
        }
    }

    pub fn chart(&self, id: &str) -> Option<&Chart> {
        self.charts.iter().find(|c| c.id == id)
    }
}

/// Filters the dataset and computes every statistic and chart for the selection.
#[tracing::instrument(skip_all, fields(station = %selection.station, start = %selection.start, end = %selection.end))]
pub fn render(dataset: &Dataset, selection: &Selection) -> DashboardView {
    let view = filter_readings(dataset, selection);
    if view.is_empty() {
        info!("Selection matched no readings");
    }

    let monthly = monthly_means(&view);
    let rolling = rolling_means(&view, ROLLING_WINDOW);
    let means = pollutant_means(&view);
    let dominant = dominant_pollutant(&means).map(|(m, _)| m);
    let time_of_day = time_of_day_means(&view);
    let rain = rain_means(&view);
    let correlation = correlation_matrix(&view, &Measure::ALL);
    let pm25_distribution = distribution(&view, Measure::Pm25, HISTOGRAM_BINS);

    let mut charts = Vec::new();
    for (measure, color) in [(Measure::Pm25, "blue"), (Measure::Pm10, "red")] {
        charts.push(over_time_chart(measure, color, &rolling, &monthly));
    }
    for (measure, color) in OTHER_POLLUTANTS {
        charts.push(rolling_chart(measure, color, &rolling));
    }
    charts.push(monthly_chart(&monthly));
    charts.push(distribution_chart(&pm25_distribution));
    charts.push(temperature_scatter(&view));
    charts.push(correlation_chart(&correlation));
    for feature in SCATTER_FEATURES {
        charts.push(sampled_scatter(&view, feature));
    }
    charts.push(time_of_day_chart(&time_of_day));
    charts.push(rain_chart(&rain));

    debug!(charts = charts.len(), rows = view.len(), "Dashboard rendered");

    DashboardView {
        station: selection.station.clone(),
        start: selection.start,
        end: selection.end,
        row_count: view.len(),
        first_timestamp: view.first_timestamp(),
        last_timestamp: view.last_timestamp(),
        summary: summarize(&view),
        monthly,
        rolling,
        pollutant_means: means,
        dominant_pollutant: dominant,
        time_of_day,
        rain,
        correlation,
        distribution: pm25_distribution,
        charts,
    }
}

fn rolling_points(rolling: &[RollingSeries], measure: Measure) -> Vec<Point> {
    rolling
        .iter()
        .find(|s| s.measure == measure)
        .map(|s| s.points.iter().map(|(t, y)| Point::time(*t, *y)).collect())
        .unwrap_or_default()
}

fn monthly_points(monthly: &[MonthlyMean], measure: Measure) -> Vec<Point> {
    monthly
        .iter()
        .filter_map(|row| {
            let t = row.month_end.and_hms_opt(0, 0, 0)?;
            Some(Point::time(t, row.get(measure)))
        })
        .collect()
}

fn over_time_chart(
    measure: Measure,
    color: &str,
    rolling: &[RollingSeries],
    monthly: &[MonthlyMean],
) -> Chart {
    Chart::new(
        &format!("{}_over_time", chart_key(measure)),
        format!("{measure} Concentration Over Time"),
        ChartKind::Line,
    )
    .labels("Date", format!("{measure} Concentration"))
    .series(
        Series::new(
            format!("30-Day Rolling Avg {measure}"),
            SeriesStyle::Line,
            rolling_points(rolling, measure),
        )
        .color("grey"),
    )
    .series(
        Series::new(
            format!("Monthly Avg {measure}"),
            SeriesStyle::Line,
            monthly_points(monthly, measure),
        )
        .color(color)
        .opacity(0.6),
    )
}

fn rolling_chart(measure: Measure, color: &str, rolling: &[RollingSeries]) -> Chart {
    Chart::new(
        &format!("{}_rolling", chart_key(measure)),
        format!("{measure} Concentration Over Time (30-Day Rolling Average)"),
        ChartKind::Line,
    )
    .labels("Date", format!("{measure} Concentration"))
    .series(
        Series::new(measure.column(), SeriesStyle::Line, rolling_points(rolling, measure))
            .color(color)
            .opacity(0.8),
    )
}

fn monthly_chart(monthly: &[MonthlyMean]) -> Chart {
    Chart::new(
        "monthly_pm",
        "Monthly Average Concentration of PM2.5 and PM10",
        ChartKind::Line,
    )
    .labels("Month", "Monthly Average Concentration")
    .series(
        Series::new("PM2.5", SeriesStyle::Line, monthly_points(monthly, Measure::Pm25))
            .color("blue"),
    )
    .series(
        Series::new("PM10", SeriesStyle::Line, monthly_points(monthly, Measure::Pm10))
            .color("red"),
    )
}

fn distribution_chart(dist: &Distribution) -> Chart {
    let bars = dist
        .bins
        .iter()
        .map(|b| Point::value((b.lower + b.upper) / 2.0, b.count as f64))
        .collect();
    let curve = dist.kde.iter().map(|(x, y)| Point::value(*x, *y)).collect();

    Chart::new(
        "pm25_distribution",
        "Distribution of PM2.5 Concentrations",
        ChartKind::Histogram,
    )
    .labels("PM2.5 Concentration", "Frequency")
    .series(Series::new("count", SeriesStyle::Bars, bars).color("blue"))
    .series(Series::new("kde", SeriesStyle::Line, curve).color("blue"))
}

fn trend_series(line: Option<TrendLine>) -> Series {
    let points = line
        .map(|l| {
            vec![
                Point::value(l.x_min, l.at(l.x_min)),
                Point::value(l.x_max, l.at(l.x_max)),
            ]
        })
        .unwrap_or_default();
    Series::new("trend", SeriesStyle::Line, points).color("red")
}

fn scatter_series(points: &[(f64, f64)]) -> Series {
    Series::new(
        "PM2.5",
        SeriesStyle::Markers,
        points.iter().map(|(x, y)| Point::value(*x, *y)).collect(),
    )
    .opacity(0.3)
}

fn temperature_scatter(view: &FilteredView) -> Chart {
    let all = pairs(&view.readings, Measure::Temp, Measure::Pm25);

    Chart::new(
        "pm25_vs_temp",
        "Scatterplot of PM2.5 vs Temperature",
        ChartKind::Scatter,
    )
    .labels("Temperature", "PM2.5 Concentration")
    .series(scatter_series(&all))
    .series(trend_series(linear_trend(&all)))
}

/// Scatter over a sample of rows; the trend line is still fitted on all rows.
fn sampled_scatter(view: &FilteredView, feature: Measure) -> Chart {
    let sampled = pairs(
        sample_rows(view, SAMPLE_FRACTION, SAMPLE_SEED),
        feature,
        Measure::Pm25,
    );
    let all = pairs(&view.readings, feature, Measure::Pm25);

    Chart::new(
        &format!("pm25_vs_{}_sampled", chart_key(feature)),
        format!("PM2.5 vs {feature}"),
        ChartKind::Scatter,
    )
    .labels(feature.column(), "PM2.5 Concentration")
    .y_range(0.0, SCATTER_Y_MAX)
    .series(scatter_series(&sampled))
    .series(trend_series(linear_trend(&all)))
}

fn correlation_chart(matrix: &CorrelationMatrix) -> Chart {
    let names: Vec<String> = matrix.columns.iter().map(|m| m.column().to_string()).collect();

    Chart::new("correlation", "Correlation Matrix", ChartKind::Heatmap).grid(Grid {
        rows: names.clone(),
        columns: names,
        values: matrix.values.clone(),
    })
}

fn time_of_day_chart(buckets: &[TimeOfDayMean]) -> Chart {
    let pm25 = buckets
        .iter()
        .map(|b| Point::label(b.bucket.label(), b.pm25))
        .collect();
    let pm10 = buckets
        .iter()
        .map(|b| Point::label(b.bucket.label(), b.pm10))
        .collect();

    Chart::new("time_of_day", "Pollution Level by Time of Day", ChartKind::Bar)
        .labels("Time of Day", "Average Concentration")
        .series(Series::new("PM2.5", SeriesStyle::Bars, pm25))
        .series(Series::new("PM10", SeriesStyle::Bars, pm10))
}

fn rain_chart(split: &RainSplit) -> Chart {
    Chart::new(
        "rain",
        "Effect of Rain on PM2.5 Concentration",
        ChartKind::Bar,
    )
    .labels("", "Average PM2.5 Concentration")
    .series(
        Series::new(
            "No Rain",
            SeriesStyle::Bars,
            vec![Point::label("No Rain", split.no_rain)],
        )
        .color("skyblue"),
    )
    .series(
        Series::new("Rain", SeriesStyle::Bars, vec![Point::label("Rain", split.rain)])
            .color("slateblue"),
    )
}

/// Lower-case column name usable inside a chart id (`PM2.5` -> `pm25`).
fn chart_key(measure: Measure) -> String {
    measure
        .column()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

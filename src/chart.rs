//! Chart descriptions handed to the plotting front end.
//!
//! Nothing here draws; a chart is just the series, labels and styling hints
//! a renderer needs.

use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Histogram,
    Scatter,
    Heatmap,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    Line,
    Markers,
    Bars,
}

/// X coordinate of a point: a timestamp, a number or a category label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlotX {
    Time(NaiveDateTime),
    Value(f64),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: PlotX,
    pub y: Option<f64>,
}

impl Point {
    pub fn time(t: NaiveDateTime, y: Option<f64>) -> Self {
        Point {
            x: PlotX::Time(t),
            y,
        }
    }

    pub fn value(x: f64, y: f64) -> Self {
        Point {
            x: PlotX::Value(x),
            y: Some(y),
        }
    }

    pub fn label(x: impl Into<String>, y: Option<f64>) -> Self {
        Point {
            x: PlotX::Label(x.into()),
            y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub style: SeriesStyle,
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub points: Vec<Point>,
}

impl Series {
    pub fn new(name: impl Into<String>, style: SeriesStyle, points: Vec<Point>) -> Self {
        Series {
            name: name.into(),
            style,
            color: None,
            opacity: None,
            points,
        }
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }
}

/// Labelled grid of values, used by heatmaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub y_range: Option<(f64, f64)>,
    pub series: Vec<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
}

impl Chart {
    pub fn new(id: &str, title: impl Into<String>, kind: ChartKind) -> Self {
        Chart {
            id: id.to_string(),
            title: title.into(),
            kind,
            x_label: String::new(),
            y_label: String::new(),
            y_range: None,
            series: Vec::new(),
            grid: None,
        }
    }

    pub fn labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = x.into();
        self.y_label = y.into();
        self
    }

    pub fn y_range(mut self, lo: f64, hi: f64) -> Self {
        self.y_range = Some((lo, hi));
        self
    }

    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn grid(mut self, grid: Grid) -> Self {
        self.grid = Some(grid);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_builder_and_json_shape() {
        let chart = Chart::new("rain", "Effect of Rain", ChartKind::Bar)
            .labels("", "Average PM2.5 Concentration")
            .series(
                Series::new(
                    "PM2.5",
                    SeriesStyle::Bars,
                    vec![Point::label("No Rain", Some(80.0)), Point::label("Rain", None)],
                )
                .color("skyblue"),
            );

        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["series"][0]["points"][0]["x"], "No Rain");
        assert!(json["series"][0]["points"][1]["y"].is_null());
        assert!(json.get("grid").is_none());
    }
}

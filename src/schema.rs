//! Declared column schema for air-quality readings.
//!
//! The set of numeric columns is fixed here instead of being discovered
//! from the file, so a CSV missing any of them is rejected at load time.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Name of the timestamp column.
pub const DATETIME_COLUMN: &str = "datetime";

/// Name of the station column.
pub const STATION_COLUMN: &str = "station";

/// One numeric column of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Measure {
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "CO")]
    Co,
    #[serde(rename = "O3")]
    O3,
    #[serde(rename = "TEMP")]
    Temp,
    #[serde(rename = "PRES")]
    Pres,
    #[serde(rename = "DEWP")]
    Dewp,
    #[serde(rename = "RAIN")]
    Rain,
    #[serde(rename = "WSPM")]
    Wspm,
}

impl Measure {
    /// Every measure, pollutants first, in column order.
    pub const ALL: [Measure; 11] = [
        Measure::Pm25,
        Measure::Pm10,
        Measure::So2,
        Measure::No2,
        Measure::Co,
        Measure::O3,
        Measure::Temp,
        Measure::Pres,
        Measure::Dewp,
        Measure::Rain,
        Measure::Wspm,
    ];

    /// The six tracked pollutants. Order decides dominant-pollutant ties.
    pub const POLLUTANTS: [Measure; 6] = [
        Measure::Pm25,
        Measure::Pm10,
        Measure::So2,
        Measure::No2,
        Measure::Co,
        Measure::O3,
    ];

    pub const WEATHER: [Measure; 5] = [
        Measure::Temp,
        Measure::Pres,
        Measure::Dewp,
        Measure::Rain,
        Measure::Wspm,
    ];

    /// Header name of the column in the source CSV.
    pub fn column(self) -> &'static str {
        match self {
            Measure::Pm25 => "PM2.5",
            Measure::Pm10 => "PM10",
            Measure::So2 => "SO2",
            Measure::No2 => "NO2",
            Measure::Co => "CO",
            Measure::O3 => "O3",
            Measure::Temp => "TEMP",
            Measure::Pres => "PRES",
            Measure::Dewp => "DEWP",
            Measure::Rain => "RAIN",
            Measure::Wspm => "WSPM",
        }
    }

    pub fn is_pollutant(self) -> bool {
        Measure::POLLUTANTS.contains(&self)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A single timestamped observation at one station.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Reading {
    #[serde(deserialize_with = "de_datetime")]
    pub datetime: NaiveDateTime,
    pub station: String,

    #[serde(rename = "PM2.5", deserialize_with = "de_value")]
    pub pm25: Option<f64>,
    #[serde(rename = "PM10", deserialize_with = "de_value")]
    pub pm10: Option<f64>,
    #[serde(rename = "SO2", deserialize_with = "de_value")]
    pub so2: Option<f64>,
    #[serde(rename = "NO2", deserialize_with = "de_value")]
    pub no2: Option<f64>,
    #[serde(rename = "CO", deserialize_with = "de_value")]
    pub co: Option<f64>,
    #[serde(rename = "O3", deserialize_with = "de_value")]
    pub o3: Option<f64>,

    #[serde(rename = "TEMP", deserialize_with = "de_value")]
    pub temp: Option<f64>,
    #[serde(rename = "PRES", deserialize_with = "de_value")]
    pub pres: Option<f64>,
    #[serde(rename = "DEWP", deserialize_with = "de_value")]
    pub dewp: Option<f64>,
    #[serde(rename = "RAIN", deserialize_with = "de_value")]
    pub rain: Option<f64>,
    #[serde(rename = "WSPM", deserialize_with = "de_value")]
    pub wspm: Option<f64>,
}

impl Reading {
    /// Reading with every measure missing. Mostly useful in tests.
    pub fn empty(datetime: NaiveDateTime, station: &str) -> Self {
        Reading {
            datetime,
            station: station.to_string(),
            pm25: None,
            pm10: None,
            so2: None,
            no2: None,
            co: None,
            o3: None,
            temp: None,
            pres: None,
            dewp: None,
            rain: None,
            wspm: None,
        }
    }

    pub fn value(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Pm25 => self.pm25,
            Measure::Pm10 => self.pm10,
            Measure::So2 => self.so2,
            Measure::No2 => self.no2,
            Measure::Co => self.co,
            Measure::O3 => self.o3,
            Measure::Temp => self.temp,
            Measure::Pres => self.pres,
            Measure::Dewp => self.dewp,
            Measure::Rain => self.rain,
            Measure::Wspm => self.wspm,
        }
    }

    pub fn set(&mut self, measure: Measure, value: Option<f64>) {
        let slot = match measure {
            Measure::Pm25 => &mut self.pm25,
            Measure::Pm10 => &mut self.pm10,
            Measure::So2 => &mut self.so2,
            Measure::No2 => &mut self.no2,
            Measure::Co => &mut self.co,
            Measure::O3 => &mut self.o3,
            Measure::Temp => &mut self.temp,
            Measure::Pres => &mut self.pres,
            Measure::Dewp => &mut self.dewp,
            Measure::Rain => &mut self.rain,
            Measure::Wspm => &mut self.wspm,
        };
        *slot = value;
    }

    /// Builder-style variant of [`Reading::set`].
    pub fn with(mut self, measure: Measure, value: f64) -> Self {
        self.set(measure, Some(value));
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.datetime.date()
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses the timestamp formats found in exported air-quality CSVs.
/// A bare date is read as midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parses a numeric cell. `Ok(None)` for the usual missing-value markers.
pub fn parse_value(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() || matches!(raw, "NA" | "N/A" | "NaN" | "nan" | "null" | "NULL") {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(format!("invalid number {raw:?}")),
    }
}

fn de_datetime<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid datetime {raw:?}")))
}

fn de_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_value(&raw).map_err(serde::de::Error::custom)
}

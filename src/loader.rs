//! CSV loader for air-quality readings.
//!
//! Validates the header against the declared [`Measure`] schema before
//! deserializing, so a malformed file fails at startup rather than halfway
//! through a render.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::schema::{DATETIME_COLUMN, Measure, Reading, STATION_COLUMN};

/// All readings of a dataset, in file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub readings: Vec<Reading>,
}

impl Dataset {
    pub fn new(readings: Vec<Reading>) -> Self {
        Dataset { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Distinct station names in the order they first appear.
    pub fn stations(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for r in &self.readings {
            if !seen.iter().any(|s| s == &r.station) {
                seen.push(r.station.clone());
            }
        }
        seen
    }

    pub fn has_station(&self, station: &str) -> bool {
        self.readings.iter().any(|r| r.station == station)
    }

    /// Earliest and latest calendar date present, `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.readings.iter().map(Reading::date).min()?;
        let last = self.readings.iter().map(Reading::date).max()?;
        Some((first, last))
    }
}

/// Loads a dataset from a CSV file, gunzipping it if the name ends in `.gz`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, a required column is
/// missing, a record fails to parse, or the file holds no readings.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let gzipped = path.extension().and_then(|e| e.to_str()) == Some("gz");
    debug!(gzipped, "Opening dataset");

    let dataset = if gzipped {
        read_dataset(GzDecoder::new(BufReader::new(file)))
    } else {
        read_dataset(BufReader::new(file))
    }
    .with_context(|| format!("failed to load {}", path.display()))?;

    info!(
        readings = dataset.len(),
        stations = dataset.stations().len(),
        "Dataset loaded"
    );
    Ok(dataset)
}

/// Reads a dataset from any CSV source.
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers().context("failed to read CSV header")?.clone();
    validate_headers(&headers)?;

    let mut readings = Vec::new();
    for result in rdr.deserialize() {
        let reading: Reading = result.context("malformed record")?;
        readings.push(reading);
    }

    if readings.is_empty() {
        bail!("dataset contains no readings");
    }

    Ok(Dataset::new(readings))
}

/// Checks that every required column is present, naming all that are not.
pub fn validate_headers(headers: &csv::StringRecord) -> Result<()> {
    let required = [DATETIME_COLUMN, STATION_COLUMN]
        .into_iter()
        .chain(Measure::ALL.iter().map(|m| m.column()));

    let missing: Vec<&str> = required
        .filter(|name| !headers.iter().any(|h| h.trim() == *name))
        .collect();

    if !missing.is_empty() {
        bail!("missing required columns: {}", missing.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const HEADER: &str =
        "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station,datetime";

    fn csv_with(rows: &[&str]) -> String {
        let mut s = String::from(HEADER);
        for row in rows {
            s.push('\n');
            s.push_str(row);
        }
        s
    }

    #[test]
    fn test_read_dataset_parses_rows() {
        let csv = csv_with(&[
            "1,2013,3,1,0,4,4,4,7,300,77,-0.7,1023,-18.8,0,NNW,4.4,Aotizhongxin,2013-03-01 00:00:00",
            "2,2013,3,1,1,8,8,NA,7,300,77,-1.1,1023.2,-18.2,0,N,4.7,Aotizhongxin,2013-03-01 01:00:00",
        ]);
        let ds = read_dataset(csv.as_bytes()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.readings[0].pm25, Some(4.0));
        assert_eq!(ds.readings[1].so2, None);
        assert_eq!(ds.readings[1].pres, Some(1023.2));
        assert_eq!(ds.stations(), vec!["Aotizhongxin".to_string()]);
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let csv = "datetime,station,PM2.5\n2013-03-01 00:00:00,A,1\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err().to_string();

        assert!(err.contains("PM10"));
        assert!(err.contains("WSPM"));
        assert!(!err.contains("PM2.5,"));
    }

    #[test]
    fn test_bad_datetime_is_fatal() {
        let csv = csv_with(&["1,2013,3,1,0,4,4,4,7,300,77,-0.7,1023,-18.8,0,NNW,4.4,A,not-a-date"]);
        assert!(read_dataset(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_bad_number_is_fatal() {
        let csv = csv_with(&["1,2013,3,1,0,four,4,4,7,300,77,-0.7,1023,-18.8,0,NNW,4.4,A,2013-03-01 00:00:00"]);
        assert!(read_dataset(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_header_only_is_fatal() {
        let csv = csv_with(&[]);
        let err = read_dataset(csv.as_bytes()).unwrap_err().to_string();
        assert!(err.contains("no readings"));
    }

    #[test]
    fn test_stations_keep_first_seen_order_and_bounds() {
        let csv = csv_with(&[
            "1,2013,3,2,0,1,1,1,1,1,1,1,1,1,0,N,1,Wanliu,2013-03-02 00:00:00",
            "2,2013,3,1,0,1,1,1,1,1,1,1,1,1,0,N,1,Dongsi,2013-03-01 00:00:00",
            "3,2013,3,5,0,1,1,1,1,1,1,1,1,1,0,N,1,Wanliu,2013-03-05 23:00:00",
        ]);
        let ds = read_dataset(csv.as_bytes()).unwrap();

        assert_eq!(ds.stations(), vec!["Wanliu".to_string(), "Dongsi".to_string()]);
        assert_eq!(
            ds.date_bounds(),
            Some((
                NaiveDate::from_ymd_opt(2013, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2013, 3, 5).unwrap()
            ))
        );
    }

    #[test]
    fn test_load_dataset_reads_gzip() {
        let path = std::env::temp_dir().join("aq_dashboard_test_load.csv.gz");
        let csv = csv_with(&["1,2013,3,1,0,4,4,4,7,300,77,-0.7,1023,-18.8,0,NNW,4.4,A,2013-03-01 00:00:00"]);

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(csv.as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let ds = load_dataset(&path).unwrap();
        assert_eq!(ds.len(), 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_dataset_has_no_bounds() {
        assert_eq!(Dataset::default().date_bounds(), None);
        assert!(Dataset::default().stations().is_empty());
    }
}

use crate::analyzers::types::{RainSplit, TimeOfDay, TimeOfDayMean};
use crate::analyzers::utility::mean_present;
use crate::filter::FilteredView;
use crate::schema::{Measure, Reading};

/// PM2.5 and PM10 means for each time-of-day bucket, in bucket order.
/// Buckets with no readings are kept with missing means.
pub fn time_of_day_means(view: &FilteredView) -> Vec<TimeOfDayMean> {
    TimeOfDay::ALL
        .iter()
        .map(|&bucket| {
            let rows: Vec<&Reading> = view
                .readings
                .iter()
                .filter(|r| TimeOfDay::of(&r.datetime) == bucket)
                .collect();

            TimeOfDayMean {
                bucket,
                observations: rows.len(),
                pm25: mean_present(rows.iter().map(|r| r.pm25)),
                pm10: mean_present(rows.iter().map(|r| r.pm10)),
            }
        })
        .collect()
}

/// Mean PM2.5 split on `rain > 0`. Missing rain counts as no rain.
pub fn rain_means(view: &FilteredView) -> RainSplit {
    let (wet, dry): (Vec<&Reading>, Vec<&Reading>) = view
        .readings
        .iter()
        .partition(|r| r.rain.is_some_and(|mm| mm > 0.0));

    RainSplit {
        no_rain: mean_present(dry.iter().map(|r| r.pm25)),
        rain: mean_present(wet.iter().map(|r| r.pm25)),
        no_rain_observations: dry.len(),
        rain_observations: wet.len(),
    }
}

/// Picks the pollutant with the highest mean.
///
/// Pollutants are scanned in [`Measure::POLLUTANTS`] order and only a
/// strictly greater mean replaces the current pick, so ties go to the
/// earlier column. Pollutants without any value are skipped.
pub fn dominant_pollutant(means: &[(Measure, Option<f64>)]) -> Option<(Measure, f64)> {
    let mut best: Option<(Measure, f64)> = None;
    for &(measure, mean) in means {
        if !measure.is_pollutant() {
            continue;
        }
        let Some(mean) = mean else { continue };
        match best {
            Some((_, top)) if mean <= top => {}
            _ => best = Some((measure, mean)),
        }
    }
    best
}

/// Mean of each pollutant over the view, in column order.
pub fn pollutant_means(view: &FilteredView) -> Vec<(Measure, Option<f64>)> {
    Measure::POLLUTANTS
        .iter()
        .map(|&m| (m, mean_present(view.readings.iter().map(|r| r.value(m)))))
        .collect()
}

//! Output formatting and persistence for dashboard views.
//!
//! Supports a plain-text report, JSON serialization of the full view model,
//! and CSV export of the monthly aggregates.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::types::MonthlyMean;
use crate::render::DashboardView;
use crate::schema::Measure;

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

/// Writes the textual part of the dashboard: summary table, dominant
/// pollutant, time-of-day and rain breakdowns.
pub fn print_report<W: Write>(view: &DashboardView, out: &mut W) -> Result<()> {
    writeln!(out, "{}", view.title())?;
    writeln!(
        out,
        "{} to {} | {} readings",
        view.start, view.end, view.row_count
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "{:<7}{:>8}{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    )?;
    for s in &view.summary {
        writeln!(
            out,
            "{:<7}{:>8}{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}",
            s.column.column(),
            s.count,
            fmt_opt(s.mean),
            fmt_opt(s.std),
            fmt_opt(s.min),
            fmt_opt(s.q25),
            fmt_opt(s.median),
            fmt_opt(s.q75),
            fmt_opt(s.max),
        )?;
    }
    writeln!(out)?;

    writeln!(out, "{}", view.dominant_sentence())?;
    writeln!(out)?;

    writeln!(out, "Pollution level by time of day")?;
    writeln!(out, "{:<10}{:>10}{:>10}", "bucket", "PM2.5", "PM10")?;
    for b in &view.time_of_day {
        writeln!(
            out,
            "{:<10}{:>10}{:>10}",
            b.bucket.label(),
            fmt_opt(b.pm25),
            fmt_opt(b.pm10)
        )?;
    }
    writeln!(out)?;

    writeln!(out, "Effect of rain on PM2.5")?;
    writeln!(out, "{:<10}{:>10}", "No Rain", fmt_opt(view.rain.no_rain))?;
    writeln!(out, "{:<10}{:>10}", "Rain", fmt_opt(view.rain.rain))?;

    Ok(())
}

/// Writes the full view model, charts included, as pretty-printed JSON.
pub fn write_json(path: &Path, view: &DashboardView) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, view)?;
    writer.flush()?;

    info!(path = %path.display(), charts = view.charts.len(), "View written");
    Ok(())
}

/// Writes one CSV row per month: `month_end, observations` and one column
/// per measure. Missing means are left blank.
pub fn write_monthly_csv(path: &Path, rows: &[MonthlyMean]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_monthly(file, rows)?;

    info!(path = %path.display(), rows = rows.len(), "Monthly aggregates exported");
    Ok(())
}

pub fn write_monthly<W: Write>(out: W, rows: &[MonthlyMean]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);

    let mut header = vec!["month_end".to_string(), "observations".to_string()];
    header.extend(Measure::ALL.iter().map(|m| m.column().to_string()));
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.month_end.to_string(), row.observations.to_string()];
        record.extend(
            Measure::ALL
                .iter()
                .map(|m| row.get(*m).map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer.flush()?;
    debug!(rows = rows.len(), "Monthly CSV written");
    Ok(())
}

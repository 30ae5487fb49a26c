//! CLI entry point for the air quality dashboard.
//!
//! Each subcommand loads the dataset, resolves the selection and renders
//! the dashboard once, then prints or exports the result.

use anyhow::Result;
use aq_dashboard::{
    config::{SelectionPreset, Settings},
    filter::Selection,
    loader::{Dataset, load_dataset},
    output::{print_report, write_json, write_monthly_csv},
    render::render,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aq_dashboard")]
#[command(about = "Air quality analysis dashboard", long_about = None)]
struct Cli {
    /// CSV (or .csv.gz) dataset to load [default: $AQ_DATA_PATH or main_data.csv]
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SelectionArgs {
    /// Station to show (defaults to the first station in the file)
    #[arg(short, long)]
    station: Option<String>,

    /// First date to include, YYYY-MM-DD
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date to include, YYYY-MM-DD
    #[arg(long)]
    end: Option<NaiveDate>,

    /// JSON file with a saved selection; explicit flags take precedence
    #[arg(long)]
    preset: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List stations and the date span of the dataset
    Stations,
    /// Print summary statistics and groupings for a selection
    Summary {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Write the full dashboard view model, charts included, as JSON
    Render {
        #[command(flatten)]
        selection: SelectionArgs,

        /// JSON file to write
        #[arg(short, long, default_value = "dashboard.json")]
        output: PathBuf,
    },
    /// Export monthly means for a selection as CSV
    ExportMonthly {
        #[command(flatten)]
        selection: SelectionArgs,

        /// CSV file to write
        #[arg(short, long, default_value = "monthly.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let settings = Settings::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = settings
        .log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = settings
        .log_file_path
        .file_name()
        .unwrap_or(OsStr::new("aq_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let data_path = cli.data.unwrap_or(settings.data_path);

    // A missing or malformed dataset is fatal
    let dataset = load_dataset(&data_path)?;

    match cli.command {
        Commands::Stations => {
            if let Some((first, last)) = dataset.date_bounds() {
                info!(%first, %last, "Date span");
                println!("date range: {first} to {last}");
            }
            for station in dataset.stations() {
                println!("{station}");
            }
        }
        Commands::Summary { selection } => {
            let selection = resolve(&dataset, selection)?;
            let view = render(&dataset, &selection);
            print_report(&view, &mut std::io::stdout().lock())?;
        }
        Commands::Render { selection, output } => {
            let selection = resolve(&dataset, selection)?;
            let view = render(&dataset, &selection);
            write_json(&output, &view)?;
        }
        Commands::ExportMonthly { selection, output } => {
            let selection = resolve(&dataset, selection)?;
            let view = render(&dataset, &selection);
            write_monthly_csv(&output, &view.monthly)?;
        }
    }

    Ok(())
}

/// Merges CLI flags over an optional preset file and resolves the result
/// against the dataset.
fn resolve(dataset: &Dataset, args: SelectionArgs) -> Result<Selection> {
    let flags = SelectionPreset {
        station: args.station,
        start: args.start,
        end: args.end,
    };
    let merged = match args.preset {
        Some(path) => flags.or(SelectionPreset::load(&path)?),
        None => flags,
    };

    let selection = Selection::resolve(
        dataset,
        merged.start,
        merged.end,
        merged.station.as_deref(),
    )?;
    info!(
        station = %selection.station,
        start = %selection.start,
        end = %selection.end,
        "Selection resolved"
    );
    Ok(selection)
}

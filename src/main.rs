use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

use nba_projections::config::{
    DEFAULT_BASE_URL, DEFAULT_END_YEAR, DEFAULT_SLEEP_SECS, DEFAULT_START_YEAR,
};
use nba_projections::dashboard;
use nba_projections::etl;
use nba_projections::fetch::SeasonFetcher;
use nba_projections::forecast::{self, evaluate, Evaluation, EvaluationSettings, StatOutcome};
use nba_projections::frame::{read_frame, write_frame};
use nba_projections::stats::{MODELING_TARGETS, PLAYER};
use nba_projections::{DataLayout, SeasonRange, TableKind};
use polars::prelude::DataFrame;

#[derive(Parser)]
#[command(name = "nba-projections")]
#[command(about = "Build NBA player-season tables and project next-season stats", long_about = None)]
struct Cli {
    /// Data directory holding raw/ and processed/
    #[arg(long, env = "NBA_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// First season year (inclusive)
    #[arg(long, env = "NBA_START_YEAR", default_value_t = DEFAULT_START_YEAR, global = true)]
    start_year: i32,

    /// Last season year (inclusive)
    #[arg(long, env = "NBA_END_YEAR", default_value_t = DEFAULT_END_YEAR, global = true)]
    end_year: i32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    PerGame,
    Advanced,
}

impl From<KindArg> for TableKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::PerGame => TableKind::PerGame,
            KindArg::Advanced => TableKind::Advanced,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Download season tables that are not cached yet
    Fetch {
        /// Site root the season pages live under
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Pause between successive downloads, in seconds
        #[arg(long, default_value_t = DEFAULT_SLEEP_SECS)]
        sleep_secs: u64,

        /// Table kinds to fetch (default: all)
        #[arg(long = "kind", value_enum)]
        kinds: Vec<KindArg>,
    },

    /// Clean and deduplicate the per-game seasons into one table
    Process,

    /// Merge per-game and advanced seasons
    Merge,

    /// Add next-season target columns to the merged table
    Modeling,

    /// Score each per-stat model on a time-based hold-out
    Evaluate {
        /// Last season used for training
        #[arg(long, default_value_t = 2022)]
        train_max_year: i32,

        /// Minimum training rows per stat
        #[arg(long, default_value_t = 100)]
        min_train: usize,

        /// Minimum test rows per stat
        #[arg(long, default_value_t = 50)]
        min_test: usize,

        /// Write the metrics to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Predict next season for every player of the latest season
    Predict,

    /// Combine actual and predicted rows for reporting
    Dashboard {
        /// Also write an Excel workbook
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },

    /// Run process, merge, modeling, predict and dashboard in order
    Run {
        /// Fetch missing raw tables first
        #[arg(long)]
        fetch: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let layout = DataLayout::new(&cli.data_dir);
    let range = SeasonRange::new(cli.start_year, cli.end_year);

    match cli.command {
        Commands::Fetch {
            base_url,
            sleep_secs,
            kinds,
        } => {
            let kinds: Vec<TableKind> = if kinds.is_empty() {
                TableKind::ALL.to_vec()
            } else {
                kinds.into_iter().map(TableKind::from).collect()
            };
            fetch(&layout, range, &base_url, sleep_secs, &kinds)?;
        }
        Commands::Process => {
            process(&layout, range)?;
        }
        Commands::Merge => {
            merge(&layout, range)?;
        }
        Commands::Modeling => {
            modeling(&layout, range)?;
        }
        Commands::Evaluate {
            train_max_year,
            min_train,
            min_test,
            output,
        } => {
            let settings = EvaluationSettings {
                train_max_year,
                min_train,
                min_test,
            };
            evaluate_models(&layout, range, &settings, output.as_deref())?;
        }
        Commands::Predict => {
            predict(&layout, range)?;
        }
        Commands::Dashboard { xlsx } => {
            build_dashboard(&layout, range, xlsx.as_deref())?;
        }
        Commands::Run { fetch: with_fetch } => {
            if with_fetch {
                fetch(&layout, range, DEFAULT_BASE_URL, DEFAULT_SLEEP_SECS, &TableKind::ALL)?;
            }
            process(&layout, range)?;
            merge(&layout, range)?;
            modeling(&layout, range)?;
            predict(&layout, range)?;
            build_dashboard(&layout, range, None)?;
        }
    }

    Ok(())
}

fn print_saved(path: &Path, table: &DataFrame) {
    println!("Saved: {}", path.display());
    println!("Rows: {} Cols: {}", table.height(), table.width());
}

fn fetch(layout: &DataLayout, range: SeasonRange, base_url: &str, sleep_secs: u64, kinds: &[TableKind]) -> Result<()> {
    let mut fetcher = SeasonFetcher::new(base_url, Duration::from_secs(sleep_secs))
        .context("Failed to create HTTP client")?;

    let summary = fetcher
        .fetch_missing(layout, range, kinds)
        .context("Failed to fetch season tables")?;

    for (year, kind) in &summary.skipped {
        println!("SKIP {} {}: already cached", year, kind);
    }
    for (year, kind) in &summary.fetched {
        println!("Fetched {} {}", year, kind);
    }
    println!("Done! {} fetched, {} cached", summary.fetched.len(), summary.skipped.len());
    Ok(())
}

fn process(layout: &DataLayout, range: SeasonRange) -> Result<()> {
    let mut table = etl::build_processed_per_game(layout, range)
        .context("Failed to build processed per-game table")?;

    let path = layout.processed_per_game(range);
    write_frame(&mut table, &path).context("Failed to write processed per-game table")?;
    print_saved(&path, &table);
    Ok(())
}

fn merge(layout: &DataLayout, range: SeasonRange) -> Result<()> {
    let mut merged = etl::build_merged(layout, range).context("Failed to merge season tables")?;

    let path = layout.merged(range);
    write_frame(&mut merged, &path).context("Failed to write merged table")?;
    print_saved(&path, &merged);
    Ok(())
}

fn read_table(path: &Path) -> Result<DataFrame> {
    read_frame(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_merged(layout: &DataLayout, range: SeasonRange) -> Result<DataFrame> {
    read_table(&layout.merged(range))
}

fn modeling(layout: &DataLayout, range: SeasonRange) -> Result<()> {
    let merged = read_merged(layout, range)?;
    let mut table = etl::build_modeling_table(merged, &MODELING_TARGETS)
        .context("Failed to build modeling table")?;

    let path = layout.modeling(range);
    write_frame(&mut table, &path).context("Failed to write modeling table")?;
    println!("Saved modeling dataset: {}", path.display());
    println!("Rows: {}", table.height());
    println!("Columns: {}", table.width());
    Ok(())
}

fn evaluate_models(
    layout: &DataLayout,
    range: SeasonRange,
    settings: &EvaluationSettings,
    output: Option<&Path>,
) -> Result<()> {
    let table = read_table(&layout.modeling(range))?;

    let results = forecast::evaluate_models(&table, settings).context("Failed to evaluate models")?;

    println!("NBA Player Stat Prediction Models");
    println!("================================");
    println!();

    let mut scored = Vec::new();
    for result in results {
        match result {
            Evaluation::Scored(metrics) => {
                println!("{} MODEL", metrics.stat);
                println!("{}", "-".repeat(30));
                println!("MAE : {:.2}", metrics.mae);
                println!("RMSE: {:.2}", metrics.rmse);
                println!();
                scored.push(metrics);
            }
            Evaluation::MissingTarget { stat, .. } => {
                println!("Skipping {} (missing target)", stat);
            }
            Evaluation::InsufficientData { stat, .. } => {
                println!("{}: not enough data, skipped", stat);
                println!();
            }
            Evaluation::FitFailed { stat, message } => {
                println!("{}: fit failed: {}", stat, message);
            }
        }
    }

    if let Some(output) = output {
        evaluate::write_metrics_csv(&scored, output).context("Failed to write metrics")?;
        println!("Saved metrics: {}", output.display());
    }
    Ok(())
}

fn predict(layout: &DataLayout, range: SeasonRange) -> Result<()> {
    let history = read_merged(layout, range)?;
    let mut forecast = forecast::forecast_next_season(&history).context("Failed to forecast next season")?;

    println!(
        "Using season {} to predict season {}",
        forecast.latest_season, forecast.predicted_season
    );

    for outcome in &forecast.outcomes {
        match outcome {
            StatOutcome::Predicted {
                target,
                features,
                values,
                ..
            } => println!(
                "{}: predicted for {} players using {} features",
                target.name,
                values.len(),
                features.len()
            ),
            StatOutcome::Skipped { target, reason } => {
                println!("Skipping {}: {}", target.name, reason)
            }
        }
    }

    let path = layout.predictions(forecast.predicted_season);
    write_frame(&mut forecast.table, &path).context("Failed to write predictions")?;

    let players = forecast
        .table
        .column(PLAYER)
        .and_then(|players| players.n_unique())
        .unwrap_or(0);

    println!("Saved: {}", path.display());
    println!("Unique players predicted: {}", players);
    println!("Prediction columns: {:?}", forecast.prediction_columns());
    Ok(())
}

fn build_dashboard(layout: &DataLayout, range: SeasonRange, xlsx: Option<&Path>) -> Result<()> {
    let history = read_merged(layout, range)?;
    let predicted_season = forecast::latest_season(&history).context("Failed to find latest season")? + 1;

    let predictions = read_table(&layout.predictions(predicted_season))?;

    let mut table = dashboard::build_dashboard(&history, &predictions).context("Failed to build dashboard")?;

    let path = layout.dashboard();
    write_frame(&mut table, &path).context("Failed to write dashboard")?;
    println!("Saved dashboard dataset: {}", path.display());
    println!("Columns: {:?}", table.get_column_names());

    if let Some(xlsx) = xlsx {
        dashboard::write_dashboard_xlsx(&table, xlsx).context("Failed to write Excel file")?;
        println!("Saved workbook: {}", xlsx.display());
    }
    Ok(())
}

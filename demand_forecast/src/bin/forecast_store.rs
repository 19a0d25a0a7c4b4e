//! # forecast_store
//!
//! Script entry point for the demand forecast core: forecast one store and
//! write the export CSV, or print the store segmentation.

use clap::{Parser, Subcommand};
use demand_forecast::export::{export_file_name, write_csv_file, write_segments_csv};
use demand_forecast::segmentation::cluster_stores_with_seed;
use demand_forecast::{
    apply_holiday_uplift, forecast_store, DashboardConfig, DataLoader, Horizon, ModelKind,
    ModelStore, StoreSummary,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "forecast_store")]
#[command(about = "Retail store demand forecasting", long_about = None)]
struct Cli {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast one store and write the CSV export
    Forecast {
        /// Store id
        #[arg(short, long)]
        store: u32,

        /// Model kind (sarima, prophet)
        #[arg(short, long, default_value = "sarima")]
        model: ModelKind,

        /// Forecast horizon in days
        #[arg(long, default_value = "7")]
        horizon: i64,

        /// Holiday uplift in percent
        #[arg(short, long)]
        uplift: Option<f64>,

        /// Output file (defaults to store_<id>_forecast_with_ci.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Group stores by sales behavior
    Segment {
        /// Number of clusters (defaults to the configured count)
        #[arg(short)]
        k: Option<usize>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "demand_forecast=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> demand_forecast::Result<()> {
    let config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    let dataset = DataLoader::from_csv(&config.data_path)?;

    match cli.command {
        Commands::Forecast {
            store,
            model,
            horizon,
            uplift,
            output,
        } => {
            let horizon = Horizon::new(horizon)?;
            let history = dataset.store_history(store)?;
            print!("{}", StoreSummary::from_history(&history)?);

            let handle = ModelStore::new(&config.model_dir).load(model)?;
            let mut forecast = forecast_store(&history, model, &handle, horizon)?;
            if let Some(pct) = uplift {
                forecast = apply_holiday_uplift(&forecast, pct)?;
            }

            let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(store)));
            write_csv_file(&forecast, &path)?;
            println!("Wrote {} forecast rows to {}", forecast.len(), path.display());
        }
        Commands::Segment { k } => {
            let k = k.unwrap_or(config.cluster_count);
            let segmentation = cluster_stores_with_seed(&dataset, k, config.cluster_seed)?;

            write_segments_csv(&segmentation, io::stdout().lock())?;
        }
    }

    Ok(())
}

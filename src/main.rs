use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

use hospital_analytics::api::{AnalyticsModule, HttpBackend};
use hospital_analytics::commands::{self, CommandStatus, DetailsArgs, QueryArgs};
use hospital_analytics::config::{init_config, Config};
use hospital_analytics::controller::PageController;
use hospital_analytics::display::DisplayManager;
use hospital_analytics::logging::init_logging;
use hospital_analytics::session::{SessionProvider, StoredSession};
use hospital_analytics::trend::TrendMode;

#[derive(Parser)]
#[command(name = "hospital-analytics")]
#[command(about = "Revenue, workload and prescription analytics for hospital departments")]
#[command(version)]
struct Cli {
    /// Analytics module: outpatient, inpatient, workload, drug-cost, prescription
    #[arg(long, global = true, default_value_t = AnalyticsModule::Outpatient)]
    module: AnalyticsModule,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (TOML); skips the default search path
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show departments, doctors and the server date
    Init,
    /// Show the summary cards for a window
    Summary {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Show one page of the detail table
    Details {
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        table: DetailsArgs,
    },
    /// Show the trend series
    Trend {
        #[command(flatten)]
        query: QueryArgs,
        /// Growth comparison: yoy or mom
        #[arg(long, default_value_t = TrendMode::Yoy)]
        mode: TrendMode,
    },
    /// Summary, detail page and trend from one query
    Report {
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        table: DetailsArgs,
        /// Growth comparison: yoy or mom
        #[arg(long, default_value_t = TrendMode::Yoy)]
        mode: TrendMode,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => init_config(config),
        Err(e) => return handle_error(e, json),
    };

    // Dropped on return from main, which flushes buffered file logs.
    let _log_guard = init_logging(&config.logging, &config.paths.log_directory);

    match run(cli, config).await {
        Ok(CommandStatus::Complete) => ExitCode::SUCCESS,
        Ok(CommandStatus::Degraded) => ExitCode::FAILURE,
        Err(e) => handle_error(e, json),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_with_file(path),
        None => Config::load(),
    }
}

async fn run(cli: Cli, config: &Config) -> Result<CommandStatus> {
    let session = StoredSession::load(&config.paths.session_file)?;
    debug!(user = ?session.user(), signed_in = session.token().is_some(), "Session loaded");

    let backend = HttpBackend::from_config(config, cli.module, Arc::new(session))
        .context("Failed to create HTTP client")?;
    info!(module = %cli.module, base_url = %config.api.base_url, "Starting");

    let today = chrono::Local::now().date_naive();
    let mut controller = PageController::new(
        backend,
        config.view.page_size,
        config.view.default_window_days,
        today,
    );
    let display = DisplayManager::new(&config.output);

    match cli.command {
        Commands::Init => commands::run_init(&mut controller, &display, cli.json).await,
        Commands::Summary { query } => {
            commands::run_summary(&mut controller, &display, &query, cli.json).await
        }
        Commands::Details { query, table } => {
            commands::run_details(&mut controller, &display, &query, &table, cli.json).await
        }
        Commands::Trend { query, mode } => {
            commands::run_trend(&mut controller, &display, &query, mode, cli.json).await
        }
        Commands::Report { query, table, mode } => {
            commands::run_report(&mut controller, &display, &query, &table, mode, cli.json).await
        }
    }
}

fn handle_error(e: anyhow::Error, json: bool) -> ExitCode {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{e:#}") }));
    } else {
        eprintln!("❌ Error: {e:#}");
    }
    ExitCode::FAILURE
}

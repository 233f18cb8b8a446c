use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mediadeck_client::{ApiConfig, ConsoleApi};

mod display;
mod shell;
mod views;

#[derive(Parser)]
#[command(
    name = "mediadeck",
    about = "Operator console for the conveyor media-pipeline API",
    version
)]
struct Cli {
    /// Log filter directives (e.g. `info`, `mediadeck_client=debug`).
    #[arg(long, env = "MEDIADECK_LOG", default_value = "warn", global = true)]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Review and label the training backlog
    Training,
    /// Inspect model predictions by confusion-matrix category
    Predictions,
    /// Browse the media library
    Media,
    /// Search media items and manage their pipeline status
    Pipeline,
    /// Show database migration history
    Migrations,
    /// Probe API liveness
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            eprintln!();
            eprintln!("{}", err.remediation());
            std::process::exit(2);
        }
    };
    tracing::info!(base_url = %config.base_url(), "configuration resolved");

    let mut api = ConsoleApi::new(&config)?;

    match cli.command {
        Command::Training => shell::run(views::training::TrainingView::new(), &mut api).await?,
        Command::Predictions => {
            shell::run(views::predictions::PredictionsView::new(), &mut api).await?
        }
        Command::Media => shell::run(views::media::MediaView::new(), &mut api).await?,
        Command::Pipeline => shell::run(views::pipeline::PipelineView::new(), &mut api).await?,
        Command::Migrations => {
            shell::run(views::migrations::MigrationsView::new(), &mut api).await?
        }
        Command::Health => {
            match api.health().await {
                Ok(body) => {
                    println!("API healthy at {}", api.base_url());
                    if let Ok(pretty) = serde_json::to_string_pretty(&body) {
                        println!("{pretty}");
                    }
                }
                Err(err) => {
                    eprintln!("{}", display::error_banner(&err));
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

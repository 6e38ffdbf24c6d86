use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Duration, Local};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use wanderplan::{
    Budget, HtmlDocument, Outcome, Page, Preferences, RecommendationClient, TerminalReport,
    WanderplanConfig, logging, server,
};

#[derive(Parser, Debug)]
#[command(name = "wanderplan")]
#[command(version, about = "Vacation city recommendations and travel times from a language model")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "WANDERPLAN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask the recommendation endpoint for cities and travel times
    Recommend(RecommendArgs),
    /// Run the recommendation proxy in front of the language model
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct RecommendArgs {
    /// Starting city
    #[arg(long = "from")]
    starting_city: String,

    /// Activity to plan for (repeatable)
    #[arg(long = "activity")]
    activities: Vec<String>,

    #[arg(long, value_enum, default_value_t = Budget::Moderate)]
    budget: Budget,

    /// Preferred region (repeatable)
    #[arg(long = "region")]
    regions: Vec<String>,

    /// First travel day, defaults to today
    #[arg(long = "start")]
    start_date: Option<String>,

    /// Last travel day, defaults to a week after today
    #[arg(long = "end")]
    end_date: Option<String>,

    /// Also write the result as an HTML page
    #[arg(long)]
    html: Option<PathBuf>,

    /// Recommendation endpoint base URL (overrides config)
    #[arg(long)]
    server: Option<String>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

impl From<RecommendArgs> for Preferences {
    fn from(args: RecommendArgs) -> Self {
        let today = Local::now().date_naive();
        let start_date = args
            .start_date
            .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());
        let end_date = args
            .end_date
            .unwrap_or_else(|| (today + Duration::days(7)).format("%Y-%m-%d").to_string());

        Preferences::new(args.starting_city)
            .with_activities(args.activities)
            .with_budget(args.budget)
            .with_regions(args.regions)
            .with_dates(start_date, end_date)
    }
}

async fn recommend(config: &WanderplanConfig, mut args: RecommendArgs) -> Result<ExitCode> {
    let mut service = config.service.clone();
    if let Some(server) = args.server.take() {
        service.base_url = server;
    }
    let html_path = args.html.take();

    let client = RecommendationClient::new(&service)?;
    info!("Requesting recommendations from {}", client.endpoint());

    let preferences = Preferences::from(args);
    debug!("Preferences: {:?}", preferences);

    let mut page = Page::new();
    let outcome = client.get_recommendations(&preferences, &mut page).await;

    print!("{}", TerminalReport(&page));

    if let Some(path) = html_path {
        std::fs::write(&path, HtmlDocument::new(&page).to_string())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    Ok(match outcome {
        Outcome::Rendered(_) => ExitCode::SUCCESS,
        Outcome::Failed(_) | Outcome::Superseded(_) => ExitCode::FAILURE,
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = WanderplanConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Recommend(args) => recommend(&config, args).await,
        Commands::Serve(args) => {
            if let Some(port) = args.port {
                config.server.port = port;
            }
            server::run(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

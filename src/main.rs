use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use city_events::common::types::Source;
use city_events::observability::init_logging;
use city_events::server::{start_server, AppState};
use city_events::{build_gatherer, Config, EventRecord};

#[derive(Parser)]
#[command(name = "city_events")]
#[command(about = "Scrape, enrich and geocode event listings for a city")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve GET /events over HTTP
    Serve {
        /// Overrides PORT / the config file
        #[arg(long)]
        port: Option<u16>,
    },
    /// Gather events for a city and print them as JSON
    Gather {
        city: String,
        /// Listing source: eventbrite, meetup or yelp
        #[arg(long, default_value = "eventbrite")]
        source: Source,
    },
    /// Look up parks near a city on OpenStreetMap and print them as JSON
    Parks { city: String },
}

#[derive(serde::Serialize)]
struct EventsOutput {
    events: Vec<EventRecord>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;
    let gatherer = build_gatherer(&config).context("building HTTP clients")?;

    match cli.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            info!(detail_limit = config.detail_limit, "Starting server");
            start_server(AppState::new(gatherer), port).await?;
        }
        Commands::Gather { city, source } => {
            let events = gatherer.gather(&city, source).await?;
            println!("{}", serde_json::to_string_pretty(&EventsOutput { events })?);
        }
        Commands::Parks { city } => {
            let events = gatherer.parks(&city).await;
            println!("{}", serde_json::to_string_pretty(&EventsOutput { events })?);
        }
    }

    Ok(())
}

//! Drive OS command line
//!
//! Exercises the place lookup and routing services from a terminal.

use anyhow::{Context, Result};
use app_core::map::{MapController, SearchOutcome};
use app_core::places::PlaceResolver;
use app_core::routing::RoutePlanner;
use app_state::map::{MapAction, MapStore};
use app_state::notice::NoticeCenter;
use clap::{Parser, Subcommand};
use drive_os::AppConfig;
use nav_client::geocode::NominatimClient;
use nav_client::routing::OsrmClient;
use nav_client::types::Coordinate;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a place and optionally route to it
    Search {
        /// Free-text place query
        query: String,

        #[arg(long, value_parser = parse_coordinate, help = "Start position as lat,lon")]
        from: Option<Coordinate>,
    },
    /// Route between two positions
    Route {
        #[arg(value_parser = parse_coordinate, help = "Start position as lat,lon")]
        from: Coordinate,

        #[arg(value_parser = parse_coordinate, help = "End position as lat,lon")]
        to: Coordinate,
    },
}

fn parse_coordinate(value: &str) -> std::result::Result<Coordinate, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lon but got '{value}'"))?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("invalid latitude '{lat}'"))?;
    let lon: f64 = lon.trim().parse().map_err(|_| format!("invalid longitude '{lon}'"))?;
    Ok(Coordinate::new(lat, lon))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().context("Failed to read configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let lookup = NominatimClient::new(config.client(&config.nominatim_url))
        .context("Failed to build place lookup client")?;
    let router = OsrmClient::new(config.client(&config.osrm_url))
        .context("Failed to build routing client")?;
    let planner = RoutePlanner::new(Arc::new(router));

    match args.command {
        Command::Search { query, from } => {
            let store = MapStore::new();
            let notices = NoticeCenter::new();
            let mut notice_rx = notices.subscribe();
            let controller = MapController::new(
                store.clone(),
                notices,
                PlaceResolver::new(Arc::new(lookup)),
                planner,
            );

            if let Some(from) = from {
                store.dispatch(MapAction::PositionUpdated(from));
            }

            match controller.search(&query).await {
                SearchOutcome::Resolved {
                    destination,
                    routing,
                } => {
                    println!("Destination: {destination}");
                    if let Some(routing) = routing {
                        routing.await.context("Route task failed")?;
                        print_path(store.snapshot().route());
                    }
                }
                SearchOutcome::Skipped => anyhow::bail!("Query is empty"),
                _ => {
                    let notice = notice_rx.try_recv().context("Search did not complete")?;
                    anyhow::bail!("{notice}");
                }
            }
        }
        Command::Route { from, to } => {
            let route = planner.plan(from, to).await?;
            if let Some(distance) = route.distance {
                println!("Distance: {:.1} km", distance / 1000.0);
            }
            if let Some(duration) = route.duration {
                println!("Duration: {:.0} min", duration / 60.0);
            }
            print_path(&route.path);
        }
    }

    Ok(())
}

fn print_path(path: &[Coordinate]) {
    if path.is_empty() {
        println!("No route");
        return;
    }
    println!("Route ({} points):", path.len());
    for point in path {
        println!("  {point}");
    }
}

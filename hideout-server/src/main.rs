use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use hideout_server::config::ServerConfig;
use hideout_server::geometry::StopIndex;
use hideout_server::search::SearchDefaults;
use hideout_server::timetable::{FeedTimetable, Timetable, TimetableCache};
use hideout_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // Load the feed and index its stops (fail fast if unavailable)
    let feed = FeedTimetable::load(&config.feed_path)?;
    let stops = StopIndex::from_stops(feed.stops())?;
    let period = feed.service_period();
    info!(
        stops = stops.len(),
        start = %period.start,
        end = %period.end,
        "Feed ready"
    );

    let state = AppState::new(
        feed,
        stops,
        TimetableCache::new(&config.cache),
        SearchDefaults::default(),
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "Hideout server listening");
    info!("  GET  /health        - Health check");
    info!("  GET  /feed          - Feed service period");
    info!("  GET  /stops/hiding  - Stops served by hiding modes");
    info!("  POST /reach         - Reachable stops and routes");

    axum::serve(listener, app).await?;
    Ok(())
}

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use fleet_geo::cache::{GeoCache, spawn_cleanup};
use fleet_geo::config::AppConfig;
use fleet_geo::geocode::{GeocodeResolver, NominatimClient, PdokClient};
use fleet_geo::matcher::Matcher;
use fleet_geo::store::MemoryStore;
use fleet_geo::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides; default is info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    let store = match &config.seed_path {
        Some(path) => {
            let store = MemoryStore::from_json_file(path)?;
            info!(path = %path.display(), trips = store.trip_count().await, "loaded seed data");
            store
        }
        None => {
            info!("no FLEET_GEO_SEED set, starting with an empty store");
            MemoryStore::new()
        }
    };

    let pdok = PdokClient::new(config.pdok.clone())?;
    let nominatim = NominatimClient::new(config.nominatim.clone())?;

    // Shared between the resolver and the background sweep
    let cache = Arc::new(GeoCache::new(&config.cache));
    let cleanup = spawn_cleanup(cache.clone(), config.cache.cleanup_interval);

    let state = AppState::new(
        GeocodeResolver::new(cache, pdok, nominatim),
        Matcher::new(store, config.matcher.clone()),
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "fleet-geo listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutdown signal received");
        })
        .await?;

    cleanup.shutdown().await;
    Ok(())
}

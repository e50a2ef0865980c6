use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use parkeasy::data::file::JsonFileStore;
use parkeasy::data::memory::InMemoryKeyValueStore;
use parkeasy::domain::repository::KeyValueStore;
use parkeasy::infrastructure::config::{AppConfig, StorageBackend};
use parkeasy::infrastructure::logging::init_logging;
use parkeasy::presentation::handlers::{AppState, configure};
use parkeasy::presentation::middleware::RequestContextMiddleware;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(&config.log_level);
    info!(host = %config.host, port = config.port, "Configuration loaded");

    let store: Arc<dyn KeyValueStore> = match &config.storage {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; state is lost on restart");
            Arc::new(InMemoryKeyValueStore::new())
        }
        StorageBackend::File(path) => {
            info!(path = %path.display(), "Using file storage");
            Arc::new(JsonFileStore::open(path.clone()).await?)
        }
    };

    let state = web::Data::new(AppState::new(store, &config)?);
    info!(
        spots = state.booking_service.catalog().spots().len(),
        discounted = %config.pricing.discounted_car_type,
        "Application state initialized"
    );

    let cors_origin = config.cors_origin.clone();
    let server = HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header(),
            None => Cors::default(),
        };
        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(RequestContextMiddleware)
            .configure(configure)
    });

    let server = server.bind((config.host.as_str(), config.port))?;
    info!(address = %format!("{}:{}", config.host, config.port), "Starting HTTP server");
    server.run().await?;
    Ok(())
}

//! Sitelayer API
//!
//! HTTP service storing construction and urban-planning projects in a document store,
//! with text, attribute, budget, date and geospatial filtering over paginated listings.

pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod model;
pub mod routes;
pub mod state;

use axum::Router;
use sitelayer::{
    memory::InMemoryStore,
    mongodb::MongoDbStore,
    prelude::{DocumentStore, DynDocumentStore, IndexKind, IntoDynDocumentStore, StoreBackendBuilder},
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use config::{Config, StoreKind};
use error::Result;
use model::{LOCATION_FIELD, Project};
use state::AppState;

/// Build the application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    // Wildcards can't be combined with credentials, so request values are echoed back.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .nest("/test", routes::health::router())
        .nest("/projects", routes::projects::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Open the store selected by the configuration.
pub async fn connect_store(config: &Config) -> Result<DynDocumentStore> {
    let store = match config.backend {
        StoreKind::MongoDb => DocumentStore::new(
            MongoDbStore::builder(&config.database.url, &config.database.name)
                .build()
                .await?,
        )
        .into_dyn(),
        StoreKind::Memory => DocumentStore::new(InMemoryStore::builder().build().await?).into_dyn(),
    };

    Ok(store)
}

/// Create the geospatial index on project locations.
///
/// Containment queries still work without it, so failures are only logged.
pub async fn ensure_indexes(store: &DynDocumentStore) {
    match store
        .collection_for::<Project>()
        .ensure_index(LOCATION_FIELD, IndexKind::Sphere2d)
        .await
    {
        Ok(()) => tracing::debug!("2dsphere index ready on {}", LOCATION_FIELD),
        Err(e) => tracing::warn!("Failed to create 2dsphere index on {}: {}", LOCATION_FIELD, e),
    }
}

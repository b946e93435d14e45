// Read-only dashboard APIs over the world store

pub mod query;
pub mod websocket;

pub use query::create_query_router;
pub use websocket::{create_ws_router, PublicationSummary};

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::world::WorldStore;

/// Query and WebSocket routes with permissive CORS for browser dashboards
pub fn create_router(store: Arc<WorldStore>) -> Router {
    create_query_router(Arc::clone(&store))
        .merge(create_ws_router(store))
        .layer(CorsLayer::permissive())
}

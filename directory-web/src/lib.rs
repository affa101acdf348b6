use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod render;

use handlers::{AppState, home_router, item_router, menu_router, restaurant_router};
use render::Renderer;

pub use config::Settings;

pub fn app(
    store: directory_store::Store,
    renderer: Arc<dyn Renderer>,
    public_dir: Option<&std::path::Path>,
) -> Router {
    let router = Router::new()
        .merge(home_router())
        .merge(restaurant_router())
        .merge(menu_router())
        .merge(item_router());

    let router = match public_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .with_state(AppState::new(store, renderer))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

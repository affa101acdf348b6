pub mod item;
pub mod menu;
pub mod restaurant;

pub use item::router as item_router;
pub use menu::router as menu_router;
pub use restaurant::router as restaurant_router;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::{Json, Response},
    routing::get,
};
use directory_store::Store;
use serde_json::json;
use tracing::instrument;
use utoipa::OpenApi;

use crate::error::ApiError;
use crate::render::Renderer;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    pub fn new(store: Store, renderer: Arc<dyn Renderer>) -> Self {
        Self { store, renderer }
    }
}

pub fn home_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/api-docs/openapi.json", get(openapi))
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Landing page"),
    ),
    tag = "home"
)]
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Response, ApiError> {
    state.renderer.render("home", json!({}))
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn detail_path(restaurant_id: i32) -> String {
    format!("/restaurants/{restaurant_id}")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        home,
        restaurant::list_restaurants,
        restaurant::get_restaurant,
        restaurant::create_restaurant,
        restaurant::edit_restaurant,
        restaurant::update_restaurant,
        restaurant::confirm_delete_restaurant,
        restaurant::delete_restaurant,
        menu::create_menu,
        menu::edit_menu,
        menu::update_menu,
        menu::confirm_delete_menu,
        menu::delete_menu,
        item::new_item,
        item::create_item,
        item::edit_item,
        item::update_item,
        item::confirm_delete_item,
        item::delete_item,
    ),
    components(
        schemas(
            crate::models::RestaurantForm,
            crate::models::MenuForm,
            crate::models::ItemForm,
            crate::models::ApiErrorResponse
        )
    ),
    tags(
        (name = "home", description = "Landing page"),
        (name = "restaurants", description = "Restaurant pages and forms"),
        (name = "menus", description = "Menu forms"),
        (name = "items", description = "Menu item forms")
    ),
    info(
        title = "Restaurant Directory",
        description = "Restaurants, their menus and menu items",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

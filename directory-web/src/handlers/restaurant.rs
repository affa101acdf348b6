use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Redirect, Response},
    routing::get,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::models::*;
use crate::render::context;

use super::{AppState, detail_path};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurants",
            get(list_restaurants).post(create_restaurant),
        )
        .route(
            "/restaurants/{restaurant_id}",
            get(get_restaurant).delete(delete_restaurant),
        )
        .route(
            "/restaurants/{restaurant_id}/edit",
            get(edit_restaurant).post(update_restaurant),
        )
        .route(
            "/restaurants/{restaurant_id}/delete",
            get(confirm_delete_restaurant).post(delete_restaurant),
        )
}

#[utoipa::path(
    get,
    path = "/restaurants",
    responses(
        (status = 200, description = "Restaurants with their menus"),
        (status = 500, description = "Store failure", body = ApiErrorResponse),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn list_restaurants(State(state): State<AppState>) -> Result<Response, ApiError> {
    let restaurants = state.store.find_restaurants_with_menus().await?;
    state
        .renderer
        .render("restaurants", json!({ "restaurants": context(&restaurants)? }))
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}",
    responses(
        (status = 200, description = "Restaurant with menus and items"),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let detail = state.store.find_restaurant_detail(id).await?;
    state.renderer.render("restaurant", context(&detail)?)
}

#[utoipa::path(
    post,
    path = "/restaurants",
    request_body(content = RestaurantForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Restaurant created, redirect to its page"),
        (status = 400, description = "Missing field", body = ApiErrorResponse),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn create_restaurant(
    State(state): State<AppState>,
    Form(form): Form<RestaurantForm>,
) -> Result<Redirect, ApiError> {
    let restaurant = state.store.create_restaurant(form.into_new()?).await?;
    info!(id = restaurant.id, "restaurant created");
    Ok(Redirect::to(&detail_path(restaurant.id)))
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/edit",
    responses(
        (status = 200, description = "Restaurant edit form"),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn edit_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let restaurant = state.store.find_restaurant(id).await?;
    state.renderer.render(
        "restaurant_edit",
        json!({ "restaurant": context(&restaurant)? }),
    )
}

#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/edit",
    request_body(content = RestaurantForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Restaurant updated, redirect to its page"),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<RestaurantForm>,
) -> Result<Redirect, ApiError> {
    state
        .store
        .update_restaurant(id, form.into_changes())
        .await?;
    Ok(Redirect::to(&detail_path(id)))
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/delete",
    responses(
        (status = 200, description = "Delete confirmation, nothing is deleted"),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn confirm_delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let restaurant = state.store.find_restaurant(id).await?;
    state.renderer.render(
        "confirm_delete",
        json!({
            "kind": "restaurant",
            "restaurant": context(&restaurant)?,
            "action": format!("/restaurants/{id}/delete"),
            "policy": state.store.delete_policy().to_string(),
        }),
    )
}

#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/delete",
    responses(
        (status = 303, description = "Restaurant deleted, redirect to the list"),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 409, description = "Restaurant still has menus", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect, ApiError> {
    state.store.destroy_restaurant(id).await?;
    info!(id, "restaurant deleted");
    Ok(Redirect::to("/restaurants"))
}

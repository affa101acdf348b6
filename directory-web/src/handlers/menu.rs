use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Redirect, Response},
    routing::{delete, get, post},
};
use serde_json::json;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::models::*;
use crate::render::context;

use super::{AppState, detail_path};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants/{restaurant_id}/menus", post(create_menu))
        .route(
            "/restaurants/{restaurant_id}/menus/{menu_id}",
            delete(delete_menu),
        )
        .route(
            "/restaurants/{restaurant_id}/menus/{menu_id}/edit",
            get(edit_menu).post(update_menu),
        )
        .route(
            "/restaurants/{restaurant_id}/menus/{menu_id}/delete",
            get(confirm_delete_menu).post(delete_menu),
        )
}

#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/menus",
    request_body(content = MenuForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Menu created, redirect to the restaurant"),
        (status = 400, description = "Missing title", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "menus"
)]
#[instrument(skip(state))]
pub async fn create_menu(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i32>,
    Form(form): Form<MenuForm>,
) -> Result<Redirect, ApiError> {
    let menu = state
        .store
        .create_menu(form.into_new(restaurant_id)?)
        .await?;
    info!(id = menu.id, restaurant_id, "menu created");
    Ok(Redirect::to(&detail_path(restaurant_id)))
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/menus/{menu_id}/edit",
    responses(
        (status = 200, description = "Menu edit form"),
        (status = 404, description = "Restaurant or menu not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID"),
        ("menu_id" = i32, Path, description = "Menu ID")
    ),
    tag = "menus"
)]
#[instrument(skip(state))]
pub async fn edit_menu(
    State(state): State<AppState>,
    Path((restaurant_id, menu_id)): Path<(i32, i32)>,
) -> Result<Response, ApiError> {
    let restaurant = state.store.find_restaurant(restaurant_id).await?;
    let menu = state
        .store
        .find_menu_in_restaurant(restaurant_id, menu_id)
        .await?;
    state.renderer.render(
        "menu_edit",
        json!({
            "restaurant": context(&restaurant)?,
            "menu": context(&menu)?,
        }),
    )
}

#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/menus/{menu_id}/edit",
    request_body(content = MenuForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Menu updated, redirect to its restaurant"),
        (status = 400, description = "Malformed field", body = ApiErrorResponse),
        (status = 404, description = "Restaurant or menu not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID"),
        ("menu_id" = i32, Path, description = "Menu ID")
    ),
    tag = "menus"
)]
#[instrument(skip(state))]
pub async fn update_menu(
    State(state): State<AppState>,
    Path((restaurant_id, menu_id)): Path<(i32, i32)>,
    Form(form): Form<MenuForm>,
) -> Result<Redirect, ApiError> {
    let changes = form.into_changes()?;
    state
        .store
        .find_menu_in_restaurant(restaurant_id, menu_id)
        .await?;
    let menu = state.store.update_menu(menu_id, changes).await?;
    Ok(Redirect::to(&detail_path(
        menu.restaurant_id.unwrap_or(restaurant_id),
    )))
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/menus/{menu_id}/delete",
    responses(
        (status = 200, description = "Delete confirmation, nothing is deleted"),
        (status = 404, description = "Restaurant or menu not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID"),
        ("menu_id" = i32, Path, description = "Menu ID")
    ),
    tag = "menus"
)]
#[instrument(skip(state))]
pub async fn confirm_delete_menu(
    State(state): State<AppState>,
    Path((restaurant_id, menu_id)): Path<(i32, i32)>,
) -> Result<Response, ApiError> {
    let menu = state
        .store
        .find_menu_in_restaurant(restaurant_id, menu_id)
        .await?;
    state.renderer.render(
        "confirm_delete",
        json!({
            "kind": "menu",
            "menu": context(&menu)?,
            "action": format!("/restaurants/{restaurant_id}/menus/{menu_id}/delete"),
            "policy": state.store.delete_policy().to_string(),
        }),
    )
}

#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/menus/{menu_id}/delete",
    responses(
        (status = 303, description = "Menu deleted, redirect to the restaurant"),
        (status = 404, description = "Restaurant or menu not found", body = ApiErrorResponse),
        (status = 409, description = "Menu still has items", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID"),
        ("menu_id" = i32, Path, description = "Menu ID")
    ),
    tag = "menus"
)]
#[instrument(skip(state))]
pub async fn delete_menu(
    State(state): State<AppState>,
    Path((restaurant_id, menu_id)): Path<(i32, i32)>,
) -> Result<Redirect, ApiError> {
    state
        .store
        .find_menu_in_restaurant(restaurant_id, menu_id)
        .await?;
    state.store.destroy_menu(menu_id).await?;
    info!(id = menu_id, restaurant_id, "menu deleted");
    Ok(Redirect::to(&detail_path(restaurant_id)))
}

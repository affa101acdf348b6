use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Redirect, Response},
    routing::{delete, get},
};
use directory_store::models::Menu;
use serde_json::json;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::models::*;
use crate::render::context;

use super::{AppState, detail_path};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurants/{restaurant_id}/menus/{menu_id}/items",
            get(new_item).post(create_item),
        )
        .route(
            "/restaurants/{restaurant_id}/menus/{menu_id}/items/{item_id}",
            delete(delete_item),
        )
        .route(
            "/restaurants/{restaurant_id}/menus/{menu_id}/items/{item_id}/edit",
            get(edit_item).post(update_item),
        )
        .route(
            "/restaurants/{restaurant_id}/menus/{menu_id}/items/{item_id}/delete",
            get(confirm_delete_item).post(delete_item),
        )
}

// Resolves the menu through its restaurant so a stale nested path is a 404.
async fn scoped_menu(state: &AppState, restaurant_id: i32, menu_id: i32) -> Result<Menu, ApiError> {
    Ok(state
        .store
        .find_menu_in_restaurant(restaurant_id, menu_id)
        .await?)
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/menus/{menu_id}/items",
    responses(
        (status = 200, description = "Add item form"),
        (status = 404, description = "Restaurant or menu not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID"),
        ("menu_id" = i32, Path, description = "Menu ID")
    ),
    tag = "items"
)]
#[instrument(skip(state))]
pub async fn new_item(
    State(state): State<AppState>,
    Path((restaurant_id, menu_id)): Path<(i32, i32)>,
) -> Result<Response, ApiError> {
    let restaurant = state.store.find_restaurant(restaurant_id).await?;
    let menu = scoped_menu(&state, restaurant_id, menu_id).await?;
    state.renderer.render(
        "item_new",
        json!({
            "restaurant": context(&restaurant)?,
            "menu": context(&menu)?,
        }),
    )
}

#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/menus/{menu_id}/items",
    request_body(content = ItemForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Item created, redirect to the restaurant"),
        (status = 400, description = "Missing or malformed field", body = ApiErrorResponse),
        (status = 404, description = "Restaurant or menu not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID"),
        ("menu_id" = i32, Path, description = "Menu ID")
    ),
    tag = "items"
)]
#[instrument(skip(state))]
pub async fn create_item(
    State(state): State<AppState>,
    Path((restaurant_id, menu_id)): Path<(i32, i32)>,
    Form(form): Form<ItemForm>,
) -> Result<Redirect, ApiError> {
    let new = form.into_new(menu_id)?;
    scoped_menu(&state, restaurant_id, menu_id).await?;
    let item = state.store.create_item(new).await?;
    info!(id = item.id, menu_id, "item created");
    Ok(Redirect::to(&detail_path(restaurant_id)))
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/menus/{menu_id}/items/{item_id}/edit",
    responses(
        (status = 200, description = "Item edit form"),
        (status = 404, description = "Restaurant, menu or item not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID"),
        ("menu_id" = i32, Path, description = "Menu ID"),
        ("item_id" = i32, Path, description = "Item ID")
    ),
    tag = "items"
)]
#[instrument(skip(state))]
pub async fn edit_item(
    State(state): State<AppState>,
    Path((restaurant_id, menu_id, item_id)): Path<(i32, i32, i32)>,
) -> Result<Response, ApiError> {
    let restaurant = state.store.find_restaurant(restaurant_id).await?;
    let menu = scoped_menu(&state, restaurant_id, menu_id).await?;
    let item = state.store.find_item_in_menu(menu_id, item_id).await?;
    state.renderer.render(
        "item_edit",
        json!({
            "restaurant": context(&restaurant)?,
            "menu": context(&menu)?,
            "item": context(&item)?,
        }),
    )
}

#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/menus/{menu_id}/items/{item_id}/edit",
    request_body(content = ItemForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Item updated, redirect to the restaurant that now owns it"),
        (status = 400, description = "Malformed field", body = ApiErrorResponse),
        (status = 404, description = "Restaurant, menu or item not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID"),
        ("menu_id" = i32, Path, description = "Menu ID"),
        ("item_id" = i32, Path, description = "Item ID")
    ),
    tag = "items"
)]
#[instrument(skip(state))]
pub async fn update_item(
    State(state): State<AppState>,
    Path((restaurant_id, menu_id, item_id)): Path<(i32, i32, i32)>,
    Form(form): Form<ItemForm>,
) -> Result<Redirect, ApiError> {
    let changes = form.into_changes()?;
    scoped_menu(&state, restaurant_id, menu_id).await?;
    state.store.find_item_in_menu(menu_id, item_id).await?;
    let item = state.store.update_item(item_id, changes).await?;

    // a moved item lands on its new menu's restaurant
    let owner = match item.menu_id {
        Some(moved_to) if moved_to != menu_id => state
            .store
            .find_menu(moved_to)
            .await?
            .restaurant_id
            .unwrap_or(restaurant_id),
        _ => restaurant_id,
    };
    Ok(Redirect::to(&detail_path(owner)))
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/menus/{menu_id}/items/{item_id}/delete",
    responses(
        (status = 200, description = "Delete confirmation, nothing is deleted"),
        (status = 404, description = "Restaurant, menu or item not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID"),
        ("menu_id" = i32, Path, description = "Menu ID"),
        ("item_id" = i32, Path, description = "Item ID")
    ),
    tag = "items"
)]
#[instrument(skip(state))]
pub async fn confirm_delete_item(
    State(state): State<AppState>,
    Path((restaurant_id, menu_id, item_id)): Path<(i32, i32, i32)>,
) -> Result<Response, ApiError> {
    scoped_menu(&state, restaurant_id, menu_id).await?;
    let item = state.store.find_item_in_menu(menu_id, item_id).await?;
    state.renderer.render(
        "confirm_delete",
        json!({
            "kind": "item",
            "item": context(&item)?,
            "action": format!(
                "/restaurants/{restaurant_id}/menus/{menu_id}/items/{item_id}/delete"
            ),
        }),
    )
}

#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/menus/{menu_id}/items/{item_id}/delete",
    responses(
        (status = 303, description = "Item deleted, redirect to the restaurant"),
        (status = 404, description = "Restaurant, menu or item not found", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant ID"),
        ("menu_id" = i32, Path, description = "Menu ID"),
        ("item_id" = i32, Path, description = "Item ID")
    ),
    tag = "items"
)]
#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    Path((restaurant_id, menu_id, item_id)): Path<(i32, i32, i32)>,
) -> Result<Redirect, ApiError> {
    scoped_menu(&state, restaurant_id, menu_id).await?;
    state.store.find_item_in_menu(menu_id, item_id).await?;
    state.store.destroy_item(item_id).await?;
    info!(id = item_id, menu_id, "item deleted");
    Ok(Redirect::to(&detail_path(restaurant_id)))
}

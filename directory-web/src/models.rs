use directory_store::models::{
    ItemChanges, MenuChanges, NewItem, NewMenu, NewRestaurant, RestaurantChanges,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

/// Trims a submitted field; blank values count as absent.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    present(value).ok_or_else(|| ApiError::Validation(format!("`{field}` is required")))
}

fn parse_id(value: Option<String>, field: &str) -> Result<Option<i32>, ApiError> {
    present(value)
        .map(|v| {
            v.parse::<i32>()
                .map_err(|_| ApiError::Validation(format!("`{field}` must be an integer id")))
        })
        .transpose()
}

/// Prices are finite and non-negative; zero is a valid price.
pub fn parse_price(value: &str) -> Result<f64, ApiError> {
    let price = value
        .trim()
        .parse::<f64>()
        .map_err(|_| ApiError::Validation(format!("`price` must be a number, got `{value}`")))?;
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::Validation(
            "`price` must be a non-negative number".to_string(),
        ));
    }
    Ok(price)
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct RestaurantForm {
    /// Name of the restaurant
    pub name: Option<String>,
    /// Image URL of the restaurant
    pub image: Option<String>,
}

impl RestaurantForm {
    pub fn into_new(self) -> Result<NewRestaurant, ApiError> {
        Ok(NewRestaurant {
            name: required(self.name, "name")?,
            image: required(self.image, "image")?,
        })
    }

    pub fn into_changes(self) -> RestaurantChanges {
        RestaurantChanges {
            name: present(self.name),
            image: present(self.image),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct MenuForm {
    /// Title of the menu
    pub title: Option<String>,
    /// Restaurant to move the menu to (update only)
    pub restaurant_id: Option<String>,
}

impl MenuForm {
    pub fn into_new(self, restaurant_id: i32) -> Result<NewMenu, ApiError> {
        Ok(NewMenu {
            title: required(self.title, "title")?,
            restaurant_id: Some(restaurant_id),
        })
    }

    pub fn into_changes(self) -> Result<MenuChanges, ApiError> {
        Ok(MenuChanges {
            title: present(self.title),
            restaurant_id: parse_id(self.restaurant_id, "restaurant_id")?,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ItemForm {
    /// Name of the item
    pub name: Option<String>,
    /// Price of the item (as string)
    pub price: Option<String>,
    /// Menu to move the item to (update only)
    pub menu_id: Option<String>,
}

impl ItemForm {
    pub fn into_new(self, menu_id: i32) -> Result<NewItem, ApiError> {
        let name = required(self.name, "name")?;
        let price = parse_price(&required(self.price, "price")?)?;
        Ok(NewItem {
            name,
            price,
            menu_id: Some(menu_id),
        })
    }

    pub fn into_changes(self) -> Result<ItemChanges, ApiError> {
        Ok(ItemChanges {
            name: present(self.name),
            price: present(self.price).as_deref().map(parse_price).transpose()?,
            menu_id: parse_id(self.menu_id, "menu_id")?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
}

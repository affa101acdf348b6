use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{items, menus, restaurants};

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = restaurants)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct NewRestaurant {
    pub name: String,
    pub image: String,
}

/// Fields left as `None` are not written.
#[derive(AsChangeset, Deserialize, Debug, Default, Clone, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct RestaurantChanges {
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(table_name = menus)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: i32,
    pub title: String,
    pub restaurant_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = menus)]
pub struct NewMenu {
    pub title: String,
    pub restaurant_id: Option<i32>,
}

/// Supplying `restaurant_id` moves the menu to another restaurant.
#[derive(AsChangeset, Deserialize, Debug, Default, Clone, PartialEq)]
#[diesel(table_name = menus)]
pub struct MenuChanges {
    pub title: Option<String>,
    pub restaurant_id: Option<i32>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Menu))]
#[diesel(table_name = items)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub menu_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = items)]
pub struct NewItem {
    pub name: String,
    pub price: f64,
    pub menu_id: Option<i32>,
}

/// Supplying `menu_id` moves the item to another menu.
#[derive(AsChangeset, Deserialize, Debug, Default, Clone, PartialEq)]
#[diesel(table_name = items)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub menu_id: Option<i32>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RestaurantWithMenus {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub menus: Vec<Menu>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MenuWithItems {
    #[serde(flatten)]
    pub menu: Menu,
    pub items: Vec<Item>,
}

/// A restaurant with its menus, each carrying its items.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RestaurantDetail {
    pub restaurant: Restaurant,
    pub menus: Vec<MenuWithItems>,
}

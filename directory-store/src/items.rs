use diesel::dsl::now;
use diesel::prelude::*;

use crate::models::{Item, ItemChanges, NewItem};
use crate::schema::items;
use crate::{menus, StoreError};

const ENTITY: &str = "item";

fn ensure_menu(conn: &mut SqliteConnection, menu_id: i32) -> Result<(), StoreError> {
    if menus::exists(conn, menu_id)? {
        Ok(())
    } else {
        Err(StoreError::not_found("menu", menu_id))
    }
}

pub fn create(conn: &mut SqliteConnection, new: &NewItem) -> Result<Item, StoreError> {
    conn.immediate_transaction::<_, StoreError, _>(|conn| {
        if let Some(menu_id) = new.menu_id {
            ensure_menu(conn, menu_id)?;
        }
        Ok(diesel::insert_into(items::table)
            .values(new)
            .returning(Item::as_returning())
            .get_result(conn)?)
    })
}

pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> Result<Item, StoreError> {
    items::table
        .find(id)
        .select(Item::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| StoreError::not_found(ENTITY, id))
}

pub fn find_in_menu(conn: &mut SqliteConnection, menu_id: i32, id: i32) -> Result<Item, StoreError> {
    ensure_menu(conn, menu_id)?;
    items::table
        .find(id)
        .filter(items::menu_id.eq(menu_id))
        .select(Item::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| StoreError::not_found(ENTITY, id))
}

pub fn find_all(conn: &mut SqliteConnection) -> Result<Vec<Item>, StoreError> {
    Ok(items::table
        .order(items::id.asc())
        .select(Item::as_select())
        .load(conn)?)
}

pub fn update(
    conn: &mut SqliteConnection,
    id: i32,
    changes: &ItemChanges,
) -> Result<Item, StoreError> {
    conn.immediate_transaction::<_, StoreError, _>(|conn| {
        if let Some(menu_id) = changes.menu_id {
            ensure_menu(conn, menu_id)?;
        }
        diesel::update(items::table.find(id))
            .set((changes, items::updated_at.eq(now)))
            .returning(Item::as_returning())
            .get_result(conn)
            .optional()?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))
    })
}

/// Items have no children, so every delete policy behaves the same.
pub fn destroy(conn: &mut SqliteConnection, id: i32) -> Result<(), StoreError> {
    let deleted = diesel::delete(items::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(StoreError::not_found(ENTITY, id));
    }
    Ok(())
}

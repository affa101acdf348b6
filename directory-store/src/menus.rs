use diesel::dsl::now;
use diesel::prelude::*;

use crate::models::{Item, Menu, MenuChanges, MenuWithItems, NewMenu};
use crate::schema::{items, menus};
use crate::{restaurants, DeletePolicy, StoreError};

const ENTITY: &str = "menu";

fn ensure_restaurant(conn: &mut SqliteConnection, restaurant_id: i32) -> Result<(), StoreError> {
    if restaurants::exists(conn, restaurant_id)? {
        Ok(())
    } else {
        Err(StoreError::not_found("restaurant", restaurant_id))
    }
}

/// Inserts a menu, attached to `restaurant_id` when one is given.
pub fn create(conn: &mut SqliteConnection, new: &NewMenu) -> Result<Menu, StoreError> {
    conn.immediate_transaction::<_, StoreError, _>(|conn| {
        if let Some(restaurant_id) = new.restaurant_id {
            ensure_restaurant(conn, restaurant_id)?;
        }
        Ok(diesel::insert_into(menus::table)
            .values(new)
            .returning(Menu::as_returning())
            .get_result(conn)?)
    })
}

pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> Result<Menu, StoreError> {
    menus::table
        .find(id)
        .select(Menu::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| StoreError::not_found(ENTITY, id))
}

/// Finds a menu only if it belongs to `restaurant_id`.
pub fn find_in_restaurant(
    conn: &mut SqliteConnection,
    restaurant_id: i32,
    id: i32,
) -> Result<Menu, StoreError> {
    ensure_restaurant(conn, restaurant_id)?;
    menus::table
        .find(id)
        .filter(menus::restaurant_id.eq(restaurant_id))
        .select(Menu::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| StoreError::not_found(ENTITY, id))
}

pub fn exists(conn: &mut SqliteConnection, id: i32) -> Result<bool, StoreError> {
    let count: i64 = menus::table.find(id).count().get_result(conn)?;
    Ok(count > 0)
}

pub fn find_all(conn: &mut SqliteConnection) -> Result<Vec<Menu>, StoreError> {
    Ok(menus::table
        .order(menus::id.asc())
        .select(Menu::as_select())
        .load(conn)?)
}

pub fn find_all_with_items(conn: &mut SqliteConnection) -> Result<Vec<MenuWithItems>, StoreError> {
    let results = find_all(conn)?;
    let items = Item::belonging_to(&results)
        .order(items::id.asc())
        .select(Item::as_select())
        .load(conn)?
        .grouped_by(&results);

    Ok(results
        .into_iter()
        .zip(items)
        .map(|(menu, items)| MenuWithItems { menu, items })
        .collect())
}

pub fn update(
    conn: &mut SqliteConnection,
    id: i32,
    changes: &MenuChanges,
) -> Result<Menu, StoreError> {
    conn.immediate_transaction::<_, StoreError, _>(|conn| {
        if let Some(restaurant_id) = changes.restaurant_id {
            ensure_restaurant(conn, restaurant_id)?;
        }
        diesel::update(menus::table.find(id))
            .set((changes, menus::updated_at.eq(now)))
            .returning(Menu::as_returning())
            .get_result(conn)
            .optional()?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))
    })
}

pub fn destroy(
    conn: &mut SqliteConnection,
    id: i32,
    policy: DeletePolicy,
) -> Result<(), StoreError> {
    conn.immediate_transaction::<_, StoreError, _>(|conn| {
        find_by_id(conn, id)?;

        let children = items::table.filter(items::menu_id.eq(id));
        match policy {
            DeletePolicy::Orphan => {
                diesel::update(children)
                    .set((items::menu_id.eq(None::<i32>), items::updated_at.eq(now)))
                    .execute(conn)?;
            }
            DeletePolicy::Cascade => {
                diesel::delete(children).execute(conn)?;
            }
            DeletePolicy::Reject => {
                let count: i64 = children.count().get_result(conn)?;
                if count > 0 {
                    return Err(StoreError::Conflict(format!(
                        "menu {id} still has {count} item(s)"
                    )));
                }
            }
        }

        diesel::delete(menus::table.find(id)).execute(conn)?;
        Ok(())
    })
}

/// Replaces the menu's items with exactly `item_ids`.
pub fn set_items(
    conn: &mut SqliteConnection,
    menu_id: i32,
    item_ids: &[i32],
) -> Result<Vec<Item>, StoreError> {
    conn.immediate_transaction::<_, StoreError, _>(|conn| {
        find_by_id(conn, menu_id)?;

        let found: Vec<i32> = items::table
            .filter(items::id.eq_any(item_ids))
            .select(items::id)
            .load(conn)?;
        if let Some(missing) = item_ids.iter().find(|id| !found.contains(id)) {
            return Err(StoreError::not_found("item", *missing));
        }

        diesel::update(
            items::table
                .filter(items::menu_id.eq(menu_id))
                .filter(items::id.ne_all(item_ids)),
        )
        .set((items::menu_id.eq(None::<i32>), items::updated_at.eq(now)))
        .execute(conn)?;

        diesel::update(items::table.filter(items::id.eq_any(item_ids)))
            .set((items::menu_id.eq(menu_id), items::updated_at.eq(now)))
            .execute(conn)?;

        Ok(items::table
            .filter(items::menu_id.eq(menu_id))
            .order(items::id.asc())
            .select(Item::as_select())
            .load(conn)?)
    })
}

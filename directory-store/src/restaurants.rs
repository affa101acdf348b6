use diesel::dsl::now;
use diesel::prelude::*;

use crate::models::{
    Item, Menu, MenuWithItems, NewRestaurant, Restaurant, RestaurantChanges, RestaurantDetail,
    RestaurantWithMenus,
};
use crate::schema::{items, menus, restaurants};
use crate::{DeletePolicy, StoreError};

const ENTITY: &str = "restaurant";

pub fn create(conn: &mut SqliteConnection, new: &NewRestaurant) -> Result<Restaurant, StoreError> {
    let restaurant = diesel::insert_into(restaurants::table)
        .values(new)
        .returning(Restaurant::as_returning())
        .get_result(conn)?;
    Ok(restaurant)
}

pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> Result<Restaurant, StoreError> {
    restaurants::table
        .find(id)
        .select(Restaurant::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| StoreError::not_found(ENTITY, id))
}

pub fn exists(conn: &mut SqliteConnection, id: i32) -> Result<bool, StoreError> {
    let count: i64 = restaurants::table.find(id).count().get_result(conn)?;
    Ok(count > 0)
}

pub fn count(conn: &mut SqliteConnection) -> Result<i64, StoreError> {
    Ok(restaurants::table.count().get_result(conn)?)
}

pub fn find_all(conn: &mut SqliteConnection) -> Result<Vec<Restaurant>, StoreError> {
    Ok(restaurants::table
        .order(restaurants::id.asc())
        .select(Restaurant::as_select())
        .load(conn)?)
}

pub fn find_all_with_menus(
    conn: &mut SqliteConnection,
) -> Result<Vec<RestaurantWithMenus>, StoreError> {
    let results = find_all(conn)?;
    let menus = Menu::belonging_to(&results)
        .order(menus::id.asc())
        .select(Menu::as_select())
        .load(conn)?
        .grouped_by(&results);

    Ok(results
        .into_iter()
        .zip(menus)
        .map(|(restaurant, menus)| RestaurantWithMenus { restaurant, menus })
        .collect())
}

/// Loads a restaurant with its menus and their items in three queries.
pub fn find_detail(conn: &mut SqliteConnection, id: i32) -> Result<RestaurantDetail, StoreError> {
    let restaurant = find_by_id(conn, id)?;
    let menus = Menu::belonging_to(&restaurant)
        .order(menus::id.asc())
        .select(Menu::as_select())
        .load(conn)?;
    let items = Item::belonging_to(&menus)
        .order(items::id.asc())
        .select(Item::as_select())
        .load(conn)?
        .grouped_by(&menus);

    Ok(RestaurantDetail {
        restaurant,
        menus: menus
            .into_iter()
            .zip(items)
            .map(|(menu, items)| MenuWithItems { menu, items })
            .collect(),
    })
}

pub fn update(
    conn: &mut SqliteConnection,
    id: i32,
    changes: &RestaurantChanges,
) -> Result<Restaurant, StoreError> {
    diesel::update(restaurants::table.find(id))
        .set((changes, restaurants::updated_at.eq(now)))
        .returning(Restaurant::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or_else(|| StoreError::not_found(ENTITY, id))
}

pub fn destroy(
    conn: &mut SqliteConnection,
    id: i32,
    policy: DeletePolicy,
) -> Result<(), StoreError> {
    conn.immediate_transaction::<_, StoreError, _>(|conn| {
        find_by_id(conn, id)?;

        let menu_ids: Vec<i32> = menus::table
            .filter(menus::restaurant_id.eq(id))
            .select(menus::id)
            .load(conn)?;

        match policy {
            DeletePolicy::Orphan => {
                diesel::update(menus::table.filter(menus::id.eq_any(&menu_ids)))
                    .set((
                        menus::restaurant_id.eq(None::<i32>),
                        menus::updated_at.eq(now),
                    ))
                    .execute(conn)?;
            }
            DeletePolicy::Cascade => {
                diesel::delete(items::table.filter(items::menu_id.eq_any(&menu_ids)))
                    .execute(conn)?;
                diesel::delete(menus::table.filter(menus::id.eq_any(&menu_ids))).execute(conn)?;
            }
            DeletePolicy::Reject if !menu_ids.is_empty() => {
                return Err(StoreError::Conflict(format!(
                    "restaurant {id} still has {} menu(s)",
                    menu_ids.len()
                )));
            }
            DeletePolicy::Reject => {}
        }

        diesel::delete(restaurants::table.find(id)).execute(conn)?;
        Ok(())
    })
}

/// Replaces the restaurant's menus with exactly `menu_ids`.
///
/// Menus previously attached but not listed are detached. Calling this twice
/// with the same ids leaves the same state.
pub fn set_menus(
    conn: &mut SqliteConnection,
    restaurant_id: i32,
    menu_ids: &[i32],
) -> Result<Vec<Menu>, StoreError> {
    conn.immediate_transaction::<_, StoreError, _>(|conn| {
        find_by_id(conn, restaurant_id)?;

        let found: Vec<i32> = menus::table
            .filter(menus::id.eq_any(menu_ids))
            .select(menus::id)
            .load(conn)?;
        if let Some(missing) = menu_ids.iter().find(|id| !found.contains(id)) {
            return Err(StoreError::not_found("menu", *missing));
        }

        diesel::update(
            menus::table
                .filter(menus::restaurant_id.eq(restaurant_id))
                .filter(menus::id.ne_all(menu_ids)),
        )
        .set((
            menus::restaurant_id.eq(None::<i32>),
            menus::updated_at.eq(now),
        ))
        .execute(conn)?;

        diesel::update(menus::table.filter(menus::id.eq_any(menu_ids)))
            .set((
                menus::restaurant_id.eq(restaurant_id),
                menus::updated_at.eq(now),
            ))
            .execute(conn)?;

        Ok(menus::table
            .filter(menus::restaurant_id.eq(restaurant_id))
            .order(menus::id.asc())
            .select(Menu::as_select())
            .load(conn)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewItem, NewMenu};
    use crate::test_support::connection;
    use crate::{items as item_repo, menus as menu_repo};

    fn new_restaurant(name: &str) -> NewRestaurant {
        NewRestaurant {
            name: name.to_string(),
            image: format!("https://example.com/{name}.png"),
        }
    }

    fn menu_under(conn: &mut SqliteConnection, restaurant_id: i32, title: &str) -> Menu {
        menu_repo::create(
            conn,
            &NewMenu {
                title: title.to_string(),
                restaurant_id: Some(restaurant_id),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_create_then_list_has_no_menus() {
        let conn = &mut connection();
        let created = create(conn, &new_restaurant("Bistro")).unwrap();

        let listed = find_all_with_menus(conn).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].restaurant, created);
        assert!(listed[0].menus.is_empty());
    }

    #[test]
    fn test_find_by_id_missing() {
        let conn = &mut connection();
        let err = find_by_id(conn, 42).unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                entity: "restaurant",
                id: 42
            }
        ));
    }

    #[test]
    fn test_update_only_touches_supplied_fields() {
        let conn = &mut connection();
        let created = create(conn, &new_restaurant("Bistro")).unwrap();

        let updated = update(
            conn,
            created.id,
            &RestaurantChanges {
                name: Some("Brasserie".to_string()),
                image: None,
            },
        )
        .unwrap();

        assert_eq!(updated.name, "Brasserie");
        assert_eq!(updated.image, created.image);
        assert!(matches!(
            update(conn, created.id + 1, &RestaurantChanges::default()),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_find_detail_nests_items() {
        let conn = &mut connection();
        let restaurant = create(conn, &new_restaurant("Pizzeria")).unwrap();
        let dinner = menu_under(conn, restaurant.id, "Dinner");
        let lunch = menu_under(conn, restaurant.id, "Lunch");
        item_repo::create(
            conn,
            &NewItem {
                name: "Margherita".to_string(),
                price: 8.0,
                menu_id: Some(dinner.id),
            },
        )
        .unwrap();

        let detail = find_detail(conn, restaurant.id).unwrap();
        assert_eq!(detail.restaurant.name, "Pizzeria");
        assert_eq!(detail.menus.len(), 2);
        assert_eq!(detail.menus[0].menu.id, dinner.id);
        assert_eq!(detail.menus[0].items.len(), 1);
        assert_eq!(detail.menus[0].items[0].price, 8.0);
        assert_eq!(detail.menus[1].menu.id, lunch.id);
        assert!(detail.menus[1].items.is_empty());
    }

    #[test]
    fn test_set_menus_replaces_and_is_idempotent() {
        let conn = &mut connection();
        let restaurant = create(conn, &new_restaurant("Diner")).unwrap();
        let old = menu_under(conn, restaurant.id, "Old");
        let loose = menu_repo::create(
            conn,
            &NewMenu {
                title: "Loose".to_string(),
                restaurant_id: None,
            },
        )
        .unwrap();

        let first = set_menus(conn, restaurant.id, &[loose.id]).unwrap();
        let second = set_menus(conn, restaurant.id, &[loose.id]).unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, loose.id);
        assert_eq!(first[0].restaurant_id, Some(restaurant.id));
        assert_eq!(
            first.iter().map(|m| m.id).collect::<Vec<_>>(),
            second.iter().map(|m| m.id).collect::<Vec<_>>()
        );
        assert_eq!(menu_repo::find_by_id(conn, old.id).unwrap().restaurant_id, None);
    }

    #[test]
    fn test_set_menus_rejects_unknown_ids() {
        let conn = &mut connection();
        let restaurant = create(conn, &new_restaurant("Diner")).unwrap();
        let menu = menu_under(conn, restaurant.id, "Kept");

        let err = set_menus(conn, restaurant.id, &[menu.id, 999]).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "menu", id: 999 }));
        // the transaction left the existing association alone
        assert_eq!(
            menu_repo::find_by_id(conn, menu.id).unwrap().restaurant_id,
            Some(restaurant.id)
        );
        assert!(set_menus(conn, restaurant.id + 1, &[menu.id]).is_err());
    }

    #[test]
    fn test_destroy_orphans_menus() {
        let conn = &mut connection();
        let restaurant = create(conn, &new_restaurant("Cafe")).unwrap();
        let menu = menu_under(conn, restaurant.id, "Breakfast");

        destroy(conn, restaurant.id, DeletePolicy::Orphan).unwrap();

        assert!(!exists(conn, restaurant.id).unwrap());
        assert_eq!(menu_repo::find_by_id(conn, menu.id).unwrap().restaurant_id, None);
        assert!(find_all_with_menus(conn).unwrap().is_empty());
    }

    #[test]
    fn test_destroy_cascades_to_menus_and_items() {
        let conn = &mut connection();
        let doomed = create(conn, &new_restaurant("Doomed")).unwrap();
        let kept = create(conn, &new_restaurant("Kept")).unwrap();
        let doomed_menu = menu_under(conn, doomed.id, "Menu");
        let kept_menu = menu_under(conn, kept.id, "Menu");
        let doomed_item = item_repo::create(
            conn,
            &NewItem {
                name: "Soup".to_string(),
                price: 4.5,
                menu_id: Some(doomed_menu.id),
            },
        )
        .unwrap();
        let kept_item = item_repo::create(
            conn,
            &NewItem {
                name: "Salad".to_string(),
                price: 5.0,
                menu_id: Some(kept_menu.id),
            },
        )
        .unwrap();

        destroy(conn, doomed.id, DeletePolicy::Cascade).unwrap();

        assert!(menu_repo::find_by_id(conn, doomed_menu.id).is_err());
        assert!(item_repo::find_by_id(conn, doomed_item.id).is_err());
        assert_eq!(menu_repo::find_by_id(conn, kept_menu.id).unwrap(), kept_menu);
        assert_eq!(item_repo::find_by_id(conn, kept_item.id).unwrap(), kept_item);
    }

    #[test]
    fn test_destroy_reject_with_children() {
        let conn = &mut connection();
        let restaurant = create(conn, &new_restaurant("Busy")).unwrap();
        menu_under(conn, restaurant.id, "Menu");
        let empty = create(conn, &new_restaurant("Empty")).unwrap();

        let err = destroy(conn, restaurant.id, DeletePolicy::Reject).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(exists(conn, restaurant.id).unwrap());

        destroy(conn, empty.id, DeletePolicy::Reject).unwrap();
        assert!(!exists(conn, empty.id).unwrap());
    }

    #[test]
    fn test_destroy_missing_is_not_found() {
        let conn = &mut connection();
        let err = destroy(conn, 7, DeletePolicy::Orphan).unwrap_err();
        assert!(err.is_not_found());
    }
}

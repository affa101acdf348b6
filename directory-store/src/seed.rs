use std::path::Path;

use futures::future::{join_all, try_join_all};
use serde::Deserialize;
use tracing::{error, info, instrument};

use crate::models::{Menu, NewItem, NewMenu, NewRestaurant, Restaurant};
use crate::{Store, StoreError};

const BUNDLED_FIXTURE: &str = include_str!("../fixtures/restaurants.json");

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ItemFixture {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MenuFixture {
    pub title: String,
    #[serde(default)]
    pub items: Vec<ItemFixture>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RestaurantFixture {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub menus: Vec<MenuFixture>,
}

/// Ordered list of restaurants to load into an empty store.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Fixture {
    pub restaurants: Vec<RestaurantFixture>,
}

impl Fixture {
    pub fn bundled() -> Result<Self, StoreError> {
        Self::from_json(BUNDLED_FIXTURE)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Fixture(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Fixture(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store already had restaurants; nothing was written.
    Skipped { existing: i64 },
    Seeded { restaurants: usize, failed: usize },
}

/// Loads `fixture` if the restaurants table is empty.
///
/// Restaurants are seeded concurrently. A failing restaurant is logged and
/// counted without stopping the others; rows it already wrote are kept.
#[instrument(skip_all, fields(restaurants = fixture.restaurants.len()))]
pub async fn seed_if_empty(store: &Store, fixture: &Fixture) -> Result<SeedOutcome, StoreError> {
    let existing = store.count_restaurants().await?;
    if existing > 0 {
        info!(existing, "store already populated, skipping seed");
        return Ok(SeedOutcome::Skipped { existing });
    }

    let results = join_all(
        fixture
            .restaurants
            .iter()
            .map(|restaurant| seed_restaurant(store, restaurant)),
    )
    .await;

    let mut seeded = 0;
    let mut failed = 0;
    for (restaurant, result) in fixture.restaurants.iter().zip(results) {
        match result {
            Ok(_) => seeded += 1,
            Err(e) => {
                failed += 1;
                error!(restaurant = %restaurant.name, error = %e, "failed to seed restaurant");
            }
        }
    }

    info!(seeded, failed, "seed finished");
    Ok(SeedOutcome::Seeded {
        restaurants: seeded,
        failed,
    })
}

async fn seed_restaurant(
    store: &Store,
    fixture: &RestaurantFixture,
) -> Result<Restaurant, StoreError> {
    let restaurant = store
        .create_restaurant(NewRestaurant {
            name: fixture.name.clone(),
            image: fixture.image.clone(),
        })
        .await?;

    let menus = try_join_all(fixture.menus.iter().map(|menu| seed_menu(store, menu))).await?;
    store
        .set_menus(restaurant.id, menus.iter().map(|m| m.id).collect())
        .await?;

    Ok(restaurant)
}

async fn seed_menu(store: &Store, fixture: &MenuFixture) -> Result<Menu, StoreError> {
    let items = try_join_all(fixture.items.iter().map(|item| {
        store.create_item(NewItem {
            name: item.name.clone(),
            price: item.price,
            menu_id: None,
        })
    }))
    .await?;

    let menu = store
        .create_menu(NewMenu {
            title: fixture.title.clone(),
            restaurant_id: None,
        })
        .await?;
    store
        .set_items(menu.id, items.iter().map(|i| i.id).collect())
        .await?;

    Ok(menu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_store;
    use crate::DeletePolicy;

    const PIZZERIA: &str = r#"[
        {
            "name": "Pizzeria",
            "image": "https://example.com/pizzeria.png",
            "menus": [
                { "title": "Dinner", "items": [{ "name": "Margherita", "price": 8.0 }] }
            ]
        }
    ]"#;

    #[tokio::test]
    async fn test_seed_pizzeria_scenario() {
        let store = memory_store(DeletePolicy::Orphan);
        let fixture = Fixture::from_json(PIZZERIA).unwrap();

        let outcome = seed_if_empty(&store, &fixture).await.unwrap();
        assert_eq!(
            outcome,
            SeedOutcome::Seeded {
                restaurants: 1,
                failed: 0
            }
        );

        let restaurants = store.find_restaurants().await.unwrap();
        assert_eq!(restaurants.len(), 1);
        assert_eq!(restaurants[0].name, "Pizzeria");

        let detail = store
            .find_restaurant_detail(restaurants[0].id)
            .await
            .unwrap();
        assert_eq!(detail.menus.len(), 1);
        assert_eq!(detail.menus[0].menu.title, "Dinner");
        assert_eq!(detail.menus[0].items.len(), 1);
        assert_eq!(detail.menus[0].items[0].name, "Margherita");
        assert_eq!(detail.menus[0].items[0].price, 8.0);
    }

    #[tokio::test]
    async fn test_seed_bundled_fixture_counts() {
        let store = memory_store(DeletePolicy::Orphan);
        let fixture = Fixture::bundled().unwrap();

        seed_if_empty(&store, &fixture).await.unwrap();

        let mut seeded = store.find_restaurants().await.unwrap();
        assert_eq!(seeded.len(), fixture.restaurants.len());
        seeded.sort_by(|a, b| a.name.cmp(&b.name));
        let mut expected = fixture.restaurants.clone();
        expected.sort_by(|a, b| a.name.cmp(&b.name));

        for (restaurant, wanted) in seeded.iter().zip(&expected) {
            assert_eq!(restaurant.name, wanted.name);
            let detail = store.find_restaurant_detail(restaurant.id).await.unwrap();
            assert_eq!(detail.menus.len(), wanted.menus.len());

            let mut item_counts: Vec<(String, usize)> = detail
                .menus
                .iter()
                .map(|m| (m.menu.title.clone(), m.items.len()))
                .collect();
            item_counts.sort();
            let mut wanted_counts: Vec<(String, usize)> = wanted
                .menus
                .iter()
                .map(|m| (m.title.clone(), m.items.len()))
                .collect();
            wanted_counts.sort();
            assert_eq!(item_counts, wanted_counts);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_seed_file_database_with_pooled_connections() {
        let fixture = Fixture::bundled().unwrap();
        let item_total: usize = fixture
            .restaurants
            .iter()
            .flat_map(|r| &r.menus)
            .map(|m| m.items.len())
            .sum();

        // concurrent branches on separate connections must not lose a restaurant
        for _ in 0..10 {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("directory.db");
            let store =
                Store::connect(path.to_str().unwrap(), 8, DeletePolicy::Orphan).unwrap();

            let outcome = seed_if_empty(&store, &fixture).await.unwrap();
            assert_eq!(
                outcome,
                SeedOutcome::Seeded {
                    restaurants: fixture.restaurants.len(),
                    failed: 0
                }
            );
            assert_eq!(
                store.find_restaurants().await.unwrap().len(),
                fixture.restaurants.len()
            );
            assert_eq!(store.find_items().await.unwrap().len(), item_total);
        }
    }

    #[tokio::test]
    async fn test_seed_twice_is_noop() {
        let store = memory_store(DeletePolicy::Orphan);
        let fixture = Fixture::from_json(PIZZERIA).unwrap();

        seed_if_empty(&store, &fixture).await.unwrap();
        let again = seed_if_empty(&store, &fixture).await.unwrap();

        assert_eq!(again, SeedOutcome::Skipped { existing: 1 });
        assert_eq!(store.find_restaurants().await.unwrap().len(), 1);
        assert_eq!(store.find_menus().await.unwrap().len(), 1);
        assert_eq!(store.find_items().await.unwrap().len(), 1);
    }

    #[test]
    fn test_fixture_rejects_malformed_json() {
        let err = Fixture::from_json(r#"[{ "name": "No image" }]"#).unwrap_err();
        assert!(matches!(err, StoreError::Fixture(_)));
    }
}

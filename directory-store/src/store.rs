use std::fmt;
use std::str::FromStr;

use diesel::SqliteConnection;
use serde::Deserialize;

use crate::models::{
    Item, ItemChanges, Menu, MenuChanges, MenuWithItems, NewItem, NewMenu, NewRestaurant,
    Restaurant, RestaurantChanges, RestaurantDetail, RestaurantWithMenus,
};
use crate::{establish_pool, items, menus, restaurants, run_migrations, DbPool, StoreError};

/// What happens to a row's children when the row is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Children stay, with their parent key cleared.
    #[default]
    Orphan,
    /// Children (and grandchildren) are deleted with the parent.
    Cascade,
    /// The delete fails while any child exists.
    Reject,
}

impl FromStr for DeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orphan" => Ok(DeletePolicy::Orphan),
            "cascade" => Ok(DeletePolicy::Cascade),
            "reject" => Ok(DeletePolicy::Reject),
            other => Err(format!(
                "unknown delete policy `{other}` (expected orphan, cascade or reject)"
            )),
        }
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeletePolicy::Orphan => "orphan",
            DeletePolicy::Cascade => "cascade",
            DeletePolicy::Reject => "reject",
        };
        f.write_str(name)
    }
}

/// Async handle over the connection pool.
///
/// Every call checks out a connection and runs the Diesel query on the
/// blocking thread pool.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
    delete_policy: DeletePolicy,
}

impl Store {
    pub fn new(pool: DbPool, delete_policy: DeletePolicy) -> Self {
        Self {
            pool,
            delete_policy,
        }
    }

    /// Opens the pool and brings the schema up to date.
    pub fn connect(
        database_url: &str,
        pool_size: u32,
        delete_policy: DeletePolicy,
    ) -> Result<Self, StoreError> {
        let pool = establish_pool(database_url, pool_size)?;
        let mut conn = pool.get()?;
        run_migrations(&mut conn)?;
        Ok(Self::new(pool, delete_policy))
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await?
    }

    pub async fn count_restaurants(&self) -> Result<i64, StoreError> {
        self.run(restaurants::count).await
    }

    pub async fn create_restaurant(&self, new: NewRestaurant) -> Result<Restaurant, StoreError> {
        self.run(move |conn| restaurants::create(conn, &new)).await
    }

    pub async fn find_restaurant(&self, id: i32) -> Result<Restaurant, StoreError> {
        self.run(move |conn| restaurants::find_by_id(conn, id)).await
    }

    pub async fn find_restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        self.run(restaurants::find_all).await
    }

    pub async fn find_restaurants_with_menus(
        &self,
    ) -> Result<Vec<RestaurantWithMenus>, StoreError> {
        self.run(restaurants::find_all_with_menus).await
    }

    pub async fn find_restaurant_detail(&self, id: i32) -> Result<RestaurantDetail, StoreError> {
        self.run(move |conn| restaurants::find_detail(conn, id)).await
    }

    pub async fn update_restaurant(
        &self,
        id: i32,
        changes: RestaurantChanges,
    ) -> Result<Restaurant, StoreError> {
        self.run(move |conn| restaurants::update(conn, id, &changes))
            .await
    }

    pub async fn destroy_restaurant(&self, id: i32) -> Result<(), StoreError> {
        let policy = self.delete_policy;
        self.run(move |conn| restaurants::destroy(conn, id, policy))
            .await
    }

    pub async fn set_menus(
        &self,
        restaurant_id: i32,
        menu_ids: Vec<i32>,
    ) -> Result<Vec<Menu>, StoreError> {
        self.run(move |conn| restaurants::set_menus(conn, restaurant_id, &menu_ids))
            .await
    }

    pub async fn create_menu(&self, new: NewMenu) -> Result<Menu, StoreError> {
        self.run(move |conn| menus::create(conn, &new)).await
    }

    pub async fn find_menu(&self, id: i32) -> Result<Menu, StoreError> {
        self.run(move |conn| menus::find_by_id(conn, id)).await
    }

    pub async fn find_menu_in_restaurant(
        &self,
        restaurant_id: i32,
        id: i32,
    ) -> Result<Menu, StoreError> {
        self.run(move |conn| menus::find_in_restaurant(conn, restaurant_id, id))
            .await
    }

    pub async fn find_menus(&self) -> Result<Vec<Menu>, StoreError> {
        self.run(menus::find_all).await
    }

    pub async fn find_menus_with_items(&self) -> Result<Vec<MenuWithItems>, StoreError> {
        self.run(menus::find_all_with_items).await
    }

    pub async fn update_menu(&self, id: i32, changes: MenuChanges) -> Result<Menu, StoreError> {
        self.run(move |conn| menus::update(conn, id, &changes)).await
    }

    pub async fn destroy_menu(&self, id: i32) -> Result<(), StoreError> {
        let policy = self.delete_policy;
        self.run(move |conn| menus::destroy(conn, id, policy)).await
    }

    pub async fn set_items(&self, menu_id: i32, item_ids: Vec<i32>) -> Result<Vec<Item>, StoreError> {
        self.run(move |conn| menus::set_items(conn, menu_id, &item_ids))
            .await
    }

    pub async fn create_item(&self, new: NewItem) -> Result<Item, StoreError> {
        self.run(move |conn| items::create(conn, &new)).await
    }

    pub async fn find_item(&self, id: i32) -> Result<Item, StoreError> {
        self.run(move |conn| items::find_by_id(conn, id)).await
    }

    pub async fn find_item_in_menu(&self, menu_id: i32, id: i32) -> Result<Item, StoreError> {
        self.run(move |conn| items::find_in_menu(conn, menu_id, id))
            .await
    }

    pub async fn find_items(&self) -> Result<Vec<Item>, StoreError> {
        self.run(items::find_all).await
    }

    pub async fn update_item(&self, id: i32, changes: ItemChanges) -> Result<Item, StoreError> {
        self.run(move |conn| items::update(conn, id, &changes)).await
    }

    pub async fn destroy_item(&self, id: i32) -> Result<(), StoreError> {
        self.run(move |conn| items::destroy(conn, id)).await
    }
}

//! Place repository
//!
//! Database operations for attractions and restaurants.

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Place, PlaceCategory};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// Place repository trait
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    /// Create a new place
    async fn create(&self, place: &Place) -> Result<Place>;

    /// Get place by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Place>>;

    /// List all places in store order
    async fn list(&self) -> Result<Vec<Place>>;

    /// List places of one category in store order
    async fn list_by_category(&self, category: PlaceCategory) -> Result<Vec<Place>>;

    /// Update a place
    async fn update(&self, place: &Place) -> Result<Place>;

    /// Delete a place. Returns false if no such place existed.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLx-based place repository implementation
pub struct SqlxPlaceRepository {
    pool: DynDatabasePool,
}

impl SqlxPlaceRepository {
    /// Create a new SQLx place repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PlaceRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PlaceRepository for SqlxPlaceRepository {
    async fn create(&self, place: &Place) -> Result<Place> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => create_place_sqlite(pool, place).await,
            Backend::Mysql(pool) => create_place_mysql(pool, place).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Place>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => get_place_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_place_by_id_mysql(pool, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Place>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => list_places_sqlite(pool, None).await,
            Backend::Mysql(pool) => list_places_mysql(pool, None).await,
        }
    }

    async fn list_by_category(&self, category: PlaceCategory) -> Result<Vec<Place>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => list_places_sqlite(pool, Some(category)).await,
            Backend::Mysql(pool) => list_places_mysql(pool, Some(category)).await,
        }
    }

    async fn update(&self, place: &Place) -> Result<Place> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => update_place_sqlite(pool, place).await,
            Backend::Mysql(pool) => update_place_mysql(pool, place).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let sql = "DELETE FROM places WHERE id = ?";
        let affected = match self.pool.backend()? {
            Backend::Sqlite(pool) => sqlx::query(sql)
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete place")?
                .rows_affected(),
            Backend::Mysql(pool) => sqlx::query(sql)
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete place")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

const SELECT_PLACE: &str = r#"
    SELECT id, name, description, image, category, location_lat, location_lng,
           location_address, is_active, created_at, updated_at
    FROM places
"#;

const INSERT_PLACE: &str = r#"
    INSERT INTO places (id, name, description, image, category, location_lat, location_lng,
                        location_address, is_active, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_PLACE: &str = r#"
    UPDATE places
    SET name = ?, description = ?, image = ?, category = ?, location_lat = ?, location_lng = ?,
        location_address = ?, is_active = ?, updated_at = ?
    WHERE id = ?
"#;

fn list_sql(category: Option<PlaceCategory>) -> String {
    // Store order: insertion time, id as tiebreaker
    match category {
        Some(_) => format!("{} WHERE category = ? ORDER BY created_at ASC, id ASC", SELECT_PLACE),
        None => format!("{} ORDER BY created_at ASC, id ASC", SELECT_PLACE),
    }
}

fn parse_category(raw: &str) -> Result<PlaceCategory> {
    PlaceCategory::from_str(raw).with_context(|| format!("Invalid category in database: {}", raw))
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_place_sqlite(pool: &SqlitePool, place: &Place) -> Result<Place> {
    sqlx::query(INSERT_PLACE)
        .bind(&place.id)
        .bind(&place.name)
        .bind(&place.description)
        .bind(&place.image)
        .bind(place.category.to_string())
        .bind(place.location_lat)
        .bind(place.location_lng)
        .bind(&place.location_address)
        .bind(place.is_active)
        .bind(place.created_at)
        .bind(place.updated_at)
        .execute(pool)
        .await
        .context("Failed to create place")?;

    Ok(place.clone())
}

async fn get_place_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Place>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_PLACE))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get place by ID")?;

    row.as_ref().map(row_to_place_sqlite).transpose()
}

async fn list_places_sqlite(pool: &SqlitePool, category: Option<PlaceCategory>) -> Result<Vec<Place>> {
    let sql = list_sql(category);
    let mut query = sqlx::query(&sql);
    if let Some(category) = category {
        query = query.bind(category.to_string());
    }

    let rows = query.fetch_all(pool).await.context("Failed to list places")?;

    rows.iter().map(row_to_place_sqlite).collect()
}

async fn update_place_sqlite(pool: &SqlitePool, place: &Place) -> Result<Place> {
    sqlx::query(UPDATE_PLACE)
        .bind(&place.name)
        .bind(&place.description)
        .bind(&place.image)
        .bind(place.category.to_string())
        .bind(place.location_lat)
        .bind(place.location_lng)
        .bind(&place.location_address)
        .bind(place.is_active)
        .bind(Utc::now())
        .bind(&place.id)
        .execute(pool)
        .await
        .context("Failed to update place")?;

    get_place_by_id_sqlite(pool, &place.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Place not found after update"))
}

fn row_to_place_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Place> {
    let category: String = row.get("category");

    Ok(Place {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        image: row.get("image"),
        category: parse_category(&category)?,
        location_lat: row.get("location_lat"),
        location_lng: row.get("location_lng"),
        location_address: row.get("location_address"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_place_mysql(pool: &MySqlPool, place: &Place) -> Result<Place> {
    sqlx::query(INSERT_PLACE)
        .bind(&place.id)
        .bind(&place.name)
        .bind(&place.description)
        .bind(&place.image)
        .bind(place.category.to_string())
        .bind(place.location_lat)
        .bind(place.location_lng)
        .bind(&place.location_address)
        .bind(place.is_active)
        .bind(place.created_at)
        .bind(place.updated_at)
        .execute(pool)
        .await
        .context("Failed to create place")?;

    Ok(place.clone())
}

async fn get_place_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Place>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_PLACE))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get place by ID")?;

    row.as_ref().map(row_to_place_mysql).transpose()
}

async fn list_places_mysql(pool: &MySqlPool, category: Option<PlaceCategory>) -> Result<Vec<Place>> {
    let sql = list_sql(category);
    let mut query = sqlx::query(&sql);
    if let Some(category) = category {
        query = query.bind(category.to_string());
    }

    let rows = query.fetch_all(pool).await.context("Failed to list places")?;

    rows.iter().map(row_to_place_mysql).collect()
}

async fn update_place_mysql(pool: &MySqlPool, place: &Place) -> Result<Place> {
    sqlx::query(UPDATE_PLACE)
        .bind(&place.name)
        .bind(&place.description)
        .bind(&place.image)
        .bind(place.category.to_string())
        .bind(place.location_lat)
        .bind(place.location_lng)
        .bind(&place.location_address)
        .bind(place.is_active)
        .bind(Utc::now())
        .bind(&place.id)
        .execute(pool)
        .await
        .context("Failed to update place")?;

    get_place_by_id_mysql(pool, &place.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Place not found after update"))
}

fn row_to_place_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Place> {
    let category: String = row.get("category");

    Ok(Place {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        image: row.get("image"),
        category: parse_category(&category)?,
        location_lat: row.get("location_lat"),
        location_lng: row.get("location_lng"),
        location_address: row.get("location_address"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;
    use uuid::Uuid;

    async fn setup_test_repo() -> SqlxPlaceRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxPlaceRepository::new(pool)
    }

    fn test_place(name: &str, category: PlaceCategory, offset_secs: i64) -> Place {
        let at = Utc::now() + Duration::seconds(offset_secs);
        Place {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: format!("{} description", name),
            image: None,
            category,
            location_lat: 41.88,
            location_lng: -87.63,
            location_address: "Chicago, IL".to_string(),
            is_active: true,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_place() {
        let repo = setup_test_repo().await;
        let place = test_place("Navy Pier", PlaceCategory::Attraction, 0);

        repo.create(&place).await.expect("Failed to create place");
        let found = repo
            .get_by_id(&place.id)
            .await
            .expect("Failed to get place")
            .expect("Place not found");

        assert_eq!(found.name, "Navy Pier");
        assert_eq!(found.category, PlaceCategory::Attraction);
        assert_eq!(found.location_lat, 41.88);
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let repo = setup_test_repo().await;
        let names = ["First", "Second", "Third"];
        for (i, name) in names.iter().enumerate() {
            repo.create(&test_place(name, PlaceCategory::Restaurant, i as i64))
                .await
                .expect("Failed to create place");
        }

        let listed: Vec<String> = repo
            .list()
            .await
            .expect("Failed to list")
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(listed, names);
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let repo = setup_test_repo().await;
        repo.create(&test_place("Zoo", PlaceCategory::Attraction, 0)).await.unwrap();
        repo.create(&test_place("Deli", PlaceCategory::Restaurant, 1)).await.unwrap();
        repo.create(&test_place("Museum", PlaceCategory::Attraction, 2)).await.unwrap();

        let attractions = repo
            .list_by_category(PlaceCategory::Attraction)
            .await
            .expect("Failed to list");
        let restaurants = repo
            .list_by_category(PlaceCategory::Restaurant)
            .await
            .expect("Failed to list");

        assert_eq!(attractions.len(), 2);
        assert_eq!(restaurants.len(), 1);
        assert_eq!(restaurants[0].name, "Deli");
    }

    #[tokio::test]
    async fn test_update_place() {
        let repo = setup_test_repo().await;
        let mut place = repo
            .create(&test_place("Zoo", PlaceCategory::Attraction, 0))
            .await
            .unwrap();

        place.name = "Lincoln Park Zoo".to_string();
        place.is_active = false;
        place.image = Some("zoo.png".to_string());
        let updated = repo.update(&place).await.expect("Failed to update place");

        assert_eq!(updated.name, "Lincoln Park Zoo");
        assert!(!updated.is_active);
        assert_eq!(updated.image.as_deref(), Some("zoo.png"));
    }

    #[tokio::test]
    async fn test_delete_place() {
        let repo = setup_test_repo().await;
        let place = repo
            .create(&test_place("Zoo", PlaceCategory::Attraction, 0))
            .await
            .unwrap();

        assert!(repo.delete(&place.id).await.expect("Failed to delete"));
        assert!(!repo.delete(&place.id).await.expect("Failed to delete"));
        assert!(repo.get_by_id(&place.id).await.unwrap().is_none());
    }
}

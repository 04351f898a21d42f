//! Place service
//!
//! CRUD for attractions and restaurants, the public category listings, and
//! the rankings endpoint.

use crate::db::repositories::{ChecklistRepository, PlaceRepository};
use crate::models::{
    CreatePlaceInput, Place, PlaceCategory, PlaceListing, Rankings, UpdatePlaceInput,
};
use crate::services::ranking::compute_rankings;
use anyhow::Context;
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Error types for place service operations
#[derive(Debug, thiserror::Error)]
pub enum PlaceServiceError {
    /// Place not found
    #[error("Place not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct PlaceService {
    repo: Arc<dyn PlaceRepository>,
    checklist_repo: Arc<dyn ChecklistRepository>,
}

impl PlaceService {
    pub fn new(repo: Arc<dyn PlaceRepository>, checklist_repo: Arc<dyn ChecklistRepository>) -> Self {
        Self {
            repo,
            checklist_repo,
        }
    }

    /// Create a place.
    ///
    /// `forced_category` overrides whatever category the input carries; the
    /// admin routes use it to pin attractions and restaurants.
    pub async fn create(
        &self,
        input: CreatePlaceInput,
        forced_category: Option<PlaceCategory>,
    ) -> Result<Place, PlaceServiceError> {
        let name = required(input.name.clone(), "name")?;
        let description = required(input.description.clone(), "description")?;
        let location = input.resolved_location().ok_or_else(|| {
            PlaceServiceError::ValidationError("location (lat, lng, address) is required".to_string())
        })?;

        let category = match forced_category {
            Some(category) => category,
            None => parse_category(input.category.as_deref())?.unwrap_or_default(),
        };

        let now = Utc::now();
        let place = Place {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            image: input.image,
            category,
            location_lat: location.lat,
            location_lng: location.lng,
            location_address: location.address,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create(&place).await.context("Failed to create place")?;
        tracing::info!("Created {} {} ({})", created.category, created.name, created.id);
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<Place, PlaceServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get place")?
            .ok_or_else(|| PlaceServiceError::NotFound(id.to_string()))
    }

    /// All places, flat shape
    pub async fn list(&self) -> Result<Vec<Place>, PlaceServiceError> {
        Ok(self.repo.list().await.context("Failed to list places")?)
    }

    /// Places of one category in the public listing shape
    pub async fn list_by_category(
        &self,
        category: PlaceCategory,
    ) -> Result<Vec<PlaceListing>, PlaceServiceError> {
        let places = self
            .repo
            .list_by_category(category)
            .await
            .context("Failed to list places by category")?;
        Ok(places.into_iter().map(PlaceListing::from).collect())
    }

    /// Partial update. With `expected_category` set, a place of another
    /// category is reported as not found.
    pub async fn update(
        &self,
        id: &str,
        input: UpdatePlaceInput,
        expected_category: Option<PlaceCategory>,
    ) -> Result<Place, PlaceServiceError> {
        let mut place = self.get_in_category(id, expected_category).await?;

        if let Some(category) = parse_category(input.category.as_deref())? {
            if expected_category.is_none() {
                place.category = category;
            }
        }
        if matches!(&input.name, Some(n) if n.trim().is_empty()) {
            return Err(PlaceServiceError::ValidationError("name cannot be empty".to_string()));
        }
        input.apply_to(&mut place);

        Ok(self.repo.update(&place).await.context("Failed to update place")?)
    }

    pub async fn delete(
        &self,
        id: &str,
        expected_category: Option<PlaceCategory>,
    ) -> Result<(), PlaceServiceError> {
        self.get_in_category(id, expected_category).await?;

        if !self.repo.delete(id).await.context("Failed to delete place")? {
            return Err(PlaceServiceError::NotFound(id.to_string()));
        }
        tracing::info!("Deleted place {}", id);
        Ok(())
    }

    /// Top places per category by number of checklists referencing them
    pub async fn rankings(&self) -> Result<Rankings, PlaceServiceError> {
        let places = self.repo.list().await.context("Failed to list places")?;
        let checklists = self
            .checklist_repo
            .list()
            .await
            .context("Failed to list checklists")?;

        Ok(compute_rankings(&places, &checklists))
    }

    async fn get_in_category(
        &self,
        id: &str,
        expected_category: Option<PlaceCategory>,
    ) -> Result<Place, PlaceServiceError> {
        let place = self.get(id).await?;
        match expected_category {
            Some(category) if place.category != category => {
                Err(PlaceServiceError::NotFound(id.to_string()))
            }
            _ => Ok(place),
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, PlaceServiceError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| PlaceServiceError::ValidationError(format!("{} is required", field)))
}

fn parse_category(raw: Option<&str>) -> Result<Option<PlaceCategory>, PlaceServiceError> {
    raw.map(|s| {
        PlaceCategory::from_str(s).map_err(|e| PlaceServiceError::ValidationError(e.to_string()))
    })
    .transpose()
}

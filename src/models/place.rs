//! Place model
//!
//! This module provides:
//! - `Place` entity for attractions and restaurants
//! - `PlaceListing`, the public shape served by `/api/attractions` and `/api/restaurants`
//! - Input types accepting either a nested `location` object or flat `location_*` fields
//! - Ranking output types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Place entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    /// Unique identifier (UUID string)
    pub id: String,
    pub name: String,
    pub description: String,
    /// Image URL
    pub image: Option<String>,
    pub category: PlaceCategory,
    pub location_lat: f64,
    pub location_lng: f64,
    pub location_address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Place category. Stored and serialized as `Attraction` / `Restaurant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaceCategory {
    #[default]
    Attraction,
    Restaurant,
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceCategory::Attraction => write!(f, "Attraction"),
            PlaceCategory::Restaurant => write!(f, "Restaurant"),
        }
    }
}

impl FromStr for PlaceCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attraction" => Ok(PlaceCategory::Attraction),
            "restaurant" => Ok(PlaceCategory::Restaurant),
            _ => Err(anyhow::anyhow!("Invalid place category: {}", s)),
        }
    }
}

/// Nested coordinates + address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

/// Public listing shape of a place
#[derive(Debug, Clone, Serialize)]
pub struct PlaceListing {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub category: PlaceCategory,
    pub location: Location,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Place> for PlaceListing {
    fn from(place: Place) -> Self {
        Self {
            id: place.id,
            name: place.name,
            description: place.description,
            image: place.image,
            category: place.category,
            location: Location {
                lat: place.location_lat,
                lng: place.location_lng,
                address: place.location_address,
            },
            is_active: place.is_active,
            created_at: place.created_at,
            updated_at: place.updated_at,
        }
    }
}

/// Input for creating a place.
///
/// When `location` is present it wins over the flat `location_*` fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePlaceInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub location: Option<Location>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub location_address: Option<String>,
    #[serde(alias = "isActive")]
    pub is_active: Option<bool>,
}

impl CreatePlaceInput {
    /// Resolve the location from either the nested object or the flat fields.
    pub fn resolved_location(&self) -> Option<Location> {
        if let Some(location) = &self.location {
            return Some(location.clone());
        }
        Some(Location {
            lat: self.location_lat?,
            lng: self.location_lng?,
            address: self.location_address.clone()?,
        })
    }
}

/// Partial update of a place; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlaceInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub location: Option<Location>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub location_address: Option<String>,
    #[serde(alias = "isActive")]
    pub is_active: Option<bool>,
}

impl UpdatePlaceInput {
    /// Apply the update on top of an existing place.
    pub fn apply_to(self, place: &mut Place) {
        if let Some(name) = self.name {
            place.name = name;
        }
        if let Some(description) = self.description {
            place.description = description;
        }
        if self.image.is_some() {
            place.image = self.image;
        }
        if let Some(location) = self.location {
            place.location_lat = location.lat;
            place.location_lng = location.lng;
            place.location_address = location.address;
        } else {
            if let Some(lat) = self.location_lat {
                place.location_lat = lat;
            }
            if let Some(lng) = self.location_lng {
                place.location_lng = lng;
            }
            if let Some(address) = self.location_address {
                place.location_address = address;
            }
        }
        if let Some(is_active) = self.is_active {
            place.is_active = is_active;
        }
    }
}

/// One entry of a ranking list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRanking {
    pub name: String,
    #[serde(rename = "userCount")]
    pub user_count: usize,
}

/// Top places per category, by number of checklists referencing them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rankings {
    pub attractions: Vec<PlaceRanking>,
    pub restaurants: Vec<PlaceRanking>,
}

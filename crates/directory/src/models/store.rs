//! Store domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use delicious_core::{
    Location, LocationError, Point, Slug, StoreId, StoreName, StoreNameError, TagCount, UserId,
};

/// Validation failures for store input.
///
/// These are raised before any slug or aggregation work happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreValidationError {
    #[error(transparent)]
    Name(#[from] StoreNameError),
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error("You must supply coordinates")]
    MissingCoordinates,
    #[error("You must supply an author")]
    MissingAuthor,
}

/// A persisted store listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: StoreName,
    pub slug: Slug,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub location: Location,
    pub photo: Option<String>,
    pub author: UserId,
    /// Set once on insert.
    pub created: DateTime<Utc>,
}

/// Raw store input as submitted by the add/edit form.
///
/// Every field is optional here; [`StoreForm::into_new_store`] and
/// [`StoreForm::into_changes`] enforce what each write needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreForm {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub lng: Option<f64>,
    pub lat: Option<f64>,
    pub address: Option<String>,
    /// Filename handed over by the upload service.
    pub photo: Option<String>,
    /// Supplied by the session layer, never by the form itself.
    pub author: Option<UserId>,
}

impl StoreForm {
    /// Validate the form for creating a store.
    ///
    /// # Errors
    ///
    /// Returns `StoreValidationError` if the name, address, coordinates or
    /// author are missing or invalid.
    pub fn into_new_store(self) -> Result<NewStore, StoreValidationError> {
        let author = self.author.ok_or(StoreValidationError::MissingAuthor)?;
        let changes = self.into_changes()?;

        Ok(NewStore {
            name: changes.name,
            description: changes.description,
            tags: changes.tags,
            location: changes.location,
            photo: changes.photo,
            author,
        })
    }

    /// Validate the form for editing an existing store.
    ///
    /// # Errors
    ///
    /// Returns `StoreValidationError` if the name, address or coordinates are
    /// missing or invalid.
    pub fn into_changes(self) -> Result<StoreChanges, StoreValidationError> {
        let name = StoreName::parse(self.name.as_deref().unwrap_or_default())?;

        let (Some(lng), Some(lat)) = (self.lng, self.lat) else {
            return Err(StoreValidationError::MissingCoordinates);
        };
        let location = Location::new(
            Point::new(lng, lat)?,
            self.address.as_deref().unwrap_or_default(),
        )?;

        Ok(StoreChanges {
            name,
            description: normalize_description(self.description.as_deref()),
            tags: normalize_tags(self.tags),
            location,
            photo: self.photo.filter(|p| !p.trim().is_empty()),
        })
    }
}

/// A validated store ready for its first write.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStore {
    pub name: StoreName,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub location: Location,
    pub photo: Option<String>,
    pub author: UserId,
}

/// A validated edit of an existing store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChanges {
    pub name: StoreName,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub location: Location,
    /// `None` keeps the current photo.
    pub photo: Option<String>,
}

/// The full set of fields written to the collection.
///
/// `slug` is always filled in by the slug assigner or carried over from the
/// stored record; callers never supply it directly.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRecord {
    pub name: StoreName,
    pub slug: Slug,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub location: Location,
    pub photo: Option<String>,
    pub author: UserId,
}

impl StoreRecord {
    /// Record for a brand new store.
    #[must_use]
    pub fn from_new(store: NewStore, slug: Slug) -> Self {
        Self {
            name: store.name,
            slug,
            description: store.description,
            tags: store.tags,
            location: store.location,
            photo: store.photo,
            author: store.author,
        }
    }

    /// Record for an edited store. Author is kept; photo is kept unless replaced.
    #[must_use]
    pub fn from_changes(current: &Store, changes: StoreChanges, slug: Slug) -> Self {
        Self {
            name: changes.name,
            slug,
            description: changes.description,
            tags: changes.tags,
            location: changes.location,
            photo: changes.photo.or_else(|| current.photo.clone()),
            author: current.author,
        }
    }
}

/// One page of the store listing, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct StorePage {
    pub stores: Vec<Store>,
    /// 1-based page number.
    pub page: u32,
    /// Total number of pages.
    pub pages: u64,
    /// Total number of stores.
    pub count: u64,
}

impl StorePage {
    /// True when a page past the first was requested but holds no stores.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        self.stores.is_empty() && self.page > 1
    }
}

/// The tag browsing view: the whole vocabulary plus the stores for one tag.
#[derive(Debug, Clone, Serialize)]
pub struct TagView {
    pub tag: Option<String>,
    pub tags: Vec<TagCount>,
    pub stores: Vec<Store>,
}

fn normalize_description(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|d| !d.is_empty())
        .map(ToOwned::to_owned)
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect()
}

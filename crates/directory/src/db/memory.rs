//! In-process store collection.
//!
//! Backs the service tests and integration tests. Behaves like the Postgres
//! repository for everything the directory core relies on: case-insensitive
//! slug matching, newest-first listing, exact tag filters, and optionally a
//! unique slug constraint.

use chrono::Utc;
use regex::RegexBuilder;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use delicious_core::{Slug, StoreId};

use super::{RepositoryError, StoreCollection};
use crate::models::{Store, StoreRecord};
use crate::services::slug::slug_pattern;

#[derive(Debug, Default)]
struct MemoryState {
    stores: Vec<Store>,
    next_id: i32,
}

/// A [`StoreCollection`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryStoreCollection {
    state: RwLock<MemoryState>,
    unique_slugs: bool,
}

impl MemoryStoreCollection {
    /// Create an empty collection that accepts duplicate slugs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection that rejects duplicate slugs, like a unique
    /// index would.
    #[must_use]
    pub fn with_unique_slugs() -> Self {
        Self {
            unique_slugs: true,
            ..Self::default()
        }
    }

    /// Snapshot of every stored record, in insertion order.
    pub async fn all(&self) -> Vec<Store> {
        self.state.read().await.stores.clone()
    }

    fn check_unique(
        &self,
        stores: &[Store],
        slug: &Slug,
        except: Option<StoreId>,
    ) -> Result<(), RepositoryError> {
        if !self.unique_slugs {
            return Ok(());
        }
        let taken = stores
            .iter()
            .any(|s| Some(s.id) != except && s.slug == *slug);
        if taken {
            return Err(RepositoryError::Conflict(format!(
                "slug `{slug}` already exists"
            )));
        }
        Ok(())
    }
}

impl StoreCollection for MemoryStoreCollection {
    #[instrument(skip(self, record), fields(slug = %record.slug))]
    async fn insert(&self, record: StoreRecord) -> Result<Store, RepositoryError> {
        let mut state = self.state.write().await;
        self.check_unique(&state.stores, &record.slug, None)?;

        state.next_id = state
            .next_id
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Unavailable("store id space exhausted".to_owned()))?;

        let store = Store {
            id: StoreId::new(state.next_id),
            name: record.name,
            slug: record.slug,
            description: record.description,
            tags: record.tags,
            location: record.location,
            photo: record.photo,
            author: record.author,
            created: Utc::now(),
        };
        state.stores.push(store.clone());

        debug!(id = %store.id, "Inserted store");
        Ok(store)
    }

    #[instrument(skip(self, record), fields(slug = %record.slug))]
    async fn update(&self, id: StoreId, record: StoreRecord) -> Result<Option<Store>, RepositoryError> {
        let mut state = self.state.write().await;
        self.check_unique(&state.stores, &record.slug, Some(id))?;

        let Some(store) = state.stores.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        store.name = record.name;
        store.slug = record.slug;
        store.description = record.description;
        store.tags = record.tags;
        store.location = record.location;
        store.photo = record.photo;

        Ok(Some(store.clone()))
    }

    async fn find_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.stores.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Store>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.stores.iter().find(|s| s.slug.as_str() == slug).cloned())
    }

    async fn find_slugs_matching(&self, base: &Slug) -> Result<Vec<Slug>, RepositoryError> {
        let pattern = RegexBuilder::new(&slug_pattern(base))
            .case_insensitive(true)
            .build()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid slug pattern: {e}")))?;

        let state = self.state.read().await;
        Ok(state
            .stores
            .iter()
            .filter(|s| pattern.is_match(s.slug.as_str()))
            .map(|s| s.slug.clone())
            .collect())
    }

    async fn scan_tags(&self) -> Result<Vec<Vec<String>>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.stores.iter().map(|s| s.tags.clone()).collect())
    }

    async fn list(&self, skip: u64, limit: u32) -> Result<Vec<Store>, RepositoryError> {
        let mut stores = self.state.read().await.stores.clone();
        stores.sort_by(|a, b| {
            b.created
                .cmp(&a.created)
                .then_with(|| b.id.as_i32().cmp(&a.id.as_i32()))
        });

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(stores.into_iter().skip(skip).take(limit).collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.stores.len() as u64)
    }

    async fn find_by_tag(&self, tag: Option<&str>) -> Result<Vec<Store>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .stores
            .iter()
            .filter(|s| tag.is_none_or(|t| s.tags.iter().any(|x| x == t)))
            .cloned()
            .collect())
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Store>, RepositoryError> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.state.read().await;
        let mut scored: Vec<(usize, &Store)> = state
            .stores
            .iter()
            .filter_map(|store| {
                let score = text_score(store, &terms);
                (score > 0).then_some((score, store))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, store)| store.clone())
            .collect())
    }
}

/// Name hits weigh double description hits.
fn text_score(store: &Store, terms: &[String]) -> usize {
    let name = store.name.as_str().to_lowercase();
    let description = store
        .description
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();

    terms
        .iter()
        .map(|term| {
            let in_name = if name.contains(term.as_str()) { 2 } else { 0 };
            let in_description = usize::from(description.contains(term.as_str()));
            in_name + in_description
        })
        .sum()
}

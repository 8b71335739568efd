//! Integration tests for the Delicious store directory.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no database needed)
//! cargo test -p delicious-integration-tests
//!
//! # Include the PostgreSQL tests
//! DIRECTORY_TEST_DATABASE_URL=postgres://localhost/delicious_test \
//!     cargo test -p delicious-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `slug_assignment` - Slug derivation, renames and concurrent creation
//! - `tag_aggregation` - Tag vocabulary counts and failure propagation
//! - `store_listing` - Pagination, tag views and search
//! - `postgres_store` - The same behaviour against a real database (ignored by default)
//!
//! This crate holds the shared fixtures: store builders, a probing collection
//! wrapper that counts and gates slug queries, and a collection whose storage
//! is always down.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::atomic::{AtomicUsize, Ordering};

use secrecy::SecretString;
use sqlx::PgPool;
use tokio::sync::Barrier;

use delicious_core::{Location, Point, Slug, StoreId, StoreName, TagCount, UserId};
use delicious_directory::models::{NewStore, Store, StoreChanges, StoreRecord};
use delicious_directory::{
    DirectoryConfig, MemoryStoreCollection, PgStoreRepository, RepositoryError, SlugMode,
    StoreCollection, StoreService, db,
};

/// Environment variable naming the database the ignored tests run against.
pub const TEST_DATABASE_URL_VAR: &str = "DIRECTORY_TEST_DATABASE_URL";

/// Author id used by fixtures unless a test needs a second user.
pub const AUTHOR: UserId = UserId::new(1);

/// A valid new store with the given name and tags.
///
/// # Panics
///
/// Panics if `name` is blank.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn new_store(name: &str, tags: &[&str]) -> NewStore {
    NewStore {
        name: StoreName::parse(name).unwrap(),
        description: None,
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
        location: location(),
        photo: None,
        author: AUTHOR,
    }
}

/// Changes that keep everything about `store` except its name.
///
/// # Panics
///
/// Panics if `name` is blank.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn rename(store: &Store, name: &str) -> StoreChanges {
    StoreChanges {
        name: StoreName::parse(name).unwrap(),
        description: store.description.clone(),
        tags: store.tags.clone(),
        location: store.location.clone(),
        photo: None,
    }
}

/// A fixed location in Toronto.
///
/// # Panics
///
/// Never; the coordinates are in range.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn location() -> Location {
    Location::new(Point::new(-79.3832, 43.6532).unwrap(), "100 Queen St W").unwrap()
}

/// Configuration for the given slug mode with default paging.
#[must_use]
pub fn config(slug_mode: SlugMode) -> DirectoryConfig {
    DirectoryConfig {
        slug_mode,
        ..DirectoryConfig::default()
    }
}

/// A lenient-mode service over an empty in-memory collection.
#[must_use]
pub fn memory_service() -> StoreService<MemoryStoreCollection> {
    StoreService::new(MemoryStoreCollection::new(), config(SlugMode::Lenient))
}

/// Shorthand for comparing aggregation output.
#[must_use]
pub fn counts(values: &[(&str, u64)]) -> Vec<TagCount> {
    values
        .iter()
        .map(|(tag, count)| TagCount::new(*tag, *count))
        .collect()
}

struct Gate {
    barrier: Barrier,
    parties: usize,
}

/// Wraps a collection, counting slug queries and optionally holding the first
/// few of them at a barrier once their read has completed.
///
/// Holding two creations after their reads and before their writes replays
/// the read-then-write race deterministically.
pub struct ProbeCollection<C> {
    inner: C,
    slug_queries: AtomicUsize,
    gate: Option<Gate>,
}

impl<C: StoreCollection> ProbeCollection<C> {
    /// Count slug queries without delaying any of them.
    pub const fn new(inner: C) -> Self {
        Self {
            inner,
            slug_queries: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Hold the first `parties` slug queries until all of them have read.
    pub fn gated(inner: C, parties: usize) -> Self {
        Self {
            inner,
            slug_queries: AtomicUsize::new(0),
            gate: Some(Gate {
                barrier: Barrier::new(parties),
                parties,
            }),
        }
    }

    /// Number of slug queries issued so far.
    pub fn slug_queries(&self) -> usize {
        self.slug_queries.load(Ordering::SeqCst)
    }

    /// The wrapped collection.
    pub const fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: StoreCollection> StoreCollection for ProbeCollection<C> {
    async fn insert(&self, record: StoreRecord) -> Result<Store, RepositoryError> {
        self.inner.insert(record).await
    }

    async fn update(&self, id: StoreId, record: StoreRecord) -> Result<Option<Store>, RepositoryError> {
        self.inner.update(id, record).await
    }

    async fn find_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Store>, RepositoryError> {
        self.inner.find_by_slug(slug).await
    }

    async fn find_slugs_matching(&self, base: &Slug) -> Result<Vec<Slug>, RepositoryError> {
        let seen = self.slug_queries.fetch_add(1, Ordering::SeqCst);
        let slugs = self.inner.find_slugs_matching(base).await?;
        if let Some(gate) = &self.gate
            && seen < gate.parties
        {
            gate.barrier.wait().await;
        }
        Ok(slugs)
    }

    async fn scan_tags(&self) -> Result<Vec<Vec<String>>, RepositoryError> {
        self.inner.scan_tags().await
    }

    async fn tag_counts(&self) -> Result<Vec<TagCount>, RepositoryError> {
        self.inner.tag_counts().await
    }

    async fn list(&self, skip: u64, limit: u32) -> Result<Vec<Store>, RepositoryError> {
        self.inner.list(skip, limit).await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.inner.count().await
    }

    async fn find_by_tag(&self, tag: Option<&str>) -> Result<Vec<Store>, RepositoryError> {
        self.inner.find_by_tag(tag).await
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Store>, RepositoryError> {
        self.inner.search(query, limit).await
    }
}

/// A collection whose backing storage is unreachable.
///
/// Every call fails with `RepositoryError::Unavailable`.
#[derive(Debug, Default)]
pub struct UnavailableCollection;

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("connection refused".to_owned())
}

impl StoreCollection for UnavailableCollection {
    async fn insert(&self, _record: StoreRecord) -> Result<Store, RepositoryError> {
        Err(unavailable())
    }

    async fn update(&self, _id: StoreId, _record: StoreRecord) -> Result<Option<Store>, RepositoryError> {
        Err(unavailable())
    }

    async fn find_by_id(&self, _id: StoreId) -> Result<Option<Store>, RepositoryError> {
        Err(unavailable())
    }

    async fn find_by_slug(&self, _slug: &str) -> Result<Option<Store>, RepositoryError> {
        Err(unavailable())
    }

    async fn find_slugs_matching(&self, _base: &Slug) -> Result<Vec<Slug>, RepositoryError> {
        Err(unavailable())
    }

    async fn scan_tags(&self) -> Result<Vec<Vec<String>>, RepositoryError> {
        Err(unavailable())
    }

    async fn list(&self, _skip: u64, _limit: u32) -> Result<Vec<Store>, RepositoryError> {
        Err(unavailable())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Err(unavailable())
    }

    async fn find_by_tag(&self, _tag: Option<&str>) -> Result<Vec<Store>, RepositoryError> {
        Err(unavailable())
    }

    async fn search(&self, _query: &str, _limit: u32) -> Result<Vec<Store>, RepositoryError> {
        Err(unavailable())
    }
}

/// Connect to the test database and apply migrations.
///
/// Returns `None` when `DIRECTORY_TEST_DATABASE_URL` is not set.
///
/// # Panics
///
/// Panics if the database is configured but unreachable or migrations fail.
#[allow(clippy::unwrap_used)]
pub async fn test_pool() -> Option<PgPool> {
    let url = std::env::var(TEST_DATABASE_URL_VAR).ok()?;
    let pool = db::create_pool(&SecretString::from(url)).await.unwrap();
    db::migrate(&pool).await.unwrap();
    Some(pool)
}

/// Postgres repository over the test database, if one is configured.
pub async fn test_repository() -> Option<PgStoreRepository> {
    test_pool().await.map(PgStoreRepository::new)
}

/// A name no other test run will produce, so tests can share one database.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix} {}", uuid::Uuid::new_v4().simple())
}

//! The storage capability the directory core runs against.
//!
//! Slug assignment and tag aggregation only need the operations below, so the
//! same service code runs over Postgres ([`super::PgStoreRepository`]) or the
//! in-process [`super::MemoryStoreCollection`].

use std::future::Future;

use delicious_core::{Slug, StoreId, TagCount};

use super::RepositoryError;
use crate::models::{Store, StoreRecord};
use crate::services::tags::aggregate_tags;

/// A shared, mutable collection of store records.
///
/// Every write is a single-document write. No method here takes a lock that
/// outlives the call, so a read followed by a write is never atomic.
pub trait StoreCollection: Send + Sync {
    /// Insert a new store, assigning its id and creation time.
    ///
    /// Returns `RepositoryError::Conflict` if the collection enforces unique
    /// slugs and the slug is taken.
    fn insert(
        &self,
        record: StoreRecord,
    ) -> impl Future<Output = Result<Store, RepositoryError>> + Send;

    /// Replace the mutable fields of an existing store.
    ///
    /// `created` and `author` are never touched. Returns `Ok(None)` when no
    /// store has this id.
    fn update(
        &self,
        id: StoreId,
        record: StoreRecord,
    ) -> impl Future<Output = Result<Option<Store>, RepositoryError>> + Send;

    /// Get a store by id.
    fn find_by_id(
        &self,
        id: StoreId,
    ) -> impl Future<Output = Result<Option<Store>, RepositoryError>> + Send;

    /// Get a store by exact slug.
    fn find_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Store>, RepositoryError>> + Send;

    /// All stored slugs equal to `base`, or `base` followed by `-` and digits,
    /// compared case-insensitively.
    ///
    /// The record currently being saved is not excluded.
    fn find_slugs_matching(
        &self,
        base: &Slug,
    ) -> impl Future<Output = Result<Vec<Slug>, RepositoryError>> + Send;

    /// Read every store's tag list.
    fn scan_tags(&self) -> impl Future<Output = Result<Vec<Vec<String>>, RepositoryError>> + Send;

    /// Tag vocabulary with usage counts, most used first.
    ///
    /// The default folds [`Self::scan_tags`] in process. Collections with a
    /// native aggregation should override it.
    fn tag_counts(&self) -> impl Future<Output = Result<Vec<TagCount>, RepositoryError>> + Send {
        async move {
            let tags = self.scan_tags().await?;
            Ok(aggregate_tags(tags))
        }
    }

    /// Stores ordered newest first, skipping `skip` and returning up to `limit`.
    fn list(
        &self,
        skip: u64,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Store>, RepositoryError>> + Send;

    /// Total number of stores.
    fn count(&self) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Stores carrying `tag`, or every store when `tag` is `None`.
    fn find_by_tag(
        &self,
        tag: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Store>, RepositoryError>> + Send;

    /// Text search over name and description, best match first.
    fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Store>, RepositoryError>> + Send;
}

//! Store operations: create, edit, browse, search.
//!
//! Each write derives the slug explicitly before persisting, using
//! [`super::slug`]. In [`SlugMode::Lenient`] that is one read followed by one
//! write, with no protection against a concurrent writer picking the same
//! slug. In [`SlugMode::Strict`] the collection must reject duplicate slugs
//! and a conflicting write is retried with a slug numbered past the highest
//! suffix in use.

use tracing::{debug, info, instrument, warn};

use delicious_core::{StoreId, TagCount, UserId};

use super::slug::{assign_slug, name_changed, next_slug, next_slug_after_conflict};
use super::tags::list_tags;
use crate::config::{DirectoryConfig, SlugMode};
use crate::db::{RepositoryError, StoreCollection};
use crate::error::{AppError, Result};
use crate::models::{NewStore, Store, StoreChanges, StorePage, StoreRecord, TagView};

/// Store operations over any [`StoreCollection`].
#[derive(Debug)]
pub struct StoreService<C> {
    collection: C,
    config: DirectoryConfig,
}

impl<C: StoreCollection> StoreService<C> {
    /// Create a new store service.
    #[must_use]
    pub const fn new(collection: C, config: DirectoryConfig) -> Self {
        Self { collection, config }
    }

    /// Get a reference to the underlying collection.
    #[must_use]
    pub const fn collection(&self) -> &C {
        &self.collection
    }

    /// Get a reference to the directory configuration.
    #[must_use]
    pub const fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Create a store, deriving its slug from the name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the slug query or the insert fails.
    #[instrument(skip(self, store), fields(name = %store.name, author = %store.author))]
    pub async fn create_store(&self, store: NewStore) -> Result<Store> {
        let mut attempt = 1;
        loop {
            let slug = if attempt == 1 {
                next_slug(&self.collection, &store.name).await?
            } else {
                next_slug_after_conflict(&self.collection, &store.name).await?
            };
            let record = StoreRecord::from_new(store.clone(), slug);

            match self.collection.insert(record).await {
                Ok(created) => {
                    info!(id = %created.id, slug = %created.slug, "Created store");
                    return Ok(created);
                }
                Err(RepositoryError::Conflict(reason)) if self.should_retry(attempt) => {
                    warn!(attempt, %reason, "Slug already taken, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Edit a store owned by `editor`.
    ///
    /// The slug is only re-derived when the name actually changes.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the store does not exist,
    /// `AppError::Forbidden` if `editor` is not its author, and
    /// `AppError::Database` if a read or the write fails.
    #[instrument(skip(self, changes), fields(id = %id, editor = %editor))]
    pub async fn update_store(
        &self,
        id: StoreId,
        editor: UserId,
        changes: StoreChanges,
    ) -> Result<Store> {
        let current = self
            .collection
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("store {id}")))?;
        confirm_owner(&current, editor)?;

        let modified = name_changed(&current.name, &changes.name);
        let mut attempt = 1;
        loop {
            let slug = if attempt == 1 {
                assign_slug(&self.collection, &changes.name, modified)
                    .await?
                    .unwrap_or_else(|| current.slug.clone())
            } else {
                next_slug_after_conflict(&self.collection, &changes.name).await?
            };
            let record = StoreRecord::from_changes(&current, changes.clone(), slug);

            match self.collection.update(id, record).await {
                Ok(Some(updated)) => {
                    info!(slug = %updated.slug, renamed = modified, "Updated store");
                    return Ok(updated);
                }
                Ok(None) => return Err(AppError::NotFound(format!("store {id}"))),
                Err(RepositoryError::Conflict(reason)) if modified && self.should_retry(attempt) => {
                    warn!(attempt, %reason, "Slug already taken, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Get a store by id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no store has this id.
    pub async fn get_store(&self, id: StoreId) -> Result<Store> {
        self.collection
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("store {id}")))
    }

    /// Get a store by its slug.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no store has this slug.
    pub async fn get_store_by_slug(&self, slug: &str) -> Result<Store> {
        self.collection
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("store `{slug}`")))
    }

    /// One page of stores, newest first. Page numbers start at 1; 0 is read as 1.
    ///
    /// A configured page size of 0 is read as 1.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if either the listing or the count fails.
    #[instrument(skip(self))]
    pub async fn list_stores(&self, page: u32) -> Result<StorePage> {
        let page = page.max(1);
        let limit = self.config.page_size.max(1);
        let skip = u64::from(page - 1) * u64::from(limit);

        let (stores, count) =
            tokio::try_join!(self.collection.list(skip, limit), self.collection.count())?;
        let pages = count.div_ceil(u64::from(limit));

        let result = StorePage {
            stores,
            page,
            pages,
            count,
        };
        if result.is_out_of_range() {
            debug!(page, pages, "Requested page does not exist");
        }
        Ok(result)
    }

    /// The full tag vocabulary together with the stores carrying `tag`.
    ///
    /// With no tag, every store is returned.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if either read fails.
    #[instrument(skip(self))]
    pub async fn stores_by_tag(&self, tag: Option<&str>) -> Result<TagView> {
        let (tags, stores) = tokio::try_join!(
            list_tags(&self.collection),
            self.collection.find_by_tag(tag)
        )?;

        Ok(TagView {
            tag: tag.map(ToOwned::to_owned),
            tags,
            stores,
        })
    }

    /// Every tag in use with its count, most used first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the scan fails.
    pub async fn list_tags(&self) -> Result<Vec<TagCount>> {
        Ok(list_tags(&self.collection).await?)
    }

    /// Text search over store names and descriptions.
    ///
    /// Blank queries return no results without reading the collection.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the search fails.
    #[instrument(skip(self))]
    pub async fn search_stores(&self, query: &str) -> Result<Vec<Store>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let stores = self
            .collection
            .search(query, self.config.search_limit.max(1))
            .await?;
        debug!(results = stores.len(), "Searched stores");
        Ok(stores)
    }

    fn should_retry(&self, attempt: u32) -> bool {
        self.config.slug_mode == SlugMode::Strict && attempt < self.config.max_slug_retries
    }
}

/// Only the author may edit a store.
fn confirm_owner(store: &Store, editor: UserId) -> Result<()> {
    if store.author != editor {
        return Err(AppError::Forbidden(
            "You must be the store creator to edit it".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use delicious_core::{Location, Point, StoreName};

    use super::*;
    use crate::db::MemoryStoreCollection;

    fn service() -> StoreService<MemoryStoreCollection> {
        StoreService::new(MemoryStoreCollection::new(), DirectoryConfig::default())
    }

    fn new_store(name: &str, author: i32) -> NewStore {
        NewStore {
            name: StoreName::parse(name).unwrap(),
            description: None,
            tags: vec![],
            location: Location::new(Point::new(0.0, 0.0).unwrap(), "1 Main St").unwrap(),
            photo: None,
            author: UserId::new(author),
        }
    }

    fn changes_from(store: &Store, name: &str) -> StoreChanges {
        StoreChanges {
            name: StoreName::parse(name).unwrap(),
            description: store.description.clone(),
            tags: store.tags.clone(),
            location: store.location.clone(),
            photo: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_slugs() {
        let service = service();
        let a = service.create_store(new_store("Cafe", 1)).await.unwrap();
        let b = service.create_store(new_store("Café", 1)).await.unwrap();
        let c = service.create_store(new_store("CAFE!", 1)).await.unwrap();
        assert_eq!(a.slug.as_str(), "cafe");
        assert_eq!(b.slug.as_str(), "cafe-2");
        assert_eq!(c.slug.as_str(), "cafe-3");
    }

    #[tokio::test]
    async fn test_update_without_rename_keeps_slug() {
        let service = service();
        service.create_store(new_store("Cafe", 1)).await.unwrap();
        let second = service.create_store(new_store("Cafe", 1)).await.unwrap();
        assert_eq!(second.slug.as_str(), "cafe-2");

        let mut changes = changes_from(&second, "Cafe");
        changes.tags = vec!["wifi".to_string()];
        let updated = service
            .update_store(second.id, UserId::new(1), changes)
            .await
            .unwrap();
        assert_eq!(updated.slug.as_str(), "cafe-2");
        assert_eq!(updated.tags, vec!["wifi"]);
    }

    #[tokio::test]
    async fn test_rename_with_same_base_counts_itself() {
        let service = service();
        let store = service.create_store(new_store("Cafe", 1)).await.unwrap();
        let updated = service
            .update_store(store.id, UserId::new(1), changes_from(&store, "CAFE"))
            .await
            .unwrap();
        assert_eq!(updated.slug.as_str(), "cafe-2");
    }

    #[tokio::test]
    async fn test_rename_derives_new_slug() {
        let service = service();
        let store = service.create_store(new_store("Cafe", 1)).await.unwrap();
        let updated = service
            .update_store(store.id, UserId::new(1), changes_from(&store, "Wok Star"))
            .await
            .unwrap();
        assert_eq!(updated.slug.as_str(), "wok-star");
        assert_eq!(updated.created, store.created);
    }

    #[tokio::test]
    async fn test_update_requires_owner() {
        let service = service();
        let store = service.create_store(new_store("Cafe", 1)).await.unwrap();
        let err = service
            .update_store(store.id, UserId::new(2), changes_from(&store, "Mine Now"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let unchanged = service.get_store(store.id).await.unwrap();
        assert_eq!(unchanged.name.as_str(), "Cafe");
    }

    #[tokio::test]
    async fn test_update_missing_store() {
        let service = service();
        let store = service.create_store(new_store("Cafe", 1)).await.unwrap();
        let err = service
            .update_store(StoreId::new(404), UserId::new(1), changes_from(&store, "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_by_slug() {
        let service = service();
        service.create_store(new_store("Wok Star", 1)).await.unwrap();
        assert_eq!(
            service
                .get_store_by_slug("wok-star")
                .await
                .unwrap()
                .name
                .as_str(),
            "Wok Star"
        );
        assert!(matches!(
            service.get_store_by_slug("nope").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_stores_pages() {
        let service = service();
        for i in 0..8 {
            service
                .create_store(new_store(&format!("Store {i}"), 1))
                .await
                .unwrap();
        }

        let first = service.list_stores(1).await.unwrap();
        assert_eq!(first.stores.len(), 6);
        assert_eq!(first.pages, 2);
        assert_eq!(first.count, 8);

        let second = service.list_stores(2).await.unwrap();
        assert_eq!(second.stores.len(), 2);

        let zero = service.list_stores(0).await.unwrap();
        assert_eq!(zero.page, 1);

        let beyond = service.list_stores(5).await.unwrap();
        assert!(beyond.is_out_of_range());
    }

    #[tokio::test]
    async fn test_zero_page_size_is_read_as_one() {
        let config = DirectoryConfig {
            page_size: 0,
            search_limit: 0,
            ..DirectoryConfig::default()
        };
        let service = StoreService::new(MemoryStoreCollection::new(), config);
        service.create_store(new_store("Cafe", 1)).await.unwrap();
        service.create_store(new_store("Wok Star", 1)).await.unwrap();

        let page = service.list_stores(1).await.unwrap();
        assert_eq!(page.stores.len(), 1);
        assert_eq!(page.pages, 2);
        assert_eq!(service.search_stores("cafe").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_search_returns_nothing() {
        let service = service();
        service.create_store(new_store("Cafe", 1)).await.unwrap();
        assert!(service.search_stores("  ").await.unwrap().is_empty());
        assert_eq!(service.search_stores("cafe").await.unwrap().len(), 1);
    }
}

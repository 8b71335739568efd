//! Store repository for `PostgreSQL`.
//!
//! Queries use sqlx's runtime API to avoid SQLx offline mode cache
//! requirements.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use delicious_core::{Location, Point, Slug, StoreId, StoreName, TagCount, UserId};

use super::{RepositoryError, StoreCollection};
use crate::models::{Store, StoreRecord};
use crate::services::slug::slug_pattern;

const STORE_COLUMNS: &str = "id, name, slug, description, tags, location_coordinates, \
                             location_address, photo, author, created";

const SEARCH_DOCUMENT: &str = "to_tsvector('english', name || ' ' || coalesce(description, ''))";

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: i32,
    name: String,
    slug: String,
    description: Option<String>,
    tags: Vec<String>,
    location_coordinates: Vec<f64>,
    location_address: String,
    photo: Option<String>,
    author: i32,
    created: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let name = StoreName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid name for store {}: {e}", row.id))
        })?;

        let &[lng, lat] = row.location_coordinates.as_slice() else {
            return Err(RepositoryError::DataCorruption(format!(
                "store {} has {} coordinates",
                row.id,
                row.location_coordinates.len()
            )));
        };
        let location = Point::new(lng, lat)
            .and_then(|point| Location::new(point, &row.location_address))
            .map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid location for store {}: {e}",
                    row.id
                ))
            })?;

        Ok(Self {
            id: StoreId::new(row.id),
            name,
            slug: Slug::from_stored(row.slug),
            description: row.description,
            tags: row.tags,
            location,
            photo: row.photo,
            author: UserId::new(row.author),
            created: row.created,
        })
    }
}

fn into_stores(rows: Vec<StoreRow>) -> Result<Vec<Store>, RepositoryError> {
    rows.into_iter().map(Store::try_from).collect()
}

fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("slug already exists".to_owned());
    }
    RepositoryError::Database(e)
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Repository for store database operations.
#[derive(Debug, Clone)]
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Add the unique slug index strict slug mode depends on.
    ///
    /// Fails if duplicate slugs are already stored; those have to be renamed
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the index cannot be created.
    pub async fn enforce_unique_slugs(&self) -> Result<(), RepositoryError> {
        sqlx::query::<sqlx::Postgres>(
            "CREATE UNIQUE INDEX IF NOT EXISTS store_slug_unique_idx ON directory.store (slug)",
        )
        .execute(&self.pool)
        .await?;

        info!("Unique slug index in place");
        Ok(())
    }
}

impl StoreCollection for PgStoreRepository {
    #[instrument(skip(self, record), fields(slug = %record.slug))]
    async fn insert(&self, record: StoreRecord) -> Result<Store, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO directory.store
                (name, slug, description, tags, location_coordinates, location_address, photo, author)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {STORE_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(record.name.as_str())
            .bind(record.slug.as_str())
            .bind(record.description.as_deref())
            .bind(&record.tags)
            .bind(record.location.point.coordinates().to_vec())
            .bind(&record.location.address)
            .bind(record.photo.as_deref())
            .bind(record.author.as_i32())
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        let store = Store::try_from(row)?;
        debug!(id = %store.id, "Inserted store");
        Ok(store)
    }

    #[instrument(skip(self, record), fields(slug = %record.slug))]
    async fn update(&self, id: StoreId, record: StoreRecord) -> Result<Option<Store>, RepositoryError> {
        let sql = format!(
            r"
            UPDATE directory.store
            SET name = $2,
                slug = $3,
                description = $4,
                tags = $5,
                location_coordinates = $6,
                location_address = $7,
                photo = $8
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(id.as_i32())
            .bind(record.name.as_str())
            .bind(record.slug.as_str())
            .bind(record.description.as_deref())
            .bind(&record.tags)
            .bind(record.location.point.coordinates().to_vec())
            .bind(&record.location.address)
            .bind(record.photo.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        row.map(Store::try_from).transpose()
    }

    async fn find_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM directory.store WHERE id = $1");

        let row = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Store::try_from).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Store>, RepositoryError> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM directory.store WHERE slug = $1 LIMIT 1");

        let row = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Store::try_from).transpose()
    }

    #[instrument(skip(self, base), fields(base = %base))]
    async fn find_slugs_matching(&self, base: &Slug) -> Result<Vec<Slug>, RepositoryError> {
        let slugs = sqlx::query_scalar::<_, String>(
            r"
            SELECT slug FROM directory.store
            WHERE slug ~* $1
            ",
        )
        .bind(slug_pattern(base))
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs.into_iter().map(Slug::from_stored).collect())
    }

    async fn scan_tags(&self) -> Result<Vec<Vec<String>>, RepositoryError> {
        let tags = sqlx::query_scalar::<_, Vec<String>>("SELECT tags FROM directory.store")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    #[instrument(skip(self))]
    async fn tag_counts(&self) -> Result<Vec<TagCount>, RepositoryError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r"
            SELECT tag, COUNT(*) AS count
            FROM directory.store, unnest(tags) AS tag
            GROUP BY tag
            ORDER BY count DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(tag, count)| TagCount::new(tag, u64::try_from(count).unwrap_or_default()))
            .collect())
    }

    async fn list(&self, skip: u64, limit: u32) -> Result<Vec<Store>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {STORE_COLUMNS} FROM directory.store
            ORDER BY created DESC, id DESC
            OFFSET $1 LIMIT $2
            "
        );

        let rows = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(to_i64(skip))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        into_stores(rows)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM directory.store")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count.0).unwrap_or_default())
    }

    async fn find_by_tag(&self, tag: Option<&str>) -> Result<Vec<Store>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {STORE_COLUMNS} FROM directory.store
            WHERE $1::text IS NULL OR $1 = ANY(tags)
            ORDER BY id
            "
        );

        let rows = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(tag)
            .fetch_all(&self.pool)
            .await?;

        into_stores(rows)
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Store>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {STORE_COLUMNS}
            FROM directory.store, plainto_tsquery('english', $1) AS q
            WHERE {SEARCH_DOCUMENT} @@ q
            ORDER BY ts_rank({SEARCH_DOCUMENT}, q) DESC
            LIMIT $2
            "
        );

        let rows = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(query)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        into_stores(rows)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row() -> StoreRow {
        StoreRow {
            id: 4,
            name: "Wok Star".to_string(),
            slug: "wok-star".to_string(),
            description: None,
            tags: vec!["noodles".to_string()],
            location_coordinates: vec![-79.4, 43.6],
            location_address: "1 Queen St".to_string(),
            photo: Some("abc.jpeg".to_string()),
            author: 9,
            created: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion() {
        let store = Store::try_from(row()).unwrap();
        assert_eq!(store.id, StoreId::new(4));
        assert_eq!(store.slug.as_str(), "wok-star");
        assert_eq!(store.author, UserId::new(9));
        assert_eq!(store.location.address, "1 Queen St");
    }

    #[test]
    fn test_row_with_bad_coordinates_is_corruption() {
        let bad = StoreRow {
            location_coordinates: vec![1.0],
            ..row()
        };
        assert!(matches!(
            Store::try_from(bad),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_row_with_blank_name_is_corruption() {
        let bad = StoreRow {
            name: "  ".to_string(),
            ..row()
        };
        assert!(matches!(
            Store::try_from(bad),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_empty_slug_survives_conversion() {
        let store = Store::try_from(StoreRow {
            name: "!!!".to_string(),
            slug: String::new(),
            ..row()
        })
        .unwrap();
        assert!(store.slug.is_empty());
    }
}

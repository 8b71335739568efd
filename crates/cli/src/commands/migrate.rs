//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! # Create the directory schema
//! dl-cli migrate
//!
//! # Also add the unique slug index (needed for DIRECTORY_SLUG_MODE=strict)
//! dl-cli migrate --unique-slugs
//! ```
//!
//! # Environment Variables
//!
//! - `DIRECTORY_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Directory migrations: `crates/directory/migrations/`

use delicious_directory::{DirectoryConfig, PgStoreRepository, db};

/// Run the directory migrations, optionally adding the unique slug index.
pub async fn run(unique_slugs: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = DirectoryConfig::from_env()?;

    tracing::info!("Connecting to directory database...");
    let pool = db::create_pool(config.require_database_url()?).await?;

    db::migrate(&pool).await?;

    if unique_slugs {
        PgStoreRepository::new(pool).enforce_unique_slugs().await?;
    }
    Ok(())
}

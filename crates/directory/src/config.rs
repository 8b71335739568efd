//! Directory configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required for Postgres-backed commands
//! - `DIRECTORY_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `DIRECTORY_PAGE_SIZE` - Stores per listing page (default: 6)
//! - `DIRECTORY_SEARCH_LIMIT` - Maximum search results (default: 6)
//! - `DIRECTORY_SLUG_MODE` - `lenient` or `strict` (default: lenient)
//! - `DIRECTORY_SLUG_RETRIES` - Attempts per write in strict mode (default: 5)

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_PAGE_SIZE: &str = "6";
const DEFAULT_SEARCH_LIMIT: &str = "6";
const DEFAULT_SLUG_RETRIES: &str = "5";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// How slug uniqueness is enforced on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlugMode {
    /// Read matching slugs, then write. Two concurrent writers with the same
    /// base name can both persist the bare base slug.
    #[default]
    Lenient,
    /// The collection rejects duplicate slugs and the writer re-derives its
    /// slug and retries after a conflict.
    Strict,
}

impl FromStr for SlugMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("expected `lenient` or `strict`, got `{other}`")),
        }
    }
}

/// Store directory configuration.
#[derive(Clone)]
pub struct DirectoryConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// Stores shown per listing page
    pub page_size: u32,
    /// Maximum number of search results
    pub search_limit: u32,
    /// Slug uniqueness strategy
    pub slug_mode: SlugMode,
    /// Write attempts in strict mode before a conflict is surfaced
    pub max_slug_retries: u32,
}

impl fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("page_size", &self.page_size)
            .field("search_limit", &self.search_limit)
            .field("slug_mode", &self.slug_mode)
            .field("max_slug_retries", &self.max_slug_retries)
            .finish()
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            page_size: 6,
            search_limit: 6,
            slug_mode: SlugMode::Lenient,
            max_slug_retries: 5,
        }
    }
}

impl DirectoryConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for unparseable or zero values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DIRECTORY_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from);

        let page_size = parse_positive(&lookup, "DIRECTORY_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let search_limit = parse_positive(&lookup, "DIRECTORY_SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT)?;
        let max_slug_retries =
            parse_positive(&lookup, "DIRECTORY_SLUG_RETRIES", DEFAULT_SLUG_RETRIES)?;

        let slug_mode = match lookup("DIRECTORY_SLUG_MODE") {
            Some(raw) => raw
                .parse::<SlugMode>()
                .map_err(|e| ConfigError::InvalidEnvVar("DIRECTORY_SLUG_MODE".to_string(), e))?,
            None => SlugMode::default(),
        };

        Ok(Self {
            database_url,
            page_size,
            search_limit,
            slug_mode,
            max_slug_retries,
        })
    }

    /// Returns the database URL, or an error naming the missing variable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no database URL was configured.
    pub fn require_database_url(&self) -> Result<&SecretString, ConfigError> {
        self.database_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DIRECTORY_DATABASE_URL".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a positive integer variable, falling back to a default.
fn parse_positive<F>(lookup: &F, key: &str, default: &str) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    let value = raw
        .trim()
        .parse::<u32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if value == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be at least 1".to_string(),
        ));
    }
    Ok(value)
}

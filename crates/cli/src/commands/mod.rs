//! CLI command implementations.

pub mod migrate;
pub mod store;
pub mod tags;

use delicious_directory::{DirectoryConfig, PgStoreRepository, StoreService, db};

/// Where command results go: pretty JSON or plain lines on stdout.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON when `--json` is set, otherwise run `human`.
    pub fn emit<T, F>(&self, value: &T, human: F) -> Result<(), serde_json::Error>
    where
        T: serde::Serialize,
        F: FnOnce(&T),
    {
        if self.json {
            let rendered = serde_json::to_string_pretty(value)?;
            #[allow(clippy::print_stdout)]
            {
                println!("{rendered}");
            }
        } else {
            human(value);
        }
        Ok(())
    }
}

/// Load configuration from the environment and connect the store service.
pub async fn connect() -> Result<StoreService<PgStoreRepository>, Box<dyn std::error::Error>> {
    let config = DirectoryConfig::from_env()?;
    tracing::debug!(?config, "Loaded directory configuration");

    let pool = db::create_pool(config.require_database_url()?).await?;
    Ok(StoreService::new(PgStoreRepository::new(pool), config))
}

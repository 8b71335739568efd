//! Delicious store directory library.
//!
//! The persistence core of the store directory: deriving unique slugs for
//! stores and aggregating the tag vocabulary, plus the listing, tag and
//! search reads built on the same store collection.
//!
//! Authentication, photo uploads and HTTP handling live elsewhere; this crate
//! only receives the author id and photo filename they produce.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::{DirectoryConfig, SlugMode};
pub use db::{MemoryStoreCollection, PgStoreRepository, RepositoryError, StoreCollection};
pub use error::{AppError, Result};
pub use services::StoreService;

//! Delicious Core - Shared domain types for the store directory.
//!
//! This crate provides the types used across all Delicious components:
//! - `directory` - Store persistence, slug assignment and tag aggregation
//! - `cli` - Command-line tools for migrations and store management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, store names, slugs, locations and tag counts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

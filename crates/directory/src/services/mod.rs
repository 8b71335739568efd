//! Business logic for the store directory.
//!
//! - [`slug`] - Slug derivation and assignment
//! - [`tags`] - Tag vocabulary aggregation
//! - [`stores`] - Store create/edit/browse/search operations

pub mod slug;
pub mod stores;
pub mod tags;

pub use slug::{
    assign_slug, derive_slug, derive_slug_past, name_changed, next_slug, next_slug_after_conflict,
    slug_pattern,
};
pub use stores::StoreService;
pub use tags::{aggregate_tags, list_tags};

//! Core types for the Delicious store directory.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod location;
pub mod name;
pub mod slug;
pub mod tag;

pub use id::*;
pub use location::{Location, LocationError, Point};
pub use name::{StoreName, StoreNameError};
pub use slug::Slug;
pub use tag::TagCount;

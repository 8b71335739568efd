//! Domain models for the store directory.

pub mod store;

pub use store::{
    NewStore, Store, StoreChanges, StoreForm, StorePage, StoreRecord, StoreValidationError,
    TagView,
};

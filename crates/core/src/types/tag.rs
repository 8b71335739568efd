//! Aggregated tag usage.

use serde::{Deserialize, Serialize};

/// One row of the tag vocabulary: a tag and how many store entries carry it.
///
/// A store listing the same tag twice contributes two to its count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagCount {
    /// The tag value, exactly as stored.
    pub tag: String,
    /// Number of `(tag, store)` entries with this value.
    pub count: u64,
}

impl TagCount {
    /// Create a tag count row.
    #[must_use]
    pub fn new(tag: impl Into<String>, count: u64) -> Self {
        Self {
            tag: tag.into(),
            count,
        }
    }
}

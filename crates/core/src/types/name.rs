//! Store display name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`StoreName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreNameError {
    /// The input is empty after trimming.
    #[error("Please enter a store name")]
    Empty,
}

/// The display name of a store.
///
/// Names are stored trimmed and are never empty. The slug of a store is
/// derived from this value whenever it is created or changed.
///
/// ## Examples
///
/// ```
/// use delicious_core::StoreName;
///
/// let name = StoreName::parse("  Cafe Crème ").unwrap();
/// assert_eq!(name.as_str(), "Cafe Crème");
///
/// assert!(StoreName::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct StoreName(String);

impl StoreName {
    /// Parse a `StoreName`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreNameError::Empty`] if the trimmed input is empty.
    pub fn parse(s: &str) -> Result<Self, StoreNameError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(StoreNameError::Empty);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `StoreName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StoreName {
    type Err = StoreNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StoreName {
    type Error = StoreNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StoreName> for String {
    fn from(name: StoreName) -> Self {
        name.0
    }
}

impl AsRef<str> for StoreName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! URL-safe store identifiers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A URL-safe identifier derived from a store name.
///
/// A *base* slug comes straight from [`Slug::base_from`]. Disambiguated slugs
/// carry a numeric suffix (`cafe-2`, `cafe-3`, ...) added with
/// [`Slug::with_suffix`].
///
/// Names made entirely of punctuation slugify to the empty string. That value
/// is accepted and stored as-is.
///
/// ```
/// use delicious_core::Slug;
///
/// assert_eq!(Slug::base_from("Café Crème").as_str(), "cafe-creme");
/// assert_eq!(Slug::base_from("Wok & Roll!").as_str(), "wok-roll");
/// assert_eq!(Slug::base_from("!!!").as_str(), "");
/// assert_eq!(Slug::base_from("Cafe").with_suffix(2).as_str(), "cafe-2");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Slugify a display name: lower-case, transliterate to ASCII, and collapse
    /// every run of other characters into a single hyphen.
    #[must_use]
    pub fn base_from(name: &str) -> Self {
        Self(::slug::slugify(name))
    }

    /// Wrap a slug that was already persisted.
    ///
    /// No normalisation happens here; stored slugs are taken as they are.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Append a numeric disambiguation suffix.
    #[must_use]
    pub fn with_suffix(&self, n: usize) -> Self {
        Self(format!("{}-{n}", self.0))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty slug.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

//! Slug assignment for stores.
//!
//! Whenever a store's name is set or changed its slug is re-derived:
//!
//! 1. slugify the name into a *base* slug,
//! 2. count stored slugs matching `base` or `base-<digits>` (case-insensitive),
//! 3. zero matches keeps `base`, `N` matches gives `base-(N+1)`.
//!
//! Numbering is count-based. It never looks for a free gap, so after
//! `cafe-2` is removed while `cafe-3` remains, the next `Cafe` gets `cafe-3`
//! again.
//!
//! # Races
//!
//! Steps 2 and 3 are a read followed by a separate write. Two writers with the
//! same base name can both read zero matches and both store the bare base
//! slug. [`crate::config::SlugMode::Strict`] closes the gap by relying on a
//! unique index and retrying; the default mode leaves it open.
//!
//! The match query also counts the store being saved. Renaming `Cafe` to
//! `CAFE` keeps the base `cafe`, sees itself, and moves to `cafe-2`.
//!
//! Count-based numbering can land on a slug that is already taken, for
//! example after `cafe-2` was renamed away while `cafe-3` remains. Strict mode
//! therefore derives its retries with [`derive_slug_past`], which steps past
//! the highest suffix in use instead of counting.

use tracing::{debug, instrument};

use delicious_core::{Slug, StoreName};

use crate::db::{RepositoryError, StoreCollection};

/// Regular expression matching `base` and its numbered variants.
///
/// Callers apply it case-insensitively.
#[must_use]
pub fn slug_pattern(base: &Slug) -> String {
    format!("^{}(-[0-9]*)?$", regex::escape(base.as_str()))
}

/// Pick the slug for `base` given the slugs already stored that match it.
#[must_use]
pub fn derive_slug(base: &Slug, existing: &[Slug]) -> Slug {
    if existing.is_empty() {
        base.clone()
    } else {
        base.with_suffix(existing.len() + 1)
    }
}

/// Pick a slug above every numbered variant of `base` already stored.
///
/// Used for strict-mode retries after a conflict. The bare base and a bare
/// trailing hyphen count as suffix 1.
#[must_use]
pub fn derive_slug_past(base: &Slug, existing: &[Slug]) -> Slug {
    let highest = existing
        .iter()
        .map(|slug| suffix_of(base, slug))
        .max();

    match highest {
        None => base.clone(),
        Some(n) => base.with_suffix(n.saturating_add(1)),
    }
}

/// Numeric suffix of `slug` relative to `base`, compared case-insensitively.
fn suffix_of(base: &Slug, slug: &Slug) -> usize {
    let (base, slug) = (base.as_str(), slug.as_str());
    slug.get(..base.len())
        .filter(|head| head.eq_ignore_ascii_case(base))
        .and_then(|_| slug.get(base.len()..))
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(1)
}

/// Whether a write changes the stored name.
///
/// Both sides are already trimmed, so re-saving the same name is a no-op.
#[must_use]
pub fn name_changed(current: &StoreName, next: &StoreName) -> bool {
    current != next
}

/// Derive a collision-free slug for `name`.
///
/// Returns `Ok(None)` without touching the collection when `name_modified` is
/// false; the stored slug must then be kept as is.
///
/// # Errors
///
/// Returns the collection's error if the match query fails. The caller must
/// abort the write in that case.
pub async fn assign_slug<C: StoreCollection>(
    collection: &C,
    name: &StoreName,
    name_modified: bool,
) -> Result<Option<Slug>, RepositoryError> {
    if !name_modified {
        debug!(name = %name, "Name unchanged, keeping slug");
        return Ok(None);
    }
    next_slug(collection, name).await.map(Some)
}

/// Slugify `name` and disambiguate it against the stored slugs.
///
/// Always performs exactly one read against the collection.
///
/// # Errors
///
/// Returns the collection's error if the match query fails.
#[instrument(skip(collection, name), fields(name = %name))]
pub async fn next_slug<C: StoreCollection>(
    collection: &C,
    name: &StoreName,
) -> Result<Slug, RepositoryError> {
    let base = Slug::base_from(name.as_str());
    let existing = collection.find_slugs_matching(&base).await?;
    let slug = derive_slug(&base, &existing);

    debug!(base = %base, matches = existing.len(), slug = %slug, "Assigned slug");
    Ok(slug)
}

/// Re-derive a slug for `name` after a unique-slug conflict.
///
/// Like [`next_slug`] but numbers past the highest stored suffix, so repeated
/// retries cannot keep choosing the same taken slug.
///
/// # Errors
///
/// Returns the collection's error if the match query fails.
#[instrument(skip(collection, name), fields(name = %name))]
pub async fn next_slug_after_conflict<C: StoreCollection>(
    collection: &C,
    name: &StoreName,
) -> Result<Slug, RepositoryError> {
    let base = Slug::base_from(name.as_str());
    let existing = collection.find_slugs_matching(&base).await?;
    let slug = derive_slug_past(&base, &existing);

    debug!(base = %base, matches = existing.len(), slug = %slug, "Re-assigned slug after conflict");
    Ok(slug)
}

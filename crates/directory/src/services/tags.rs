//! Tag vocabulary aggregation.
//!
//! Every store's tag list is unwound into `(tag, store)` entries, grouped by
//! tag value, counted, and sorted by count descending. Results are always
//! computed live.

use std::collections::HashMap;

use tracing::{debug, instrument};

use delicious_core::TagCount;

use crate::db::{RepositoryError, StoreCollection};

/// Fold tag lists into counts, most used first.
///
/// A store with `k` tags contributes `k` entries, duplicates included; a store
/// with no tags contributes nothing. Tags with equal counts keep the order in
/// which they were first seen.
#[must_use]
pub fn aggregate_tags<I, T>(stores: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = T>,
    T: IntoIterator<Item = String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<TagCount> = Vec::new();

    for tag in stores.into_iter().flatten() {
        if let Some(&i) = index.get(&tag) {
            if let Some(row) = counts.get_mut(i) {
                row.count += 1;
            }
        } else {
            index.insert(tag.clone(), counts.len());
            counts.push(TagCount::new(tag, 1));
        }
    }

    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// List every tag in use with its count.
///
/// # Errors
///
/// Returns the collection's error if the scan fails; no partial result is
/// produced.
#[instrument(skip(collection))]
pub async fn list_tags<C: StoreCollection>(collection: &C) -> Result<Vec<TagCount>, RepositoryError> {
    let tags = collection.tag_counts().await?;
    debug!(count = tags.len(), "Aggregated tags");
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists(values: &[&[&str]]) -> Vec<Vec<String>> {
        values
            .iter()
            .map(|tags| tags.iter().map(|t| (*t).to_string()).collect())
            .collect()
    }

    #[test]
    fn test_counts_descending() {
        let result = aggregate_tags(lists(&[&["a", "b"], &["a"], &[]]));
        assert_eq!(result, vec![TagCount::new("a", 2), TagCount::new("b", 1)]);
    }

    #[test]
    fn test_no_stores() {
        assert!(aggregate_tags(Vec::<Vec<String>>::new()).is_empty());
    }

    #[test]
    fn test_stores_without_tags() {
        assert!(aggregate_tags(lists(&[&[], &[]])).is_empty());
    }

    #[test]
    fn test_duplicates_within_a_store_count_twice() {
        let result = aggregate_tags(lists(&[&["wifi", "wifi"], &["vegan"]]));
        assert_eq!(
            result,
            vec![TagCount::new("wifi", 2), TagCount::new("vegan", 1)]
        );
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let result = aggregate_tags(lists(&[&["Wifi"], &["wifi"]]));
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|t| t.count == 1));
    }

    #[test]
    fn test_ties_contain_every_tag() {
        // tie order is not part of the contract; only membership is checked
        let result = aggregate_tags(lists(&[&["x", "y", "z"], &["z"]]));
        assert_eq!(result.first(), Some(&TagCount::new("z", 2)));

        let mut rest: Vec<&str> = result.iter().skip(1).map(|t| t.tag.as_str()).collect();
        rest.sort_unstable();
        assert_eq!(rest, vec!["x", "y"]);
    }
}

//! Integration tests against `PostgreSQL`.
//!
//! Ignored by default. Set `DIRECTORY_TEST_DATABASE_URL` and run with
//! `--include-ignored`. Each test works on names unique to its run, so the
//! database can be shared and is never truncated.

#![allow(clippy::unwrap_used)]

use delicious_directory::services::slug_pattern;
use delicious_directory::{
    AppError, PgStoreRepository, RepositoryError, SlugMode, StoreCollection, StoreService,
};
use delicious_integration_tests::{
    AUTHOR, config, new_store, rename, test_repository, unique_name,
};

async fn service(mode: SlugMode) -> StoreService<PgStoreRepository> {
    let repository = test_repository()
        .await
        .expect("DIRECTORY_TEST_DATABASE_URL must be set for ignored tests");
    StoreService::new(repository, config(mode))
}

#[tokio::test]
#[ignore = "requires DIRECTORY_TEST_DATABASE_URL"]
async fn test_sequential_slugs() {
    let service = service(SlugMode::Lenient).await;
    let name = unique_name("Cafe");

    let first = service.create_store(new_store(&name, &[])).await.unwrap();
    let second = service
        .create_store(new_store(&name.to_uppercase(), &[]))
        .await
        .unwrap();

    assert_eq!(second.slug.as_str(), format!("{}-2", first.slug));
}

#[tokio::test]
#[ignore = "requires DIRECTORY_TEST_DATABASE_URL"]
async fn test_slug_match_is_case_insensitive_in_sql() {
    let service = service(SlugMode::Lenient).await;
    let name = unique_name("Bakery");
    let first = service.create_store(new_store(&name, &[])).await.unwrap();

    let upper = delicious_core::Slug::from_stored(first.slug.as_str().to_uppercase());
    let found = service
        .collection()
        .find_slugs_matching(&upper)
        .await
        .unwrap();

    assert_eq!(found, vec![first.slug.clone()]);
    assert!(slug_pattern(&first.slug).starts_with('^'));
}

#[tokio::test]
#[ignore = "requires DIRECTORY_TEST_DATABASE_URL"]
async fn test_resave_keeps_slug_and_rename_moves_it() {
    let service = service(SlugMode::Lenient).await;
    let name = unique_name("Diner");
    let store = service.create_store(new_store(&name, &["late"])).await.unwrap();

    let kept = service
        .update_store(store.id, AUTHOR, rename(&store, &name))
        .await
        .unwrap();
    assert_eq!(kept.slug, store.slug);
    assert_eq!(kept.created, store.created);

    let renamed = service
        .update_store(store.id, AUTHOR, rename(&store, &name.to_uppercase()))
        .await
        .unwrap();
    assert_eq!(renamed.slug.as_str(), format!("{}-2", store.slug));
}

#[tokio::test]
#[ignore = "requires DIRECTORY_TEST_DATABASE_URL"]
async fn test_native_tag_counts_match_fold() {
    let service = service(SlugMode::Lenient).await;
    let a = unique_name("tag-a");
    let b = unique_name("tag-b");
    service
        .create_store(new_store(&unique_name("One"), &[&a, &b]))
        .await
        .unwrap();
    service
        .create_store(new_store(&unique_name("Two"), &[&a]))
        .await
        .unwrap();

    let repository = service.collection();
    let native = repository.tag_counts().await.unwrap();
    let folded = delicious_directory::services::aggregate_tags(repository.scan_tags().await.unwrap());

    for tag in [&a, &b] {
        let native_count = native.iter().find(|t| &t.tag == tag).map(|t| t.count);
        let folded_count = folded.iter().find(|t| &t.tag == tag).map(|t| t.count);
        assert_eq!(native_count, folded_count);
    }
    assert_eq!(native.iter().find(|t| t.tag == a).unwrap().count, 2);

    assert!(native.is_sorted_by(|x, y| x.count >= y.count));
}

#[tokio::test]
#[ignore = "requires DIRECTORY_TEST_DATABASE_URL"]
async fn test_empty_slug_round_trips() {
    let service = service(SlugMode::Lenient).await;

    let store = service.create_store(new_store("!!!", &[])).await.unwrap();
    let reread = service.get_store(store.id).await.unwrap();

    assert_eq!(reread.slug, store.slug);
    assert!(reread.slug.as_str().is_empty() || reread.slug.as_str().starts_with('-'));
}

#[tokio::test]
#[ignore = "requires DIRECTORY_TEST_DATABASE_URL"]
async fn test_missing_store_is_not_found() {
    let service = service(SlugMode::Lenient).await;
    let err = service
        .get_store_by_slug(&unique_name("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires DIRECTORY_TEST_DATABASE_URL"]
async fn test_duplicate_slug_insert_is_conflict_with_unique_index() {
    let service = service(SlugMode::Strict).await;
    let repository = service.collection();
    if repository.enforce_unique_slugs().await.is_err() {
        // Existing duplicate rows from lenient runs prevent the index
        return;
    }

    let name = unique_name("Grill");
    let store = service.create_store(new_store(&name, &[])).await.unwrap();
    let record = delicious_directory::models::StoreRecord::from_new(
        new_store(&name, &[]),
        store.slug.clone(),
    );

    let err = repository.insert(record).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}

//! Integration tests for the read side: pagination, tag views and search.

#![allow(clippy::unwrap_used)]

use delicious_directory::{AppError, MemoryStoreCollection, SlugMode, StoreService};
use delicious_integration_tests::{config, counts, memory_service, new_store};

async fn seeded(names: &[&str]) -> StoreService<MemoryStoreCollection> {
    let service = memory_service();
    for name in names {
        service.create_store(new_store(name, &[])).await.unwrap();
    }
    service
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_pages_are_newest_first() {
    let names: Vec<String> = (1..=8).map(|i| format!("Store {i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let service = seeded(&refs).await;

    let first = service.list_stores(1).await.unwrap();
    assert_eq!(first.count, 8);
    assert_eq!(first.pages, 2);
    assert_eq!(first.stores.len(), 6);
    assert_eq!(first.stores.first().unwrap().name.as_str(), "Store 8");

    let second = service.list_stores(2).await.unwrap();
    let names: Vec<&str> = second.stores.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Store 2", "Store 1"]);
    assert!(!second.is_out_of_range());
}

#[tokio::test]
async fn test_page_past_the_end_is_flagged() {
    let service = seeded(&["Only"]).await;

    let page = service.list_stores(3).await.unwrap();
    assert!(page.stores.is_empty());
    assert!(page.is_out_of_range());
    assert_eq!(page.pages, 1);
}

#[tokio::test]
async fn test_page_zero_reads_as_first_page() {
    let service = seeded(&["Only"]).await;

    let page = service.list_stores(0).await.unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.stores.len(), 1);
}

#[tokio::test]
async fn test_page_size_comes_from_config() {
    let config = delicious_directory::DirectoryConfig {
        page_size: 2,
        ..config(SlugMode::Lenient)
    };
    let service = StoreService::new(MemoryStoreCollection::new(), config);
    for name in ["A", "B", "C"] {
        service.create_store(new_store(name, &[])).await.unwrap();
    }

    let page = service.list_stores(1).await.unwrap();
    assert_eq!(page.stores.len(), 2);
    assert_eq!(page.pages, 2);
}

#[tokio::test]
async fn test_empty_directory_has_no_pages() {
    let service = memory_service();

    let page = service.list_stores(1).await.unwrap();
    assert_eq!(page.count, 0);
    assert_eq!(page.pages, 0);
    assert!(!page.is_out_of_range());
}

// =============================================================================
// Lookups and tag views
// =============================================================================

#[tokio::test]
async fn test_lookup_by_slug() {
    let service = seeded(&["Wok Star"]).await;

    let store = service.get_store_by_slug("wok-star").await.unwrap();
    assert_eq!(store.name.as_str(), "Wok Star");

    let err = service.get_store_by_slug("nope").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_tag_view_filters_stores_and_lists_vocabulary() {
    let service = memory_service();
    service.create_store(new_store("One", &["wifi", "vegan"])).await.unwrap();
    service.create_store(new_store("Two", &["wifi"])).await.unwrap();
    service.create_store(new_store("Three", &[])).await.unwrap();

    let view = service.stores_by_tag(Some("vegan")).await.unwrap();
    assert_eq!(view.tag.as_deref(), Some("vegan"));
    assert_eq!(view.tags, counts(&[("wifi", 2), ("vegan", 1)]));
    assert_eq!(view.stores.len(), 1);
    assert_eq!(view.stores.first().unwrap().name.as_str(), "One");

    let all = service.stores_by_tag(None).await.unwrap();
    assert!(all.tag.is_none());
    assert_eq!(all.stores.len(), 3);
}

#[tokio::test]
async fn test_tag_view_serializes_with_geojson_locations() {
    let service = memory_service();
    service.create_store(new_store("One", &["wifi"])).await.unwrap();

    let view = service.stores_by_tag(Some("wifi")).await.unwrap();
    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(json["tags"][0]["tag"], "wifi");
    assert_eq!(json["tags"][0]["count"], 1);
    assert_eq!(json["stores"][0]["slug"], "one");
    assert_eq!(json["stores"][0]["location"]["type"], "Point");
    assert_eq!(json["stores"][0]["location"]["coordinates"][0], -79.3832);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_is_limited_by_config() {
    let names: Vec<String> = (1..=8).map(|i| format!("Coffee {i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let service = seeded(&refs).await;

    let found = service.search_stores("coffee").await.unwrap();
    assert_eq!(found.len(), 6);
}

#[tokio::test]
async fn test_blank_search_returns_nothing() {
    let service = seeded(&["Coffee"]).await;
    assert!(service.search_stores("   ").await.unwrap().is_empty());
}

//! Store commands: add, edit, show, list and search.

use delicious_core::{StoreId, UserId};
use delicious_directory::models::{Store, StoreForm, StorePage};

use super::{Output, connect};

#[allow(clippy::print_stdout)]
fn print_store(store: &Store) {
    println!("{} [{}] {}", store.id, store.slug, store.name);
    println!("  address: {}", store.location.address);
    let [lng, lat] = store.location.point.coordinates();
    println!("  at: {lng}, {lat}");
    if let Some(description) = &store.description {
        println!("  {description}");
    }
    if !store.tags.is_empty() {
        println!("  tags: {}", store.tags.join(", "));
    }
}

#[allow(clippy::print_stdout)]
fn print_stores(stores: &[Store]) {
    if stores.is_empty() {
        println!("No stores found");
    }
    for store in stores {
        println!("{:>5}  {:<30} {}", store.id, store.slug, store.name);
    }
}

/// Create a store.
pub async fn add(output: &Output, form: StoreForm) -> Result<(), Box<dyn std::error::Error>> {
    let new_store = form.into_new_store()?;
    let service = connect().await?;

    let store = service.create_store(new_store).await?;
    output.emit(&store, print_store)?;
    Ok(())
}

/// Edit a store as `editor`.
pub async fn edit(
    output: &Output,
    id: i32,
    editor: i32,
    form: StoreForm,
) -> Result<(), Box<dyn std::error::Error>> {
    let changes = form.into_changes()?;
    let service = connect().await?;

    let store = service
        .update_store(StoreId::new(id), UserId::new(editor), changes)
        .await?;
    output.emit(&store, print_store)?;
    Ok(())
}

/// Show a single store by slug.
pub async fn show(output: &Output, slug: &str) -> Result<(), Box<dyn std::error::Error>> {
    let service = connect().await?;

    let store = service.get_store_by_slug(slug).await?;
    output.emit(&store, print_store)?;
    Ok(())
}

/// Print one page of the newest-first listing.
pub async fn list(output: &Output, page: u32) -> Result<(), Box<dyn std::error::Error>> {
    let service = connect().await?;

    let listing = service.list_stores(page).await?;
    if listing.is_out_of_range() {
        tracing::warn!(
            page = listing.page,
            pages = listing.pages,
            "Requested page does not exist"
        );
    }

    output.emit(&listing, |listing: &StorePage| {
        print_stores(&listing.stores);
        #[allow(clippy::print_stdout)]
        {
            println!(
                "page {} of {} ({} stores)",
                listing.page, listing.pages, listing.count
            );
        }
    })?;
    Ok(())
}

/// Full-text search over names and descriptions.
pub async fn search(output: &Output, query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let service = connect().await?;

    let stores = service.search_stores(query).await?;
    output.emit(&stores, |stores: &Vec<Store>| print_stores(stores))?;
    Ok(())
}

//! Tag browsing command.

use delicious_directory::models::TagView;

use super::{Output, connect};

/// Print the tag vocabulary with counts, followed by the stores for `tag`
/// (every store when no tag is given).
pub async fn run(output: &Output, tag: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let service = connect().await?;

    let view = service.stores_by_tag(tag).await?;
    output.emit(&view, print_view)?;
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_view(view: &TagView) {
    for entry in &view.tags {
        let marker = if view.tag.as_deref() == Some(entry.tag.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {} ({})", entry.tag, entry.count);
    }
    println!();
    for store in &view.stores {
        println!("{:>5}  {}", store.id, store.name);
    }
}

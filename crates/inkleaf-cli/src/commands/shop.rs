//! Catalog browsing.

use crate::context::App;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use storefront::Catalog;

pub fn catalog(app: &App, category: Option<&str>) -> Result<()> {
    let catalog = Catalog::builtin();
    let collections = catalog.filter(category.unwrap_or(storefront::ALL_CATEGORIES));

    if app.format == OutputFormat::Json {
        output::json(&collections);
        return Ok(());
    }

    if collections.is_empty() {
        println!(
            "No collections found. Categories: {}",
            catalog.categories().join(", ")
        );
        return Ok(());
    }

    output::heading("Collections");
    for collection in collections {
        println!(
            "  [{}] {:<20} {:>8}  {}",
            collection.id,
            collection.title,
            collection.price.to_string(),
            collection.category
        );
        println!("       {}", collection.description);
    }
    Ok(())
}

pub mod cache;
pub mod config;
pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod model;
pub mod pipelines;

use log::info;
use std::path::Path;

pub use cache::CacheStore;
pub use config::{ErrorPolicy, ImportConfig, SpecialPages};
pub use error::ImportError;
pub use model::{Catalogue, ImageRef, Recipe, RecipePart, Resource};
pub use pipelines::WikiImporter;

/// Extracts the product catalogue described by `config`.
///
/// # Example
/// ```no_run
/// # use factorio_wiki_import::{import_catalogue, ImportConfig};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalogue = import_catalogue(ImportConfig::default()).await?;
/// println!("{} products", catalogue.products().len());
/// # Ok(())
/// # }
/// ```
pub async fn import_catalogue(config: ImportConfig) -> Result<Catalogue, ImportError> {
    WikiImporter::new(config)?.run().await
}

/// Writes the catalogue as pretty-printed JSON
pub async fn write_catalogue(catalogue: &Catalogue, path: &Path) -> Result<(), ImportError> {
    let json = catalogue.to_json()?;
    tokio::fs::write(path, json).await?;
    info!("Wrote catalogue to {}", path.display());
    Ok(())
}

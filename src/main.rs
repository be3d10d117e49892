use factorio_wiki_import::{import_catalogue, write_catalogue, ImportConfig};
use log::error;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut config = ImportConfig::load()?;
    // Optional root category URL as the first argument
    if let Some(root_url) = env::args().nth(1) {
        config.root_url = root_url;
    }
    let output = config.output.clone();

    let catalogue = match import_catalogue(config).await {
        Ok(catalogue) => catalogue,
        Err(e) => {
            error!("Import failed: {}", e);
            return Err(e.into());
        }
    };

    write_catalogue(&catalogue, &output).await?;
    println!("Done!");

    Ok(())
}

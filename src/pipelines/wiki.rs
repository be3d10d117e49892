use crate::cache::CacheStore;
use crate::config::{ErrorPolicy, ImportConfig};
use crate::error::{parse_url, ImportError};
use crate::extractors::{classify, selector, PageExtract, PageKind, ParsingContext};
use crate::fetchers::RequestFetcher;
use crate::model::Catalogue;
use log::{debug, error, info, warn};
use scraper::Html;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use url::Url;

const CATEGORY_LINK: &str = "div.mw-category a";

/// Walks the wiki and accumulates the catalogue.
///
/// Pages are processed one at a time; every image of a page is in the cache
/// before the page's products and recipes are committed.
pub struct WikiImporter {
    config: ImportConfig,
    cache: CacheStore,
    exclusions: HashSet<String>,
    visited: HashSet<Url>,
    catalogue: Catalogue,
}

impl WikiImporter {
    pub fn new(config: ImportConfig) -> Result<Self, ImportError> {
        let fetcher = RequestFetcher::new(
            Some(Duration::from_secs(config.timeout)),
            &config.user_agent,
        )?;
        let cache = CacheStore::new(config.cache_dir.clone(), fetcher);

        Ok(Self {
            config,
            cache,
            exclusions: HashSet::new(),
            visited: HashSet::new(),
            catalogue: Catalogue::new(),
        })
    }

    /// Runs the root category pass, then the oil processing and barrel
    /// pages, and returns everything found.
    pub async fn run(mut self) -> Result<Catalogue, ImportError> {
        let root = parse_url(&self.config.root_url)?;
        self.parse_root(&root).await?;

        let special = [
            (self.config.pages.oil_url.clone(), PageKind::GenericTable),
            (self.config.pages.barrel_url.clone(), PageKind::FillingTable),
        ];
        for (url, kind) in special {
            if let Some(url) = url {
                let url = parse_url(&url)?;
                self.parse_page(&url, Some(kind)).await?;
            }
        }

        info!(
            "Found {} products and {} recipes",
            self.catalogue.products().len(),
            self.catalogue.recipes().len()
        );
        Ok(self.catalogue)
    }

    async fn parse_root(&mut self, root: &Url) -> Result<(), ImportError> {
        self.exclusions = match &self.config.exclusions_file {
            Some(path) => load_exclusions(path).await?,
            None => HashSet::new(),
        };

        let document = self.cache.fetch_page(root).await?;
        let links = category_links(&document, root);
        drop(document);
        info!("{} candidate pages on {}", links.len(), root);

        for url in links {
            if self.exclusions.contains(url.as_str()) {
                debug!("Excluded {}", url);
                continue;
            }

            match self.parse_page(&url, None).await {
                Err(e) if self.config.on_page_error == ErrorPolicy::Skip => {
                    error!("Skipping {}: {}", url, e);
                }
                result => result?,
            }
        }

        Ok(())
    }

    /// Parses a page unless an earlier visit already succeeded. A page that
    /// failed is tried again when it is reached another way.
    async fn parse_page(&mut self, url: &Url, kind: Option<PageKind>) -> Result<(), ImportError> {
        if self.visited.contains(url) {
            debug!("Already parsed {}", url);
            return Ok(());
        }

        self.visit_page(url, kind).await?;
        self.visited.insert(url.clone());
        Ok(())
    }

    /// Fetches, classifies and parses one page. `kind` forces the layout
    /// instead of classifying the page.
    async fn visit_page(&mut self, url: &Url, kind: Option<PageKind>) -> Result<(), ImportError> {
        let document = self.cache.fetch_page(url).await?;
        let extract = {
            let context = ParsingContext {
                url: url.clone(),
                document,
            };
            let kind = kind.unwrap_or_else(|| classify(&context, &self.config.pages));

            match kind {
                PageKind::Unrecognized => {
                    warn!("Unrecognized page layout: {}", url);
                    return Ok(());
                }
                PageKind::Skipped => {
                    debug!("Skipping {}", url);
                    return Ok(());
                }
                _ => {}
            }

            match kind.extractor() {
                Some(extractor) => {
                    debug!("Parsing {} as {:?}", url, kind);
                    extractor.parse(&context)?
                }
                None => return Ok(()),
            }
        };

        self.ingest(extract).await
    }

    /// Caches the page's images, then commits its products and recipes.
    async fn ingest(&mut self, extract: PageExtract) -> Result<(), ImportError> {
        for image in extract.images() {
            if let Some(absolute) = &image.absolute_url {
                self.cache.fetch_binary(&parse_url(absolute)?).await?;
            }
        }

        for product in extract.products {
            self.catalogue.add_product(product);
        }
        for recipe in extract.recipes {
            self.catalogue.add_recipe(recipe);
        }
        Ok(())
    }
}

/// Product page links of a category page, resolved against its URL
pub fn category_links(document: &Html, base: &Url) -> Vec<Url> {
    document
        .select(&selector(CATEGORY_LINK))
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| match base.join(href) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Ignoring link '{}' on {}: {}", href, base, e);
                None
            }
        })
        .collect()
}

/// Reads the exclusion list: one URL per line, blank lines ignored.
/// A missing file is an empty list.
pub async fn load_exclusions(path: &Path) -> Result<HashSet<String>, ImportError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No exclusion list at {}", path.display());
            return Ok(HashSet::new());
        }
        Err(e) => return Err(e.into()),
    };

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

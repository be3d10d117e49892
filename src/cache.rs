//! Local cache of wiki pages and images.
//!
//! Every remote URL maps to one file under the cache root: the URL path
//! becomes a directory path and the last segment gets a leading `.`. Pages
//! additionally get an `.html` suffix. Cached files are trusted forever.

use crate::error::ImportError;
use crate::fetchers::RequestFetcher;
use log::debug;
use scraper::Html;
use std::path::{Path, PathBuf};
use tokio::fs;
use url::Url;

const PAGE_EXTENSION: &str = "html";
const HIDDEN_MARKER: char = '.';

pub struct CacheStore {
    root: PathBuf,
    fetcher: RequestFetcher,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>, fetcher: RequestFetcher) -> Self {
        Self {
            root: root.into(),
            fetcher,
        }
    }

    /// Local file holding the HTML of `url`
    pub fn page_path(&self, url: &Url) -> PathBuf {
        self.local_path(url, Some(PAGE_EXTENSION))
    }

    /// Local file holding the bytes of `url`, with its original extension
    pub fn binary_path(&self, url: &Url) -> PathBuf {
        self.local_path(url, None)
    }

    fn local_path(&self, url: &Url, extension: Option<&str>) -> PathBuf {
        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.collect())
            .unwrap_or_default();

        let mut path = self.root.clone();
        let (last, dirs) = match segments.split_last() {
            Some((last, dirs)) => (*last, dirs),
            None => ("", &[][..]),
        };
        for dir in dirs.iter().filter(|d| !d.is_empty()) {
            path.push(encode_segment(dir));
        }

        let name = if last.is_empty() { "index" } else { last };
        let mut file = format!("{HIDDEN_MARKER}{}", encode_segment(name));
        if let Some(extension) = extension {
            file.push('.');
            file.push_str(extension);
        }
        path.push(file);
        path
    }

    /// Returns the parsed page, downloading it only when it is not cached yet.
    pub async fn fetch_page(&self, url: &Url) -> Result<Html, ImportError> {
        let path = self.page_path(url);

        if fs::try_exists(&path).await? {
            debug!("Cache hit for {} ({})", url, path.display());
            let html = fs::read_to_string(&path).await?;
            return Ok(Html::parse_document(&html));
        }

        debug!("Cache miss, fetching {}", url);
        let html = self.fetcher.fetch_text(url).await?;
        write_file(&path, html.as_bytes()).await?;
        Ok(Html::parse_document(&html))
    }

    /// Makes sure the bytes behind `url` are stored locally and returns their path.
    pub async fn fetch_binary(&self, url: &Url) -> Result<PathBuf, ImportError> {
        let path = self.binary_path(url);

        if fs::try_exists(&path).await? {
            debug!("Cache hit for {}", url);
            return Ok(path);
        }

        debug!("Cache miss, downloading {}", url);
        let bytes = self.fetcher.fetch_bytes(url).await?;
        write_file(&path, &bytes).await?;
        Ok(path)
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), ImportError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).await?;
    }
    fs::write(path, contents).await?;
    Ok(())
}

/// Percent-encodes the characters that are not allowed in file names on
/// common filesystems. `%` itself is left alone: URL segments only contain it
/// as the start of an escape.
fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\\' => {
                encoded.push_str(&format!("%{:02X}", c as u32));
            }
            _ => encoded.push(c),
        }
    }
    encoded
}

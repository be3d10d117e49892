use thiserror::Error;

/// Errors that can occur while importing the wiki catalogue
#[derive(Error, Debug)]
pub enum ImportError {
    /// Failed to fetch a page or image (network failure or non-success status)
    #[error("Failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),

    /// A URL from configuration or markup could not be parsed or resolved
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The page does not have the structure its parser expects
    #[error("Unexpected page structure at {url}: {message}")]
    DataFormat { url: String, message: String },

    /// Reading or writing the cache or the output file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the catalogue failed
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl ImportError {
    pub(crate) fn invalid_url(url: &str, source: url::ParseError) -> Self {
        ImportError::InvalidUrl {
            url: url.to_string(),
            source,
        }
    }
}

/// Parses an absolute URL, mapping failures to [`ImportError::InvalidUrl`]
pub fn parse_url(url: &str) -> Result<url::Url, ImportError> {
    url::Url::parse(url).map_err(|e| ImportError::invalid_url(url, e))
}

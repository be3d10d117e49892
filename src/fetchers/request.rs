use crate::error::ImportError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>, user_agent: &str) -> Result<Self, ImportError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch_text(&self, url: &Url) -> Result<String, ImportError> {
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        let html = response.text().await?;
        Ok(html)
    }

    pub async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, ImportError> {
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

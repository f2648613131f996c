// src/fetch/pages.rs

use crate::error::ScrapeError;
use reqwest::Client;
use url::Url;

/// Fetch one profile page and return its markup. No retries; a transport
/// failure fails this page and propagates to the caller.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, ScrapeError> {
    let body = client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}

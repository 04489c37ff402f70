//! SerpApi Google Lens search

use super::{LensError, VisualMatch, VisualSearch};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const SEARCH_URL: &str = "https://serpapi.com/search.json";

pub struct SerpApiClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl SerpApiClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: SEARCH_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    visual_matches: Vec<VisualMatch>,
}

fn parse_search_response(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<Vec<VisualMatch>, LensError> {
    if !status.is_success() {
        return Err(LensError::upstream(format!(
            "Google Lens API call failed: {}",
            status.as_u16()
        )));
    }
    let parsed: SearchResponse = serde_json::from_str(body)
        .map_err(|e| LensError::decode(format!("Unreadable Google Lens response: {e}")))?;
    Ok(parsed.visual_matches)
}

#[async_trait]
impl VisualSearch for SerpApiClient {
    async fn search(&self, image_url: &str) -> Result<Vec<VisualMatch>, LensError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LensError::missing_api_key("SerpApi"))?;

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("engine", "google_lens"),
                ("url", image_url),
                ("api_key", api_key),
            ])
            .send()
            .await
            .map_err(|e| LensError::from_reqwest("SerpApi", &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LensError::network(format!("Failed to read SerpApi response: {e}")))?;
        parse_search_response(status, &body)
    }

    fn name(&self) -> &'static str {
        "serpapi"
    }
}

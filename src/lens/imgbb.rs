//! imgbb image host

use super::{ImageHost, LensError};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;

const UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";

pub struct ImgbbClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl ImgbbClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: UPLOAD_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: Option<String>,
}

/// Pull the public URL out of an upload reply
fn parse_upload_response(status: reqwest::StatusCode, body: &str) -> Result<String, LensError> {
    if !status.is_success() {
        return Err(LensError::upstream(format!(
            "Image upload failed: HTTP {status}: {body}"
        )));
    }
    let parsed: UploadResponse = serde_json::from_str(body)
        .map_err(|e| LensError::decode(format!("Image upload failed: {e} - body: {body}")))?;
    parsed
        .data
        .and_then(|data| data.url)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| LensError::upstream(format!("Image upload failed: {body}")))
}

#[async_trait]
impl ImageHost for ImgbbClient {
    async fn upload(&self, bytes: &[u8], file_name: &str) -> Result<String, LensError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LensError::missing_api_key("imgbb"))?;
        let image = base64::engine::general_purpose::STANDARD.encode(bytes);

        tracing::debug!(file_name, size = bytes.len(), "Uploading image to imgbb");
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .form(&[("image", image.as_str()), ("name", file_name)])
            .send()
            .await
            .map_err(|e| LensError::from_reqwest("imgbb", &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LensError::network(format!("Failed to read imgbb response: {e}")))?;
        parse_upload_response(status, &body)
    }

    fn name(&self) -> &'static str {
        "imgbb"
    }
}

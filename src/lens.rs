//! Reverse image search
//!
//! A photo is published on an image host, and the resulting public URL is
//! passed to a visual search service.

mod error;
mod imgbb;
mod serpapi;

pub use error::{LensError, LensErrorKind};
pub use imgbb::ImgbbClient;
pub use serpapi::SerpApiClient;

use async_trait::async_trait;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

const MAX_RESULTS: usize = 5;
pub const NO_RESULTS: &str = "No relevant Google Lens results found for your image.";

/// Publishes image bytes and returns a public URL
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, bytes: &[u8], file_name: &str) -> Result<String, LensError>;

    fn name(&self) -> &'static str;
}

/// Finds pages visually similar to the image at a URL
#[async_trait]
pub trait VisualSearch: Send + Sync {
    async fn search(&self, image_url: &str) -> Result<Vec<VisualMatch>, LensError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VisualMatch {
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub link: Option<String>,
}

/// Format the top matches as a plain-text report
pub fn format_results(matches: &[VisualMatch]) -> String {
    let entries: Vec<String> = matches
        .iter()
        .take(MAX_RESULTS)
        .map(|m| {
            let title = m.title.as_deref().filter(|t| !t.is_empty()).unwrap_or("No title");
            let snippet = m.snippet.as_deref().unwrap_or("");
            let link = m.link.as_deref().unwrap_or("");
            format!("- {title}\n  {snippet}\n  Link: {link}")
        })
        .collect();

    if entries.is_empty() {
        NO_RESULTS.to_string()
    } else {
        format!("Google Lens Search Results:\n{}", entries.join("\n\n"))
    }
}

/// Runs the two-hop lookup with a deadline on each hop
pub struct LensService {
    host: Arc<dyn ImageHost>,
    search: Arc<dyn VisualSearch>,
    timeout: Duration,
}

impl LensService {
    pub fn new(host: Arc<dyn ImageHost>, search: Arc<dyn VisualSearch>, timeout: Duration) -> Self {
        Self {
            host,
            search,
            timeout,
        }
    }

    /// Publish the image, search for it and return the formatted report
    pub async fn lookup(&self, bytes: &[u8], file_name: &str) -> Result<String, LensError> {
        let url = self
            .timed(self.host.name(), self.host.upload(bytes, file_name))
            .await?;
        let matches = self.timed(self.search.name(), self.search.search(&url)).await?;
        Ok(format_results(&matches))
    }

    async fn timed<T>(
        &self,
        service: &'static str,
        call: impl Future<Output = Result<T, LensError>>,
    ) -> Result<T, LensError> {
        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(LensError::timeout(format!(
                    "{service} did not respond within {}s",
                    self.timeout.as_secs_f32()
                )))
            });
        let duration = start.elapsed();

        match &result {
            Ok(_) => tracing::info!(
                service,
                duration_ms = %duration.as_millis(),
                "Upstream request completed"
            ),
            Err(e) => tracing::error!(
                service,
                duration_ms = %duration.as_millis(),
                error = %e.message,
                transient = e.kind.is_transient(),
                "Upstream request failed"
            ),
        }
        result
    }
}

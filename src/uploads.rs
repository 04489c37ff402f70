//! Upload tokens and the stored-file directory
//!
//! A token is issued when a user asks for an upload link. The matching
//! upload endpoint checks it on arrival and consumes it once the upload has
//! been processed. Tokens are single-use and expire after a configured TTL.

mod files;

pub use files::{FileStore, StoredFile};

use crate::links::LinkBuilder;
use crate::runtime::{StoreError, TokenStore};
use crate::state_machine::Direction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// What an upload token authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum UploadFlow {
    /// File conversion in the given direction (`/upload`)
    Convert { direction: Direction },
    /// Reverse image search (`/lens_upload`)
    Lens,
}

impl UploadFlow {
    /// Lowercase extensions (with leading dot) accepted for this flow
    pub fn accepted_extensions(self) -> &'static [&'static str] {
        match self {
            UploadFlow::Convert { direction } => direction.accepted_extensions(),
            UploadFlow::Lens => &[".jpg", ".jpeg", ".png"],
        }
    }

    fn rejection_message(self) -> &'static str {
        match self {
            UploadFlow::Convert {
                direction: Direction::ToPdf,
            } => "Currently only .txt files supported for Text->PDF.",
            UploadFlow::Convert {
                direction: Direction::ToText,
            } => "Only PDF files supported for PDF->Text.",
            UploadFlow::Lens => "Only .jpg, .jpeg, .png files are supported.",
        }
    }

    fn route(self) -> UploadRoute {
        match self {
            UploadFlow::Convert { .. } => UploadRoute::Upload,
            UploadFlow::Lens => UploadRoute::LensUpload,
        }
    }
}

/// Endpoint a file is being uploaded through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRoute {
    Upload,
    LensUpload,
}

/// Record stored against an issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTicket {
    pub user_id: String,
    pub flow: UploadFlow,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid or missing token.")]
    InvalidToken,
    #[error("{0}")]
    UnsupportedExtension(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Lowercased extension of the client-supplied file name, with leading dot
pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
}

/// Issues, checks and consumes upload tokens
pub struct UploadTickets {
    store: Arc<dyn TokenStore>,
    links: LinkBuilder,
    ttl: Duration,
}

impl UploadTickets {
    pub fn new(store: Arc<dyn TokenStore>, links: LinkBuilder, ttl: Duration) -> Self {
        Self { store, links, ttl }
    }

    /// Issue a fresh token for `user_id` and return the upload URL embedding it
    pub async fn issue(&self, user_id: &str, flow: UploadFlow) -> Result<String, StoreError> {
        let token = uuid::Uuid::new_v4().to_string();
        let ticket = UploadTicket {
            user_id: user_id.to_string(),
            flow,
            issued_at: Utc::now(),
        };
        self.store.set(&token, ticket).await?;

        tracing::info!(user_id, ?flow, "Issued upload token");

        Ok(match flow.route() {
            UploadRoute::Upload => self.links.upload(&token),
            UploadRoute::LensUpload => self.links.lens_upload(&token),
        })
    }

    /// Validate a token for an upload of `file_name` without consuming it.
    ///
    /// Returns the ticket and the lowercased file extension. The token stays
    /// usable until [`UploadTickets::consume`] is called, so a rejected file
    /// or a failed processing step can be retried with the same link.
    pub async fn check(
        &self,
        token: Option<&str>,
        route: UploadRoute,
        file_name: &str,
    ) -> Result<(UploadTicket, String), UploadError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(UploadError::InvalidToken)?;
        let ticket = self
            .store
            .get(token)
            .await?
            .ok_or(UploadError::InvalidToken)?;

        if self.is_expired(&ticket) {
            self.store.delete(token).await?;
            tracing::info!(user_id = %ticket.user_id, "Rejected expired upload token");
            return Err(UploadError::InvalidToken);
        }
        if ticket.flow.route() != route {
            return Err(UploadError::InvalidToken);
        }

        let extension = file_extension(file_name)
            .filter(|ext| ticket.flow.accepted_extensions().contains(&ext.as_str()))
            .ok_or(UploadError::UnsupportedExtension(
                ticket.flow.rejection_message(),
            ))?;

        Ok((ticket, extension))
    }

    /// Remove a checked token once its upload has been fully processed
    pub async fn consume(&self, token: &str) -> Result<UploadTicket, UploadError> {
        // A concurrent upload may have consumed it since the check
        self.store
            .delete(token)
            .await?
            .ok_or(UploadError::InvalidToken)
    }

    /// Drop every token older than the TTL, returning how many were removed
    pub async fn expire(&self) -> Result<usize, StoreError> {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        let cutoff = Utc::now()
            .checked_sub_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.store.remove_issued_before(cutoff).await
    }

    fn is_expired(&self, ticket: &UploadTicket) -> bool {
        Utc::now()
            .signed_duration_since(ticket.issued_at)
            .to_std()
            .is_ok_and(|age| age > self.ttl)
    }
}

//! Text and PDF conversion
//!
//! Both directions are synchronous and CPU bound; callers run them on the
//! blocking pool.

mod extract;
mod render;

pub use extract::pdf_to_text;
pub use render::text_to_pdf;

use crate::state_machine::Direction;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to parse PDF: {0}")]
    Parse(#[source] lopdf::Error),
    #[error("failed to extract text from page {page}: {source}")]
    Extract {
        page: u32,
        #[source]
        source: lopdf::Error,
    },
    #[error("failed to build PDF: {0}")]
    Build(String),
}

/// Run the conversion for `direction` over the uploaded bytes
pub fn convert(direction: Direction, input: &[u8]) -> Result<Vec<u8>, ConvertError> {
    match direction {
        Direction::ToPdf => text_to_pdf(&String::from_utf8_lossy(input)),
        Direction::ToText => pdf_to_text(input).map(String::into_bytes),
    }
}

//! PDF to plain text

use super::ConvertError;
use lopdf::Document;

/// Extract the text of every page, pages separated by newlines
pub fn pdf_to_text(bytes: &[u8]) -> Result<String, ConvertError> {
    let doc = Document::load_mem(bytes).map_err(ConvertError::Parse)?;

    let mut pages = Vec::new();
    for page in doc.get_pages().into_keys() {
        let text = doc
            .extract_text(&[page])
            .map_err(|source| ConvertError::Extract { page, source })?;
        pages.push(text.trim_end_matches('\n').to_string());
    }
    tracing::debug!(pages = pages.len(), "Extracted PDF text");
    Ok(pages.join("\n"))
}

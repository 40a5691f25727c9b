//! PDF document text extraction
//!
//! Call documents and guidelines are often published as PDFs. They are downloaded with
//! the HTTP client and reduced to plain text before extraction.

use crate::fetch::PageContent;
use reqwest::Client;

/// Downloads a PDF and returns its text as document content
///
/// Returns None if the download fails or the document has no extractable text.
pub async fn fetch_pdf_text(client: &Client, url: &str) -> Option<PageContent> {
    tracing::info!("PDF detected, extracting text: {}", url);

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("PDF download failed for {}: {}", url, e);
            return None;
        }
    };

    let response = match response.error_for_status() {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("PDF download failed for {}: {}", url, e);
            return None;
        }
    };

    let final_url = response.url().to_string();
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::warn!("Failed to read PDF body from {}: {}", url, e);
            return None;
        }
    };

    let text = tokio::task::spawn_blocking(move || pdf_bytes_to_text(&bytes))
        .await
        .ok()
        .flatten()?;

    Some(PageContent::document(final_url, text))
}

/// Extracts the text of an in-memory PDF
///
/// Returns None for unreadable documents and for documents without any text.
pub fn pdf_bytes_to_text(bytes: &[u8]) -> Option<String> {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            tracing::debug!("PDF contained no extractable text");
            None
        }
        Err(e) => {
            tracing::warn!("PDF text extraction failed: {}", e);
            None
        }
    }
}

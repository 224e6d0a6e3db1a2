use super::ExtractionError;

/// Document-to-text seam. PDF and OCR decoders live outside this crate and
/// plug in here; an unreadable scan should come back as an empty string.
pub trait ReportTextSource {
    fn extract_text(&self, document: &[u8]) -> Result<String, ExtractionError>;
}

/// Treats the document bytes as UTF-8 text.
pub struct PlainTextSource;

impl ReportTextSource for PlainTextSource {
    fn extract_text(&self, document: &[u8]) -> Result<String, ExtractionError> {
        String::from_utf8(document.to_vec())
            .map_err(|e| ExtractionError::EncodingError(e.to_string()))
    }
}

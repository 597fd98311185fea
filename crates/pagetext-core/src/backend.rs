use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("page index {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
}

impl BackendError {
    /// The bare description without the variant prefix.
    ///
    /// This is what gets embedded in the output for a failed page.
    pub fn message(&self) -> String {
        match self {
            BackendError::OpenError(msg) | BackendError::ExtractionError(msg) => msg.clone(),
            BackendError::PageOutOfRange { .. } => self.to_string(),
        }
    }
}

/// Trait for PDF parsing backends.
///
/// Implementors turn raw document bytes into an opened [`PdfDocument`]; the
/// page iteration, fault isolation and output framing live in
/// [`crate::Extractor`].
pub trait PdfBackend: Send + Sync {
    /// Parse `bytes` as a document. Fails with [`BackendError::OpenError`]
    /// when the bytes are not a readable document at all.
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn PdfDocument>, BackendError>;
}

/// An opened document. Dropping it releases every backend resource.
pub trait PdfDocument {
    /// Number of pages, discovered at open time.
    fn page_count(&self) -> usize;

    /// Extract plain text for the zero-based page `index`.
    fn extract_page_text(&self, index: usize) -> Result<String, BackendError>;
}

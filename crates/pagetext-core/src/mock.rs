//! Mock PDF backend for testing.

use std::sync::{Arc, Mutex};

use crate::backend::{BackendError, PdfBackend, PdfDocument};

/// Scripted behaviour of a single page in a [`MockBackend`] document.
#[derive(Clone, Debug)]
pub enum MockPage {
    /// Extraction succeeds with this text.
    Text(String),
    /// Extraction fails with this message.
    Fail(String),
    /// Extraction panics with this message.
    Panic(String),
}

/// A hand-rolled mock implementing [`PdfBackend`] for tests.
///
/// Every `open()` yields a document with the scripted pages, or fails with
/// the configured message. Page extraction calls are recorded across all
/// documents opened from this backend, see [`extract_calls()`](MockBackend::extract_calls).
pub struct MockBackend {
    pages: Vec<MockPage>,
    open_error: Option<String>,
    calls: Arc<Mutex<Vec<usize>>>,
}

impl MockBackend {
    pub fn new(pages: Vec<MockPage>) -> Self {
        Self {
            pages,
            open_error: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A document whose pages all extract successfully.
    pub fn with_text_pages(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| MockPage::Text(t.to_string())).collect())
    }

    /// A backend that rejects every document with `message`.
    pub fn rejecting(message: &str) -> Self {
        Self {
            open_error: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    /// Page indices passed to `extract_page_text`, in call order.
    pub fn extract_calls(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

impl PdfBackend for MockBackend {
    fn open(&self, _bytes: &[u8]) -> Result<Box<dyn PdfDocument>, BackendError> {
        if let Some(msg) = &self.open_error {
            return Err(BackendError::OpenError(msg.clone()));
        }
        Ok(Box::new(MockDocument {
            pages: self.pages.clone(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct MockDocument {
    pages: Vec<MockPage>,
    calls: Arc<Mutex<Vec<usize>>>,
}

impl PdfDocument for MockDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn extract_page_text(&self, index: usize) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push(index);
        match self.pages.get(index) {
            Some(MockPage::Text(text)) => Ok(text.clone()),
            Some(MockPage::Fail(msg)) => Err(BackendError::ExtractionError(msg.clone())),
            Some(MockPage::Panic(msg)) => panic!("{msg}"),
            None => Err(BackendError::PageOutOfRange {
                index,
                count: self.pages.len(),
            }),
        }
    }
}

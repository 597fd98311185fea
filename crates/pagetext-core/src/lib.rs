use std::path::PathBuf;

use thiserror::Error;

pub mod backend;
pub mod config;
pub mod config_file;
pub mod extractor;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod render;

pub use backend::{BackendError, PdfBackend, PdfDocument};
pub use config::{DEFAULT_PAGE_LIMIT, ExtractConfig, ExtractConfigBuilder};
pub use extractor::{
    Extraction, ExtractionReport, Extractor, ProgressEvent, extract_to_file,
};

/// Errors that abort a whole extraction. Nothing is written when one occurs.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not a readable PDF: {0}")]
    Format(String),
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single page produced no text. Recorded, never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub message: String,
}

/// The result of attempting one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    /// Zero-based page index.
    pub index: usize,
    pub text: Result<String, PageError>,
}

impl PageOutcome {
    /// 1-based page number, as shown in the output markers.
    pub fn page_number(&self) -> usize {
        self.index + 1
    }
}

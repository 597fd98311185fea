use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::backend::{BackendError, PdfBackend, PdfDocument};
use crate::config::ExtractConfig;
use crate::render;
use crate::{ExtractError, PageError, PageOutcome};

/// Progress notifications emitted while an [`Extractor`] runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The document parsed; `effective_count` pages will be attempted.
    Opened {
        total_pages: usize,
        effective_count: usize,
    },
    /// Page `index` (zero-based) of `total` finished.
    Page {
        index: usize,
        total: usize,
        failed: bool,
    },
    /// The rendered output was written to `path`.
    Written { path: PathBuf, bytes: usize },
}

/// Per-page results for the processed prefix of one document.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub total_pages: usize,
    pub pages: Vec<PageOutcome>,
}

impl Extraction {
    /// Framed text for every processed page, in page order.
    pub fn render(&self) -> String {
        render::render_pages(&self.pages)
    }

    /// 1-based numbers of the pages that failed extraction.
    pub fn failed_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.text.is_err())
            .map(PageOutcome::page_number)
            .collect()
    }
}

/// Summary of a completed [`Extractor::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub pages_processed: usize,
    pub total_pages: usize,
    /// 1-based page numbers whose text was replaced by an error description.
    pub failed_pages: Vec<usize>,
    pub destination: PathBuf,
    pub bytes_written: usize,
}

type ProgressFn<'a> = Box<dyn Fn(ProgressEvent) + Send + Sync + 'a>;

/// Extracts the text of a bounded page prefix through a [`PdfBackend`].
///
/// A run reads the source, opens it with the backend, attempts each page in
/// the prefix exactly once and writes the framed output in a single step.
/// Errors opening, parsing or writing abort the run; a failing page is
/// recorded as an [`Err`] outcome and the run continues with the next page.
pub struct Extractor<'a> {
    backend: &'a dyn PdfBackend,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> Extractor<'a> {
    pub fn new(backend: &'a dyn PdfBackend) -> Self {
        Self {
            backend,
            progress: None,
        }
    }

    /// Install a progress callback.
    pub fn with_progress(mut self, progress: impl Fn(ProgressEvent) + Send + Sync + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(progress) = &self.progress {
            progress(event);
        }
    }

    /// Read `config.source_path`, extract, and write `config.destination_path`.
    ///
    /// The destination is only touched once every page has been attempted.
    pub fn run(&self, config: &ExtractConfig) -> Result<ExtractionReport, ExtractError> {
        let extraction = self.extract_path(&config.source_path, config.page_limit)?;
        let rendered = extraction.render();
        write_output(&config.destination_path, &rendered)?;
        self.emit(ProgressEvent::Written {
            path: config.destination_path.clone(),
            bytes: rendered.len(),
        });

        let report = ExtractionReport {
            pages_processed: extraction.pages.len(),
            total_pages: extraction.total_pages,
            failed_pages: extraction.failed_pages(),
            destination: config.destination_path.clone(),
            bytes_written: rendered.len(),
        };
        tracing::info!(
            pages = report.pages_processed,
            failed = report.failed_pages.len(),
            path = %report.destination.display(),
            "extraction complete"
        );
        Ok(report)
    }

    /// Read the document at `path` and extract up to `page_limit` pages.
    /// Nothing is written.
    pub fn extract_path(&self, path: &Path, page_limit: usize) -> Result<Extraction, ExtractError> {
        let bytes = fs::read(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read source document");
        self.extract(&bytes, page_limit)
    }

    /// Open `bytes` and extract up to `page_limit` pages without touching
    /// the filesystem.
    pub fn extract(&self, bytes: &[u8], page_limit: usize) -> Result<Extraction, ExtractError> {
        let document = self
            .backend
            .open(bytes)
            .map_err(|e| ExtractError::Format(e.message()))?;
        let total_pages = document.page_count();
        let effective_count = page_limit.min(total_pages);
        tracing::debug!(total_pages, effective_count, "opened document");
        self.emit(ProgressEvent::Opened {
            total_pages,
            effective_count,
        });

        let pages = (0..effective_count)
            .map(|index| {
                let outcome = extract_page(document.as_ref(), index);
                self.emit(ProgressEvent::Page {
                    index,
                    total: effective_count,
                    failed: outcome.text.is_err(),
                });
                outcome
            })
            .collect();

        Ok(Extraction { total_pages, pages })
    }
}

/// Extract a single page, converting any failure into a recorded outcome.
///
/// A backend panic counts as a page failure too.
fn extract_page(document: &dyn PdfDocument, index: usize) -> PageOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| document.extract_page_text(index)))
        .unwrap_or_else(|payload| {
            Err(BackendError::ExtractionError(format!(
                "backend panicked: {}",
                panic_message(payload.as_ref())
            )))
        });
    let text = match result {
        Ok(text) => {
            tracing::debug!(page = index + 1, chars = text.len(), "extracted page");
            Ok(text)
        }
        Err(e) => {
            tracing::warn!(page = index + 1, error = %e, "page extraction failed");
            Err(PageError {
                message: e.message(),
            })
        }
    };
    PageOutcome { index, text }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}

/// Write `contents` to `path` in one call, creating or truncating it.
///
/// The destination is opened in place, so symlinks are followed and an
/// existing file keeps its permissions and owner.
fn write_output(path: &Path, contents: &str) -> Result<(), ExtractError> {
    fs::write(path, contents.as_bytes()).map_err(|source| ExtractError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Shorthand for `Extractor::new(backend).run(config)`.
pub fn extract_to_file(
    config: &ExtractConfig,
    backend: &dyn PdfBackend,
) -> Result<ExtractionReport, ExtractError> {
    Extractor::new(backend).run(config)
}

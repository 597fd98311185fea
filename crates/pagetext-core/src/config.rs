use std::path::{Path, PathBuf};

use thiserror::Error;

/// Number of leading pages extracted when no limit is configured.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Suffix appended to the source file stem to name the default output file.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_content.txt";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no source document given")]
    MissingSource,
}

/// Everything one extraction run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    /// Upper bound on the number of pages processed. `0` yields empty output.
    pub page_limit: usize,
}

impl ExtractConfig {
    /// Config for `source` with the default destination and page limit.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        let source_path = source.into();
        let destination_path = default_destination(&source_path, None);
        Self {
            source_path,
            destination_path,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination_path = destination.into();
        self
    }

    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }
}

/// `<stem>_content.txt`, placed in `output_dir` or the current directory.
pub fn default_destination(source: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());
    let file_name = format!("{stem}{DEFAULT_OUTPUT_SUFFIX}");
    match output_dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Builder for [`ExtractConfig`] used when values arrive from several layers
/// (CLI flags, environment, config file). Later setters win; unset values
/// fall back to the defaults in [`build()`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct ExtractConfigBuilder {
    source_path: Option<PathBuf>,
    destination_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    page_limit: Option<usize>,
}

impl ExtractConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Explicit destination. Takes precedence over [`output_dir`](Self::output_dir).
    pub fn destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination_path = Some(path.into());
        self
    }

    /// Directory for the derived default destination.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn page_limit(mut self, limit: usize) -> Self {
        self.page_limit = Some(limit);
        self
    }

    /// Set the page limit only if `limit` is `Some`.
    pub fn maybe_page_limit(mut self, limit: Option<usize>) -> Self {
        if limit.is_some() {
            self.page_limit = limit;
        }
        self
    }

    pub fn build(self) -> Result<ExtractConfig, ConfigError> {
        let source_path = self.source_path.ok_or(ConfigError::MissingSource)?;
        let destination_path = self
            .destination_path
            .unwrap_or_else(|| default_destination(&source_path, self.output_dir.as_deref()));
        Ok(ExtractConfig {
            source_path,
            destination_path,
            page_limit: self.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        })
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extract: Option<ExtractSection>,
    pub mupdf: Option<MupdfSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractSection {
    pub page_limit: Option<usize>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MupdfSection {
    /// Fraction of page height from the top to drop as header.
    pub header_exclusion: Option<f32>,
    /// Fraction of page height from the bottom to drop as footer.
    pub footer_exclusion: Option<f32>,
}

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigFile {
    pub fn page_limit(&self) -> Option<usize> {
        self.extract.as_ref().and_then(|e| e.page_limit)
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        self.extract
            .as_ref()
            .and_then(|e| e.output_dir.as_ref())
            .map(PathBuf::from)
    }

    /// The configured header ratio, if set and within `[0.0, 1.0)`.
    pub fn header_exclusion(&self) -> Option<f32> {
        self.mupdf
            .as_ref()
            .and_then(|m| m.header_exclusion)
            .and_then(|r| checked_ratio("mupdf.header_exclusion", r))
    }

    /// The configured footer ratio, if set and within `[0.0, 1.0)`.
    pub fn footer_exclusion(&self) -> Option<f32> {
        self.mupdf
            .as_ref()
            .and_then(|m| m.footer_exclusion)
            .and_then(|r| checked_ratio("mupdf.footer_exclusion", r))
    }
}

/// Whether `ratio` is a usable fraction of page height.
pub fn ratio_in_range(ratio: f32) -> bool {
    (0.0..1.0).contains(&ratio)
}

fn checked_ratio(key: &str, ratio: f32) -> Option<f32> {
    if ratio_in_range(ratio) {
        Some(ratio)
    } else {
        tracing::warn!(key, ratio, "ignoring exclusion ratio outside 0.0 to 1.0");
        None
    }
}

/// Platform config directory path: `<config_dir>/pagetext/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pagetext").join("config.toml"))
}

/// Load config by cascading CWD `.pagetext.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pagetext.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    if !path.exists() {
        return None;
    }
    match load_explicit(path) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring config file");
            None
        }
    }
}

/// Load a config the user named explicitly. Unlike [`load_from_path`],
/// a missing or malformed file is an error.
pub fn load_explicit(path: &Path) -> Result<ConfigFile, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        extract: Some(ExtractSection {
            page_limit: overlay.page_limit().or_else(|| base.page_limit()),
            output_dir: overlay
                .extract
                .as_ref()
                .and_then(|e| e.output_dir.clone())
                .or_else(|| base.extract.as_ref().and_then(|e| e.output_dir.clone())),
        }),
        mupdf: Some(MupdfSection {
            header_exclusion: overlay
                .header_exclusion()
                .or_else(|| base.header_exclusion()),
            footer_exclusion: overlay
                .footer_exclusion()
                .or_else(|| base.footer_exclusion()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_limit_round_trip_toml() {
        let config = ConfigFile {
            extract: Some(ExtractSection {
                page_limit: Some(12),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.page_limit(), Some(12));
    }

    #[test]
    fn partial_sections_deserialize() {
        let toml_str = "[mupdf]\nfooter_exclusion = 0.05\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert!(parsed.extract.is_none());
        assert_eq!(parsed.footer_exclusion(), Some(0.05));
        assert_eq!(parsed.header_exclusion(), None);
    }

    #[test]
    fn out_of_range_ratios_are_ignored() {
        let toml_str = "[mupdf]\nheader_exclusion = 5.0\nfooter_exclusion = -0.2\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.header_exclusion(), None);
        assert_eq!(parsed.footer_exclusion(), None);

        let parsed: ConfigFile = toml::from_str("[mupdf]\nheader_exclusion = 1.0\n").unwrap();
        assert_eq!(parsed.header_exclusion(), None);
    }

    #[test]
    fn ratio_bounds() {
        assert!(ratio_in_range(0.0));
        assert!(ratio_in_range(0.99));
        assert!(!ratio_in_range(1.0));
        assert!(!ratio_in_range(-0.01));
        assert!(!ratio_in_range(f32::NAN));
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            extract: Some(ExtractSection {
                page_limit: Some(50),
                output_dir: Some("/base".to_string()),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            extract: Some(ExtractSection {
                page_limit: Some(5),
                output_dir: None,
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        assert_eq!(merged.page_limit(), Some(5));
        assert_eq!(merged.output_dir(), Some(PathBuf::from("/base")));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            mupdf: Some(MupdfSection {
                header_exclusion: Some(0.04),
                footer_exclusion: None,
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.header_exclusion(), Some(0.04));
        assert_eq!(merged.footer_exclusion(), None);
        assert_eq!(merged.page_limit(), None);
    }

    #[test]
    fn load_from_path_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("nope.toml")).is_none());
    }

    #[test]
    fn load_from_path_malformed_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[extract\npage_limit = ").unwrap();
        assert!(load_from_path(&path).is_none());
        assert!(matches!(
            load_explicit(&path),
            Err(ConfigFileError::Parse { .. })
        ));
    }

    #[test]
    fn load_explicit_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_explicit(&dir.path().join("nope.toml")),
            Err(ConfigFileError::Read { .. })
        ));
    }
}

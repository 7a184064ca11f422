//! Persistent analysis settings.
//!
//! Settings live in `config.json` under the platform data directory
//! (`~/.local/share/contingent` on Linux). A missing file means defaults; a
//! file that exists but does not parse is an error, so typos are not
//! silently ignored. Command-line flags override whatever is loaded here.

use crate::analyser::logic::{AnalysisOptions, BatchOrder, CleaningOptions, Correction};
use crate::error::{ContingentError, Result, ResultExt as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub alpha: f64,
    pub yates_correction: bool,
    pub posthoc_correction: Correction,
    /// Summarise batches on the rayon pool.
    pub parallel: bool,
    pub batch_order: BatchOrder,
    pub cleaning: CleaningOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let options = AnalysisOptions::default();
        Self {
            alpha: options.alpha,
            yates_correction: options.yates_correction,
            posthoc_correction: options.posthoc_correction,
            parallel: false,
            batch_order: BatchOrder::default(),
            cleaning: CleaningOptions::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            alpha: self.alpha,
            yates_correction: self.yates_correction,
            posthoc_correction: self.posthoc_correction,
        }
    }

    /// # Errors
    ///
    /// Rejects an alpha outside `(0, 1)` and a blank missing label.
    pub fn validate(&self) -> Result<()> {
        self.analysis_options()
            .validate()
            .map_err(|e| ContingentError::Config(e.to_string()))?;
        if self.cleaning.missing_label.trim().is_empty() {
            return Err(ContingentError::Config(
                "cleaning.missing_label must not be blank".to_owned(),
            ));
        }
        Ok(())
    }
}

/// `<data dir>/contingent/config.json`
pub fn get_config_path() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .ok_or_else(|| ContingentError::Config("Failed to determine data directory".to_owned()))?;
    Ok(base.join("contingent").join(CONFIG_FILE_NAME))
}

/// Reads and validates a config file.
///
/// # Errors
///
/// Fails if the file cannot be read, is not valid JSON, or holds invalid
/// values.
pub fn load_from(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: AnalysisConfig = serde_json::from_str(&content)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "Loaded analysis config");
    Ok(config)
}

/// Loads `explicit` if given, otherwise the default config file if it
/// exists, otherwise defaults.
///
/// # Errors
///
/// See [`load_from`].
pub fn load_or_default(explicit: Option<&Path>) -> Result<AnalysisConfig> {
    if let Some(path) = explicit {
        return load_from(path);
    }
    match get_config_path() {
        Ok(path) if path.exists() => load_from(&path),
        _ => Ok(AnalysisConfig::default()),
    }
}

/// Writes `config` as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Fails on invalid values or I/O errors.
pub fn save_to(config: &AnalysisConfig, path: &Path) -> Result<()> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.alpha, 0.05);
        assert!(config.yates_correction);
        assert_eq!(config.posthoc_correction, Correction::Bonferroni);
        assert_eq!(config.batch_order, BatchOrder::FirstOccurrence);
        assert!(!config.parallel);
    }

    #[test]
    fn test_partial_file_fills_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"{ "alpha": 0.01, "posthoc_correction": "holm", "batch_order": "sorted_key" }"#,
        )?;

        let config = load_from(&path)?;
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.posthoc_correction, Correction::Holm);
        assert_eq!(config.batch_order, BatchOrder::SortedKey);
        assert!(config.yates_correction);
        assert_eq!(config.cleaning, CleaningOptions::default());
        Ok(())
    }

    #[test]
    fn test_save_and_reload() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut config = AnalysisConfig::default();
        config.parallel = true;
        config.cleaning.missing_label = "Unknown".to_owned();

        save_to(&config, &path)?;
        assert_eq!(load_or_default(Some(&path))?, config);
        Ok(())
    }

    #[test]
    fn test_invalid_values_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(CONFIG_FILE_NAME);

        std::fs::write(&path, r#"{ "alpha": 1.0 }"#)?;
        assert!(matches!(load_from(&path), Err(ContingentError::Config(_))));

        std::fs::write(&path, r#"{ "cleaning": { "missing_label": "  " } }"#)?;
        assert!(load_from(&path).is_err());

        std::fs::write(&path, "{ not json")?;
        assert!(load_from(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = load_or_default(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

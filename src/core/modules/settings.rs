//! Per-module settings and the configuration slice each module receives.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::results::ScreenshotConfidence;
use super::ModuleKind;
use crate::error::ConfigError;

/// Settings for exact/near-exact duplicate detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicatesSettings {
    /// Comparison threshold (lower = stricter, 0-64)
    pub threshold: u32,
    /// Hash algorithm name, module-defined
    pub algorithm: Option<String>,
}

impl Default for DuplicatesSettings {
    fn default() -> Self {
        Self {
            threshold: 8,
            algorithm: None,
        }
    }
}

/// Settings for similar photo detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarSettings {
    /// Minimum hamming distance to include (excludes exact matches)
    pub min_distance: u32,
    /// Maximum hamming distance to include
    pub max_distance: u32,
    pub algorithm: Option<String>,
}

impl Default for SimilarSettings {
    fn default() -> Self {
        Self {
            min_distance: 5,
            max_distance: 15,
            algorithm: None,
        }
    }
}

/// Settings for large file detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LargeFilesSettings {
    pub min_size_mb: u64,
    pub max_results: usize,
}

impl Default for LargeFilesSettings {
    fn default() -> Self {
        Self {
            min_size_mb: 10,
            max_results: 50,
        }
    }
}

impl LargeFilesSettings {
    pub fn min_size_bytes(&self) -> u64 {
        self.min_size_mb * 1024 * 1024
    }
}

/// Settings for screenshot detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotSettings {
    /// Lowest confidence still reported
    pub min_confidence: ScreenshotConfidence,
    /// Also group byte-identical screenshots
    pub find_duplicates: bool,
}

impl Default for ScreenshotSettings {
    fn default() -> Self {
        Self {
            min_confidence: ScreenshotConfidence::Medium,
            find_duplicates: true,
        }
    }
}

/// Settings for unorganized file detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnorganizedSettings {
    pub check_root: bool,
    pub check_date_pattern: bool,
    pub check_generic_names: bool,
    /// Minimum folder depth to be considered "organized"
    pub min_depth: usize,
}

impl Default for UnorganizedSettings {
    fn default() -> Self {
        Self {
            check_root: true,
            check_date_pattern: true,
            check_generic_names: true,
            min_depth: 2,
        }
    }
}

/// Optional settings fragment for every module.
///
/// Missing fragments fall back to the module defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSettings {
    pub duplicates: DuplicatesSettings,
    pub similar: SimilarSettings,
    pub large_files: LargeFilesSettings,
    pub screenshots: ScreenshotSettings,
    pub unorganized: UnorganizedSettings,
}

impl ModuleSettings {
    /// Reject settings no module could run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duplicates.threshold > 64 {
            return Err(ConfigError::InvalidSetting {
                module: ModuleKind::Duplicates,
                reason: format!("threshold {} (must be 0-64)", self.duplicates.threshold),
            });
        }
        if self.similar.min_distance > self.similar.max_distance {
            return Err(ConfigError::InvalidSetting {
                module: ModuleKind::Similar,
                reason: format!(
                    "min_distance {} is above max_distance {}",
                    self.similar.min_distance, self.similar.max_distance
                ),
            });
        }
        if self.similar.max_distance > 64 {
            return Err(ConfigError::InvalidSetting {
                module: ModuleKind::Similar,
                reason: format!("max_distance {} (must be 0-64)", self.similar.max_distance),
            });
        }
        if self.large_files.max_results == 0 {
            return Err(ConfigError::InvalidSetting {
                module: ModuleKind::LargeFiles,
                reason: "max_results must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// The configuration slice handed to one module collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "module", rename_all = "snake_case")]
pub enum ModuleConfig {
    Duplicates {
        paths: Vec<PathBuf>,
        settings: DuplicatesSettings,
    },
    Similar {
        paths: Vec<PathBuf>,
        settings: SimilarSettings,
    },
    LargeFiles {
        paths: Vec<PathBuf>,
        settings: LargeFilesSettings,
    },
    Screenshots {
        paths: Vec<PathBuf>,
        settings: ScreenshotSettings,
    },
    Unorganized {
        paths: Vec<PathBuf>,
        settings: UnorganizedSettings,
    },
}

impl ModuleConfig {
    pub fn kind(&self) -> ModuleKind {
        match self {
            Self::Duplicates { .. } => ModuleKind::Duplicates,
            Self::Similar { .. } => ModuleKind::Similar,
            Self::LargeFiles { .. } => ModuleKind::LargeFiles,
            Self::Screenshots { .. } => ModuleKind::Screenshots,
            Self::Unorganized { .. } => ModuleKind::Unorganized,
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Self::Duplicates { paths, .. }
            | Self::Similar { paths, .. }
            | Self::LargeFiles { paths, .. }
            | Self::Screenshots { paths, .. }
            | Self::Unorganized { paths, .. } => paths,
        }
    }

    /// JSON form of the settings only, as stored in history
    pub fn settings_json(&self) -> String {
        let value = match self {
            Self::Duplicates { settings, .. } => serde_json::to_value(settings),
            Self::Similar { settings, .. } => serde_json::to_value(settings),
            Self::LargeFiles { settings, .. } => serde_json::to_value(settings),
            Self::Screenshots { settings, .. } => serde_json::to_value(settings),
            Self::Unorganized { settings, .. } => serde_json::to_value(settings),
        };
        value
            .map(|v| v.to_string())
            .unwrap_or_else(|_| "{}".to_string())
    }
}

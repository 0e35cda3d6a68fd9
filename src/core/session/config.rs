//! Scan configuration submitted to the session controller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::modules::{ModuleKind, ModuleSettings};
use crate::error::ConfigError;

/// What to scan and with which modules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Folders to scan, without duplicates
    pub paths: Vec<PathBuf>,
    /// Enabled modules; iteration follows execution order
    pub modules: BTreeSet<ModuleKind>,
    #[serde(default)]
    pub settings: ModuleSettings,
    /// Treat a module still running after this long as errored
    #[serde(default)]
    pub module_timeout_ms: Option<u64>,
}

impl ScanConfig {
    pub fn new(paths: Vec<PathBuf>, modules: impl IntoIterator<Item = ModuleKind>) -> Self {
        let mut config = Self {
            paths,
            modules: modules.into_iter().collect(),
            settings: ModuleSettings::default(),
            module_timeout_ms: None,
        };
        config.dedup_paths();
        config
    }

    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Drop repeated paths, keeping the first occurrence
    pub fn dedup_paths(&mut self) {
        let mut seen = BTreeSet::new();
        self.paths.retain(|p| seen.insert(p.clone()));
    }

    /// Enabled modules in execution order
    pub fn enabled_modules(&self) -> Vec<ModuleKind> {
        self.modules.iter().copied().collect()
    }

    pub fn module_timeout(&self) -> Option<Duration> {
        self.module_timeout_ms.map(Duration::from_millis)
    }

    /// Paths as display strings, as stored in history
    pub fn path_strings(&self) -> Vec<String> {
        self.paths.iter().map(|p| p.display().to_string()).collect()
    }

    /// Check the configuration without touching the filesystem
    pub fn validate_shape(&self) -> Result<(), ConfigError> {
        if self.paths.is_empty() {
            return Err(ConfigError::NoPaths);
        }
        if self.modules.is_empty() {
            return Err(ConfigError::NoModules);
        }
        self.settings.validate()
    }

    /// Full validation: shape plus every path being a readable folder
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_shape()?;
        for path in &self.paths {
            check_directory(path)?;
        }
        Ok(())
    }
}

fn check_directory(path: &Path) -> Result<(), ConfigError> {
    let metadata = fs::metadata(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigError::PathNotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    if !metadata.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    fs::read_dir(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Builder for [`ScanConfig`]
#[derive(Debug, Default)]
pub struct ScanConfigBuilder {
    paths: Vec<PathBuf>,
    modules: BTreeSet<ModuleKind>,
    settings: ModuleSettings,
    module_timeout_ms: Option<u64>,
}

impl ScanConfigBuilder {
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.paths.extend(paths);
        self
    }

    pub fn module(mut self, kind: ModuleKind) -> Self {
        self.modules.insert(kind);
        self
    }

    pub fn modules(mut self, kinds: impl IntoIterator<Item = ModuleKind>) -> Self {
        self.modules.extend(kinds);
        self
    }

    pub fn settings(mut self, settings: ModuleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn module_timeout(mut self, timeout: Duration) -> Self {
        self.module_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn build(self) -> ScanConfig {
        let mut config = ScanConfig {
            paths: self.paths,
            modules: self.modules,
            settings: self.settings,
            module_timeout_ms: self.module_timeout_ms,
        };
        config.dedup_paths();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn paths_are_deduplicated_in_order() {
        let config = ScanConfig::builder()
            .path("/b")
            .path("/a")
            .path("/b")
            .module(ModuleKind::Duplicates)
            .build();
        assert_eq!(config.paths, vec![PathBuf::from("/b"), PathBuf::from("/a")]);
    }

    #[test]
    fn empty_paths_rejected() {
        let config = ScanConfig::new(Vec::new(), [ModuleKind::Duplicates]);
        assert!(matches!(config.validate(), Err(ConfigError::NoPaths)));
    }

    #[test]
    fn empty_modules_rejected() {
        let temp = TempDir::new().unwrap();
        let config = ScanConfig::new(vec![temp.path().to_path_buf()], []);
        assert!(matches!(config.validate(), Err(ConfigError::NoModules)));
    }

    #[test]
    fn missing_path_rejected() {
        let config = ScanConfig::new(
            vec![PathBuf::from("/nonexistent/path/that/does/not/exist")],
            [ModuleKind::LargeFiles],
        );
        assert!(matches!(config.validate(), Err(ConfigError::PathNotFound { .. })));
    }

    #[test]
    fn file_path_rejected() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("photo.jpg");
        File::create(&file).unwrap();

        let config = ScanConfig::new(vec![file], [ModuleKind::LargeFiles]);
        assert!(matches!(config.validate(), Err(ConfigError::NotADirectory { .. })));
    }

    #[test]
    fn directory_accepted() {
        let temp = TempDir::new().unwrap();
        let config = ScanConfig::new(vec![temp.path().to_path_buf()], [ModuleKind::LargeFiles]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ScanConfig = serde_json::from_str(
            r#"{"paths": ["/photos"], "modules": ["unorganized", "duplicates"]}"#,
        )
        .unwrap();
        assert_eq!(
            config.enabled_modules(),
            vec![ModuleKind::Duplicates, ModuleKind::Unorganized]
        );
        assert_eq!(config.module_timeout(), None);
        assert_eq!(config.settings, ModuleSettings::default());
    }
}

//! Screenshot detection from file and folder names.

use std::path::Path;
use std::time::Instant;
use tracing::info;

use super::duplicates::group_identical;
use super::walk::{collect_files, extension, WalkedFile};
use crate::core::cancel::CancellationToken;
use crate::core::modules::{
    ModuleCollaborator, ModuleConfig, ModuleKind, ModuleResult, ScreenshotConfidence,
    ScreenshotInfo, ScreenshotResult,
};
use crate::core::progress::ProgressSink;
use crate::error::ModuleError;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "heic", "heif", "webp", "bmp", "gif", "tiff", "tif"];

/// Common screenshot filename patterns
const SCREENSHOT_PATTERNS: &[&str] = &[
    "screenshot",
    "screen shot",
    "simulator screen shot",
    "capture",
    "cleanshot",
    "snagit",
    "monosnap",
    "skitch",
    "snip",
    "grab",
];

const SCREENSHOT_FOLDERS: &[&str] = &["screenshots", "screen shots", "screenshot"];

/// Finds screenshots and, optionally, identical copies of them
#[derive(Debug, Default)]
pub struct ScreenshotsModule;

impl ScreenshotsModule {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleCollaborator for ScreenshotsModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Screenshots
    }

    fn execute(
        &self,
        config: &ModuleConfig,
        progress: &ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<ModuleResult, ModuleError> {
        let ModuleConfig::Screenshots { paths, settings } = config else {
            return Err(ModuleError::Failed(format!(
                "screenshots module received {} configuration",
                config.kind()
            )));
        };

        let start = Instant::now();
        let (files, _) = collect_files(paths, "walking", progress, cancel, is_image)?;
        let total_files_scanned = files.len();

        let detect_stage = if settings.find_duplicates {
            progress.stage(0.0, 50.0)
        } else {
            progress.clone()
        };

        let mut screenshots = Vec::new();
        let mut matched: Vec<WalkedFile> = Vec::new();
        for (done, file) in files.into_iter().enumerate() {
            if done % 100 == 0 && cancel.is_cancelled() {
                return Err(ModuleError::Cancelled);
            }
            if let Some((confidence, reason)) = detect(&file.path) {
                if confidence >= settings.min_confidence {
                    screenshots.push(ScreenshotInfo {
                        path: file.display(),
                        size_bytes: file.size,
                        confidence,
                        detection_reason: reason,
                    });
                    matched.push(file);
                }
            }
            detect_stage.report_fraction(
                "detecting",
                done + 1,
                total_files_scanned,
                format!("Checked {} of {}", done + 1, total_files_scanned),
            );
        }
        detect_stage.report_fraction("detecting", total_files_scanned, total_files_scanned, "");

        let duplicate_groups = if settings.find_duplicates {
            group_identical(matched, "hashing", &progress.stage(50.0, 100.0), cancel)?
        } else {
            Vec::new()
        };

        screenshots.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes).then_with(|| a.path.cmp(&b.path)));
        let total_size_bytes = screenshots.iter().map(|s| s.size_bytes).sum();

        info!(
            screenshots = screenshots.len(),
            duplicate_groups = duplicate_groups.len(),
            "Screenshot scan finished"
        );

        Ok(ModuleResult::Screenshots(ScreenshotResult {
            screenshots,
            duplicate_groups,
            total_size_bytes,
            total_files_scanned,
            duration_ms: start.elapsed().as_millis() as u64,
        }))
    }
}

fn is_image(path: &Path) -> bool {
    extension(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Classify a path. Filename patterns beat folder names.
fn detect(path: &Path) -> Option<(ScreenshotConfidence, String)> {
    let filename = path.file_name()?.to_str()?.to_lowercase();

    if let Some(pattern) = SCREENSHOT_PATTERNS.iter().find(|p| filename.contains(*p)) {
        return Some((
            ScreenshotConfidence::Medium,
            format!("Filename contains '{}' pattern", pattern),
        ));
    }

    let folder = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(|n| n.to_lowercase())?;
    if SCREENSHOT_FOLDERS.contains(&folder.as_str()) {
        return Some((
            ScreenshotConfidence::Low,
            format!("Stored in '{}' folder", folder),
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::modules::ScreenshotSettings;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detect_from_filename() {
        let (confidence, reason) = detect(Path::new("/pics/Screenshot 2024-01-01.png")).unwrap();
        assert_eq!(confidence, ScreenshotConfidence::Medium);
        assert!(reason.contains("screenshot"));

        assert_eq!(
            detect(Path::new("/pics/CleanShot_001.png")).map(|d| d.0),
            Some(ScreenshotConfidence::Medium)
        );
        assert!(detect(Path::new("/pics/IMG_1234.jpg")).is_none());
    }

    #[test]
    fn test_detect_from_folder() {
        let (confidence, _) = detect(Path::new("/pics/Screenshots/IMG_1.png")).unwrap();
        assert_eq!(confidence, ScreenshotConfidence::Low);
    }

    fn run(dir: &TempDir, settings: ScreenshotSettings) -> ScreenshotResult {
        let config = ModuleConfig::Screenshots {
            paths: vec![dir.path().to_path_buf()],
            settings,
        };
        match ScreenshotsModule::new()
            .execute(
                &config,
                &ProgressSink::null(ModuleKind::Screenshots),
                &CancellationToken::new(),
            )
            .unwrap()
        {
            ModuleResult::Screenshots(result) => result,
            other => panic!("unexpected result {:?}", other.kind()),
        }
    }

    #[test]
    fn test_scan_filters_by_confidence_and_groups_copies() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("Screenshots")).unwrap();
        fs::write(dir.path().join("Screenshot 1.png"), b"pixels").unwrap();
        fs::write(dir.path().join("Screenshot 1 copy.png"), b"pixels").unwrap();
        fs::write(dir.path().join("Screenshots").join("a.png"), b"other").unwrap();
        fs::write(dir.path().join("holiday.jpg"), b"beach").unwrap();

        let result = run(&dir, ScreenshotSettings::default());
        assert_eq!(result.total_files_scanned, 4);
        assert_eq!(result.screenshots.len(), 2);
        assert_eq!(result.duplicate_groups.len(), 1);
        assert_eq!(result.duplicate_groups[0].duplicate_size_bytes, 6);

        let all = run(
            &dir,
            ScreenshotSettings {
                min_confidence: ScreenshotConfidence::Low,
                find_duplicates: false,
            },
        );
        assert_eq!(all.screenshots.len(), 3);
        assert!(all.duplicate_groups.is_empty());
    }
}

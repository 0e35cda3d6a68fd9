//! Unorganized file detection.
//!
//! A media file is unorganized when it sits too close to the scan root,
//! has no date anywhere in its relative path, or keeps a camera-generated
//! name.

use regex::Regex;
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

use super::walk::{collect_files, is_media_file, WalkedFile};
use crate::core::cancel::CancellationToken;
use crate::core::modules::{
    ModuleCollaborator, ModuleConfig, ModuleKind, ModuleResult, ReasonSummary, UnorganizedFile,
    UnorganizedReason, UnorganizedResult, UnorganizedSettings,
};
use crate::core::progress::ProgressSink;
use crate::error::ModuleError;

const DATE_PATTERN: &str = r"(?:19|20)\d{2}[-_/]?\d{0,2}[-_/]?\d{0,2}";
const GENERIC_NAME_PATTERN: &str = r"(?i)^(IMG|DSC|DCIM|P|DSCN|DSCF|SAM|MOV|VID|MVI|Screenshot|Screen Shot|Untitled|Photo|Image|Picture)[-_]?\d*";

const REASON_ORDER: [UnorganizedReason; 4] = [
    UnorganizedReason::InRoot,
    UnorganizedReason::ShallowFolder,
    UnorganizedReason::NoDatePattern,
    UnorganizedReason::GenericName,
];

/// Flags media files that are not filed into a dated folder structure
#[derive(Debug)]
pub struct UnorganizedModule {
    date_pattern: Regex,
    generic_name: Regex,
}

impl UnorganizedModule {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            date_pattern: Regex::new(DATE_PATTERN)?,
            generic_name: Regex::new(GENERIC_NAME_PATTERN)?,
        })
    }

    fn reasons(&self, file: &WalkedFile, settings: &UnorganizedSettings) -> Vec<UnorganizedReason> {
        let mut reasons = Vec::new();
        let depth = file.depth();

        if settings.check_root && depth == 0 {
            reasons.push(UnorganizedReason::InRoot);
        } else if depth < settings.min_depth {
            reasons.push(UnorganizedReason::ShallowFolder);
        }

        if settings.check_date_pattern {
            let relative = file.path.strip_prefix(&file.root).unwrap_or(&file.path);
            if !self.date_pattern.is_match(&relative.to_string_lossy()) {
                reasons.push(UnorganizedReason::NoDatePattern);
            }
        }

        if settings.check_generic_names {
            if let Some(stem) = file.path.file_stem().and_then(|s| s.to_str()) {
                if self.generic_name.is_match(stem) {
                    reasons.push(UnorganizedReason::GenericName);
                }
            }
        }

        reasons
    }
}

impl ModuleCollaborator for UnorganizedModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Unorganized
    }

    fn execute(
        &self,
        config: &ModuleConfig,
        progress: &ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<ModuleResult, ModuleError> {
        let ModuleConfig::Unorganized { paths, settings } = config else {
            return Err(ModuleError::Failed(format!(
                "unorganized module received {} configuration",
                config.kind()
            )));
        };

        let start = Instant::now();
        let (candidates, _) = collect_files(paths, "walking", progress, cancel, is_media_file)?;
        let total_files_scanned = candidates.len();

        let mut files = Vec::new();
        for (done, file) in candidates.iter().enumerate() {
            if done % 100 == 0 {
                if cancel.is_cancelled() {
                    return Err(ModuleError::Cancelled);
                }
                progress.report_fraction(
                    "analyzing",
                    done,
                    total_files_scanned,
                    format!("Analyzed {} of {}", done, total_files_scanned),
                );
            }

            let reasons = self.reasons(file, settings);
            if !reasons.is_empty() {
                files.push(UnorganizedFile {
                    path: file.display(),
                    size_bytes: file.size,
                    reasons,
                    folder_depth: file.depth(),
                });
            }
        }
        progress.report("analyzing", 100.0, "Analysis complete");

        let total_size_bytes = files.iter().map(|f| f.size_bytes).sum();
        let by_reason = summarize(&files);

        info!(
            unorganized = files.len(),
            scanned = total_files_scanned,
            "Unorganized scan finished"
        );

        Ok(ModuleResult::Unorganized(UnorganizedResult {
            files,
            total_files_scanned,
            total_size_bytes,
            by_reason,
            duration_ms: start.elapsed().as_millis() as u64,
        }))
    }
}

fn summarize(files: &[UnorganizedFile]) -> Vec<ReasonSummary> {
    let mut counts: HashMap<UnorganizedReason, (usize, u64)> = HashMap::new();
    for file in files {
        for reason in &file.reasons {
            let entry = counts.entry(*reason).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += file.size_bytes;
        }
    }

    REASON_ORDER
        .iter()
        .filter_map(|reason| {
            counts.get(reason).map(|(count, size)| ReasonSummary {
                reason: *reason,
                count: *count,
                size_bytes: *size,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn walked(root: &str, path: &str) -> WalkedFile {
        WalkedFile {
            path: PathBuf::from(path),
            root: PathBuf::from(root),
            size: 4,
            modified: 0,
        }
    }

    fn run(dir: &TempDir) -> UnorganizedResult {
        let config = ModuleConfig::Unorganized {
            paths: vec![dir.path().to_path_buf()],
            settings: UnorganizedSettings::default(),
        };
        match UnorganizedModule::new()
            .unwrap()
            .execute(
                &config,
                &ProgressSink::null(ModuleKind::Unorganized),
                &CancellationToken::new(),
            )
            .unwrap()
        {
            ModuleResult::Unorganized(result) => result,
            other => panic!("unexpected result {:?}", other.kind()),
        }
    }

    #[test]
    fn test_reasons() {
        let module = UnorganizedModule::new().unwrap();
        let settings = UnorganizedSettings::default();

        let root = module.reasons(&walked("/photos", "/photos/IMG_001.jpg"), &settings);
        assert_eq!(
            root,
            vec![
                UnorganizedReason::InRoot,
                UnorganizedReason::NoDatePattern,
                UnorganizedReason::GenericName
            ]
        );

        let shallow = module.reasons(&walked("/photos", "/photos/2024/beach.jpg"), &settings);
        assert_eq!(shallow, vec![UnorganizedReason::ShallowFolder]);

        let organized = module.reasons(&walked("/photos", "/photos/2024/01/beach.jpg"), &settings);
        assert!(organized.is_empty());
    }

    #[test]
    fn test_scan_empty() {
        let temp = TempDir::new().unwrap();
        let result = run(&temp);
        assert_eq!(result.total_files_scanned, 0);
        assert!(result.files.is_empty());
    }

    #[test]
    fn test_scan_finds_root_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("IMG_001.jpg"), b"test").unwrap();

        let result = run(&temp);
        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].reasons.contains(&UnorganizedReason::InRoot));
        assert!(result.files[0].reasons.contains(&UnorganizedReason::GenericName));
        assert_eq!(result.by_reason[0].reason, UnorganizedReason::InRoot);
        assert_eq!(result.total_size_bytes, 4);
    }

    #[test]
    fn test_scan_organized_files_not_flagged() {
        let temp = TempDir::new().unwrap();
        let organized_dir = temp.path().join("2024").join("01");
        fs::create_dir_all(&organized_dir).unwrap();
        fs::write(organized_dir.join("vacation_photo.jpg"), b"test").unwrap();

        let result = run(&temp);
        assert_eq!(result.total_files_scanned, 1);
        assert!(result.files.is_empty());
    }
}

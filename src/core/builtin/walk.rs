//! Directory walking shared by the built-in modules.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, UNIX_EPOCH};
use tracing::debug;
use walkdir::WalkDir;

use crate::core::cancel::CancellationToken;
use crate::core::progress::ProgressSink;
use crate::error::ModuleError;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "tif", "heic", "heif", "raw", "cr2",
    "nef", "dng", "arw", "raf", "mp4", "mov", "avi", "mkv", "flv", "wmv", "webm", "m4v",
];

/// A regular file found under one of the scan roots
#[derive(Debug, Clone)]
pub(crate) struct WalkedFile {
    pub path: PathBuf,
    pub root: PathBuf,
    pub size: u64,
    /// Unix seconds, 0 when unknown
    pub modified: u64,
}

impl WalkedFile {
    /// Folders between the scan root and the file
    pub fn depth(&self) -> usize {
        self.path
            .parent()
            .and_then(|p| p.strip_prefix(&self.root).ok())
            .map(|relative| relative.components().count())
            .unwrap_or(0)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string()
    }

    pub fn display(&self) -> String {
        self.path.display().to_string()
    }
}

pub(crate) fn is_media_file(path: &Path) -> bool {
    extension(path).is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str()))
}

/// Lowercase extension
pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Walk every root and collect the files `keep` accepts.
///
/// Unreadable entries are skipped. Reports `phase` progress at 0% with a
/// running count, since the total is unknown until the walk ends. Returns
/// the kept files and the number of files visited.
pub(crate) fn collect_files<F>(
    roots: &[PathBuf],
    phase: &str,
    progress: &ProgressSink,
    cancel: &CancellationToken,
    keep: F,
) -> Result<(Vec<WalkedFile>, usize), ModuleError>
where
    F: Fn(&Path) -> bool,
{
    let mut files = Vec::new();
    let mut visited = 0usize;
    let mut last_progress = Instant::now();

    for root in roots {
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if cancel.is_cancelled() {
                return Err(ModuleError::Cancelled);
            }
            if !entry.file_type().is_file() {
                continue;
            }
            visited += 1;

            if visited % 100 == 0 || last_progress.elapsed() >= PROGRESS_INTERVAL {
                progress.report(phase, 0.0, format!("Found {} files", visited));
                last_progress = Instant::now();
            }

            let path = entry.path();
            if !keep(path) {
                continue;
            }

            let Ok(metadata) = fs::metadata(path) else {
                debug!(path = %path.display(), "Skipping unreadable file");
                continue;
            };

            files.push(WalkedFile {
                path: path.to_path_buf(),
                root: root.clone(),
                size: metadata.len(),
                modified: metadata
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs())
                    .unwrap_or(0),
            });
        }
    }

    Ok((files, visited))
}

//! Large file detection.
//!
//! Only filesystem metadata is read, never file contents. The largest
//! `max_results` files are kept in a bounded min-heap.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;
use tracing::info;

use super::walk::{collect_files, extension, is_media_file, WalkedFile};
use crate::core::cancel::CancellationToken;
use crate::core::modules::{
    LargeFileInfo, LargeFilesResult, LargeFilesSettings, ModuleCollaborator, ModuleConfig,
    ModuleKind, ModuleResult,
};
use crate::core::progress::ProgressSink;
use crate::error::ModuleError;

/// Finds the biggest media files above a size threshold
#[derive(Debug, Default)]
pub struct LargeFilesModule;

impl LargeFilesModule {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleCollaborator for LargeFilesModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::LargeFiles
    }

    fn execute(
        &self,
        config: &ModuleConfig,
        progress: &ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<ModuleResult, ModuleError> {
        let ModuleConfig::LargeFiles { paths, settings } = config else {
            return Err(ModuleError::Failed(format!(
                "large files module received {} configuration",
                config.kind()
            )));
        };

        let start = Instant::now();
        let (files, _) = collect_files(paths, "walking", progress, cancel, is_media_file)?;
        let files_scanned = files.len();

        let largest = top_by_size(files, settings);
        let total_size_bytes = largest.iter().map(|f| f.size_bytes).sum();

        progress.report(
            "done",
            100.0,
            format!("Found {} large files", largest.len()),
        );
        info!(found = largest.len(), scanned = files_scanned, "Large file scan finished");

        Ok(ModuleResult::LargeFiles(LargeFilesResult {
            files: largest,
            total_size_bytes,
            files_scanned,
            duration_ms: start.elapsed().as_millis() as u64,
        }))
    }
}

/// The largest files at or above the threshold, largest first
fn top_by_size(files: Vec<WalkedFile>, settings: &LargeFilesSettings) -> Vec<LargeFileInfo> {
    let min_size = settings.min_size_bytes();
    let mut heap: BinaryHeap<Reverse<(u64, String, usize)>> =
        BinaryHeap::with_capacity(settings.max_results + 1);

    for (index, file) in files.iter().enumerate() {
        if file.size < min_size {
            continue;
        }
        heap.push(Reverse((file.size, file.display(), index)));
        if heap.len() > settings.max_results {
            heap.pop();
        }
    }

    let mut kept: Vec<_> = heap.into_iter().map(|Reverse(entry)| entry).collect();
    kept.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    kept.into_iter()
        .map(|(_, _, index)| {
            let file = &files[index];
            LargeFileInfo {
                path: file.display(),
                filename: file.file_name(),
                size_bytes: file.size,
                file_type: extension(&file.path).unwrap_or_default(),
                modified: file.modified,
            }
        })
        .collect()
}

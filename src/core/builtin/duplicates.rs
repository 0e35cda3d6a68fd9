//! Exact duplicate detection by content hash.

use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;
use xxhash_rust::xxh3::Xxh3;

use super::walk::{collect_files, is_media_file, WalkedFile};
use crate::core::cancel::CancellationToken;
use crate::core::modules::{
    DuplicateGroup, DuplicatesResult, ModuleCollaborator, ModuleConfig, ModuleKind, ModuleResult,
};
use crate::core::progress::ProgressSink;
use crate::error::ModuleError;

const HASH_BATCH: usize = 64;
const READ_BUFFER: usize = 64 * 1024;

/// Finds byte-identical media files.
///
/// Files are bucketed by size first, so only same-size candidates are hashed.
#[derive(Debug, Default)]
pub struct DuplicatesModule;

impl DuplicatesModule {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleCollaborator for DuplicatesModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Duplicates
    }

    fn execute(
        &self,
        config: &ModuleConfig,
        progress: &ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<ModuleResult, ModuleError> {
        let ModuleConfig::Duplicates { paths, .. } = config else {
            return Err(ModuleError::Failed(format!(
                "duplicates module received {} configuration",
                config.kind()
            )));
        };

        let start = Instant::now();
        let (files, _) = collect_files(paths, "walking", progress, cancel, is_media_file)?;
        let total_files_scanned = files.len();

        let groups = group_identical(files, "hashing", progress, cancel)?;
        let potential_savings_bytes = groups.iter().map(|g| g.duplicate_size_bytes).sum();

        info!(
            groups = groups.len(),
            files = total_files_scanned,
            "Duplicate scan finished"
        );

        Ok(ModuleResult::Duplicates(DuplicatesResult {
            groups,
            total_files_scanned,
            potential_savings_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
        }))
    }
}

/// Group files with identical content.
///
/// Only sizes shared by two or more files are hashed. Progress for `phase`
/// runs from 0 to 100 over the hashed candidates. Groups are sorted by
/// wasted bytes, largest first.
pub(crate) fn group_identical(
    files: Vec<WalkedFile>,
    phase: &str,
    progress: &ProgressSink,
    cancel: &CancellationToken,
) -> Result<Vec<DuplicateGroup>, ModuleError> {
    let mut by_size: HashMap<u64, Vec<PathBuf>> = HashMap::new();
    for file in files {
        by_size.entry(file.size).or_default().push(file.path);
    }

    let candidates: Vec<(u64, PathBuf)> = by_size
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .flat_map(|(size, paths)| paths.into_iter().map(move |p| (size, p)))
        .collect();

    let total = candidates.len();
    debug!(candidates = total, "Hashing same-size candidates");
    progress.report_fraction(phase, 0, total, format!("Hashing {} files", total));

    let mut by_hash: HashMap<(u64, u64), Vec<PathBuf>> = HashMap::new();
    let mut done = 0;

    for chunk in candidates.chunks(HASH_BATCH) {
        if cancel.is_cancelled() {
            return Err(ModuleError::Cancelled);
        }

        let hashed: Vec<_> = chunk
            .par_iter()
            .filter_map(|(size, path)| match hash_file(path) {
                Ok(hash) => Some(((*size, hash), path.clone())),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Skipping unhashable file");
                    None
                }
            })
            .collect();

        for (key, path) in hashed {
            by_hash.entry(key).or_default().push(path);
        }

        done += chunk.len();
        progress.report_fraction(phase, done, total, format!("Hashed {} of {}", done, total));
    }

    let mut groups: Vec<DuplicateGroup> = by_hash
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|((size, _), mut paths)| {
            paths.sort();
            let files: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            DuplicateGroup {
                id: Uuid::new_v4().to_string(),
                representative: files[0].clone(),
                duplicate_size_bytes: size * (files.len() as u64 - 1),
                files,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.duplicate_size_bytes
            .cmp(&a.duplicate_size_bytes)
            .then_with(|| a.representative.cmp(&b.representative))
    });

    Ok(groups)
}

fn hash_file(path: &Path) -> std::io::Result<u64> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Xxh3::new();
    let mut buffer = vec![0u8; READ_BUFFER];

    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.digest())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::modules::DuplicatesSettings;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &[u8]) {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn config(dir: &TempDir) -> ModuleConfig {
        ModuleConfig::Duplicates {
            paths: vec![dir.path().to_path_buf()],
            settings: DuplicatesSettings::default(),
        }
    }

    #[test]
    fn finds_identical_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.jpg", b"same content");
        write(&dir, "sub/b.jpg", b"same content");
        write(&dir, "c.jpg", b"same length!");
        write(&dir, "d.png", b"unique");

        let result = DuplicatesModule::new()
            .execute(
                &config(&dir),
                &ProgressSink::null(ModuleKind::Duplicates),
                &CancellationToken::new(),
            )
            .unwrap();

        let ModuleResult::Duplicates(result) = result else {
            panic!("wrong result kind");
        };
        assert_eq!(result.total_files_scanned, 4);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].files.len(), 2);
        assert_eq!(result.groups[0].duplicate_size_bytes, 12);
        assert_eq!(result.potential_savings_bytes, 12);
        assert!(result.groups[0].representative.ends_with("a.jpg"));
    }

    #[test]
    fn ignores_non_media_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.txt", b"same");
        write(&dir, "b.txt", b"same");

        let result = DuplicatesModule::new()
            .execute(
                &config(&dir),
                &ProgressSink::null(ModuleKind::Duplicates),
                &CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(result.summary().items_found, 0);
        assert_eq!(result.summary().files_examined, 0);
    }

    #[test]
    fn hashing_progress_ends_at_100() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.jpg", b"x");
        write(&dir, "b.jpg", b"x");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let sink = ProgressSink::new(ModuleKind::Duplicates, move |p| {
            seen_clone.lock().unwrap().push(p.percent);
        });

        DuplicatesModule::new()
            .execute(&config(&dir), &sink, &CancellationToken::new())
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last().copied(), Some(100.0));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn cancelled_token_stops_scan() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.jpg", b"x");
        let token = CancellationToken::new();
        token.cancel();

        let result = DuplicatesModule::new().execute(
            &config(&dir),
            &ProgressSink::null(ModuleKind::Duplicates),
            &token,
        );
        assert!(matches!(result, Err(ModuleError::Cancelled)));
    }
}

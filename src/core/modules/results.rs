//! Typed results produced by each module kind.
//!
//! `ModuleResult` is a closed variant with one case per kind. The summary
//! extraction rules live on the variant, so aggregation never inspects
//! payloads at runtime.

use serde::{Deserialize, Serialize};

use super::ModuleKind;

/// A group of files with identical content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub id: String,
    pub files: Vec<String>,
    /// The file to keep
    pub representative: String,
    /// Size of every file except the representative
    pub duplicate_size_bytes: u64,
}

impl DuplicateGroup {
    /// Number of duplicates (excluding the representative)
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }
}

/// Result of a duplicate scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatesResult {
    pub groups: Vec<DuplicateGroup>,
    pub total_files_scanned: usize,
    pub potential_savings_bytes: u64,
    pub duration_ms: u64,
}

/// A photo similar to a group's reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPhoto {
    pub path: String,
    pub distance: u32,
    pub similarity_percent: f64,
    pub size_bytes: u64,
}

/// A group of similar photos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarGroup {
    pub id: String,
    pub reference: String,
    pub reference_size_bytes: u64,
    pub similar_photos: Vec<SimilarPhoto>,
    pub average_similarity: f64,
    pub total_size_bytes: u64,
}

impl SimilarGroup {
    pub fn similar_count(&self) -> usize {
        self.similar_photos.len()
    }
}

/// Result of a similar photo scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarResult {
    pub groups: Vec<SimilarGroup>,
    pub total_photos_scanned: usize,
    pub duration_ms: u64,
}

/// Information about a large file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargeFileInfo {
    pub path: String,
    pub filename: String,
    pub size_bytes: u64,
    /// Lowercase extension (e.g. "jpg", "mp4")
    pub file_type: String,
    /// Last modified time (Unix timestamp in seconds)
    pub modified: u64,
}

/// Result of a large file scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargeFilesResult {
    /// Sorted by size, largest first
    pub files: Vec<LargeFileInfo>,
    pub total_size_bytes: u64,
    pub files_scanned: usize,
    pub duration_ms: u64,
}

/// Confidence level for screenshot detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenshotConfidence {
    /// Dimension or folder heuristics
    Low,
    /// Filename pattern
    Medium,
    /// Software tag
    High,
}

/// A detected screenshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotInfo {
    pub path: String,
    pub size_bytes: u64,
    pub confidence: ScreenshotConfidence,
    pub detection_reason: String,
}

/// Result of a screenshot scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotResult {
    pub screenshots: Vec<ScreenshotInfo>,
    /// Groups of identical screenshots
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub total_size_bytes: u64,
    pub total_files_scanned: usize,
    pub duration_ms: u64,
}

/// Why a file is considered unorganized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnorganizedReason {
    /// File is in root of scanned folder
    InRoot,
    /// File is in a folder shallower than the configured depth
    ShallowFolder,
    /// Path has no date pattern (YYYY, YYYY-MM, ...)
    NoDatePattern,
    /// Generic camera name (IMG_*, DSC*, ...)
    GenericName,
}

impl UnorganizedReason {
    pub fn description(&self) -> &'static str {
        match self {
            Self::InRoot => "In root folder",
            Self::ShallowFolder => "In shallow folder",
            Self::NoDatePattern => "Not in date folder",
            Self::GenericName => "Generic filename",
        }
    }
}

/// A file identified as unorganized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnorganizedFile {
    pub path: String,
    pub size_bytes: u64,
    pub reasons: Vec<UnorganizedReason>,
    pub folder_depth: usize,
}

/// Files per reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonSummary {
    pub reason: UnorganizedReason,
    pub count: usize,
    pub size_bytes: u64,
}

/// Result of an unorganized scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnorganizedResult {
    pub files: Vec<UnorganizedFile>,
    pub total_files_scanned: usize,
    pub total_size_bytes: u64,
    pub by_reason: Vec<ReasonSummary>,
    pub duration_ms: u64,
}

/// The typed result of one module run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "module", content = "result", rename_all = "snake_case")]
pub enum ModuleResult {
    Duplicates(DuplicatesResult),
    Similar(SimilarResult),
    LargeFiles(LargeFilesResult),
    Screenshots(ScreenshotResult),
    Unorganized(UnorganizedResult),
}

/// Counts pulled out of a module result for totals and history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub files_examined: usize,
    pub items_found: usize,
    pub groups_found: Option<usize>,
    pub savings_bytes: u64,
}

impl ModuleResult {
    pub fn kind(&self) -> ModuleKind {
        match self {
            Self::Duplicates(_) => ModuleKind::Duplicates,
            Self::Similar(_) => ModuleKind::Similar,
            Self::LargeFiles(_) => ModuleKind::LargeFiles,
            Self::Screenshots(_) => ModuleKind::Screenshots,
            Self::Unorganized(_) => ModuleKind::Unorganized,
        }
    }

    /// Extract the per-kind summary.
    ///
    /// Duplicates count redundant copies and their bytes. Similar photos are
    /// not redundant, so they add no savings. Large files count their full
    /// size as reclaimable. Screenshots save only what identical copies take.
    pub fn summary(&self) -> ModuleSummary {
        match self {
            Self::Duplicates(r) => ModuleSummary {
                files_examined: r.total_files_scanned,
                items_found: r.groups.iter().map(|g| g.duplicate_count()).sum(),
                groups_found: Some(r.groups.len()),
                savings_bytes: r.potential_savings_bytes,
            },
            Self::Similar(r) => ModuleSummary {
                files_examined: r.total_photos_scanned,
                items_found: r.groups.iter().map(|g| g.similar_count()).sum(),
                groups_found: Some(r.groups.len()),
                savings_bytes: 0,
            },
            Self::LargeFiles(r) => ModuleSummary {
                files_examined: r.files_scanned,
                items_found: r.files.len(),
                groups_found: None,
                savings_bytes: r.total_size_bytes,
            },
            Self::Screenshots(r) => ModuleSummary {
                files_examined: r.total_files_scanned,
                items_found: r.screenshots.len(),
                groups_found: Some(r.duplicate_groups.len()),
                savings_bytes: r.duplicate_groups.iter().map(|g| g.duplicate_size_bytes).sum(),
            },
            Self::Unorganized(r) => ModuleSummary {
                files_examined: r.total_files_scanned,
                items_found: r.files.len(),
                groups_found: None,
                savings_bytes: 0,
            },
        }
    }
}

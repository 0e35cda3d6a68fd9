//! The closed set of analysis module kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of scan module
///
/// Variant order is the fixed execution order of a combined scan, so
/// `Ord` and the derived sort of any collection keyed by kind follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Duplicates,
    Similar,
    LargeFiles,
    Screenshots,
    Unorganized,
}

impl ModuleKind {
    /// Every kind, in execution order.
    pub const ALL: [ModuleKind; 5] = [
        Self::Duplicates,
        Self::Similar,
        Self::LargeFiles,
        Self::Screenshots,
        Self::Unorganized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Duplicates => "duplicates",
            Self::Similar => "similar",
            Self::LargeFiles => "large_files",
            Self::Screenshots => "screenshots",
            Self::Unorganized => "unorganized",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Duplicates => "Duplicates",
            Self::Similar => "Similar Photos",
            Self::LargeFiles => "Large Files",
            Self::Screenshots => "Screenshots",
            Self::Unorganized => "Unorganized",
        }
    }

    /// Position in the execution order
    pub fn order(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "duplicates" => Ok(Self::Duplicates),
            "similar" => Ok(Self::Similar),
            "large_files" => Ok(Self::LargeFiles),
            "screenshots" => Ok(Self::Screenshots),
            "unorganized" => Ok(Self::Unorganized),
            other => Err(format!("Unknown module: {}", other)),
        }
    }
}

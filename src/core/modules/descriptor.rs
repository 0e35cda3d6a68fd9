//! Static descriptors for the five module kinds.

use super::{ModuleConfig, ModuleKind, ModuleResult, ModuleSummary};
use crate::core::session::ScanConfig;

/// Static description of one module kind
#[derive(Debug)]
pub struct ModuleDescriptor {
    pub kind: ModuleKind,
    pub label: &'static str,
    extract_config: fn(&ScanConfig) -> ModuleConfig,
}

impl ModuleDescriptor {
    /// The configuration slice this module consumes
    pub fn config_fragment(&self, config: &ScanConfig) -> ModuleConfig {
        (self.extract_config)(config)
    }

    /// Summary of a result produced by this module.
    ///
    /// Returns `None` when the result belongs to another kind.
    pub fn summary(&self, result: &ModuleResult) -> Option<ModuleSummary> {
        (result.kind() == self.kind).then(|| result.summary())
    }
}

fn duplicates_config(config: &ScanConfig) -> ModuleConfig {
    ModuleConfig::Duplicates {
        paths: config.paths.clone(),
        settings: config.settings.duplicates.clone(),
    }
}

fn similar_config(config: &ScanConfig) -> ModuleConfig {
    ModuleConfig::Similar {
        paths: config.paths.clone(),
        settings: config.settings.similar.clone(),
    }
}

fn large_files_config(config: &ScanConfig) -> ModuleConfig {
    ModuleConfig::LargeFiles {
        paths: config.paths.clone(),
        settings: config.settings.large_files.clone(),
    }
}

fn screenshots_config(config: &ScanConfig) -> ModuleConfig {
    ModuleConfig::Screenshots {
        paths: config.paths.clone(),
        settings: config.settings.screenshots.clone(),
    }
}

fn unorganized_config(config: &ScanConfig) -> ModuleConfig {
    ModuleConfig::Unorganized {
        paths: config.paths.clone(),
        settings: config.settings.unorganized.clone(),
    }
}

/// All descriptors, in execution order
pub static DESCRIPTORS: [ModuleDescriptor; 5] = [
    ModuleDescriptor {
        kind: ModuleKind::Duplicates,
        label: "Duplicates",
        extract_config: duplicates_config,
    },
    ModuleDescriptor {
        kind: ModuleKind::Similar,
        label: "Similar Photos",
        extract_config: similar_config,
    },
    ModuleDescriptor {
        kind: ModuleKind::LargeFiles,
        label: "Large Files",
        extract_config: large_files_config,
    },
    ModuleDescriptor {
        kind: ModuleKind::Screenshots,
        label: "Screenshots",
        extract_config: screenshots_config,
    },
    ModuleDescriptor {
        kind: ModuleKind::Unorganized,
        label: "Unorganized",
        extract_config: unorganized_config,
    },
];

/// Look up the descriptor for a kind
pub fn descriptor(kind: ModuleKind) -> &'static ModuleDescriptor {
    &DESCRIPTORS[kind.order()]
}

/// Descriptors for the modules enabled in `config`, in execution order
pub fn enabled_descriptors(config: &ScanConfig) -> Vec<&'static ModuleDescriptor> {
    DESCRIPTORS
        .iter()
        .filter(|d| config.modules.contains(&d.kind))
        .collect()
}

//! # Built-in Modules
//!
//! Filesystem-only implementations of the module kinds that need no image
//! decoding. Similar-photo detection has no built-in collaborator; callers
//! that want it register their own.

mod duplicates;
mod large_files;
mod screenshots;
mod unorganized;
mod walk;

use std::sync::Arc;
use tracing::warn;

pub use duplicates::DuplicatesModule;
pub use large_files::LargeFilesModule;
pub use screenshots::ScreenshotsModule;
pub use unorganized::UnorganizedModule;

use crate::core::modules::ModuleRegistry;

/// A registry holding every built-in collaborator
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry
        .register(Arc::new(DuplicatesModule::new()))
        .register(Arc::new(LargeFilesModule::new()))
        .register(Arc::new(ScreenshotsModule::new()));

    match UnorganizedModule::new() {
        Ok(module) => {
            registry.register(Arc::new(module));
        }
        Err(e) => warn!(error = %e, "Unorganized module unavailable"),
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::modules::ModuleKind;

    #[test]
    fn registry_has_everything_but_similar() {
        let registry = registry();
        assert_eq!(
            registry.kinds(),
            vec![
                ModuleKind::Duplicates,
                ModuleKind::LargeFiles,
                ModuleKind::Screenshots,
                ModuleKind::Unorganized,
            ]
        );
        assert!(!registry.contains(ModuleKind::Similar));
    }
}

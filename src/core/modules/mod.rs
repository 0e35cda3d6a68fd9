//! # Modules
//!
//! The five analysis module kinds and everything the orchestrator knows
//! about them: settings, the configuration slice each receives, their typed
//! results, and the collaborator contract.
//!
//! The detection algorithms themselves live behind [`ModuleCollaborator`].

mod descriptor;
mod kind;
mod registry;
mod results;
mod settings;
mod traits;

pub use descriptor::{descriptor, enabled_descriptors, ModuleDescriptor, DESCRIPTORS};
pub use kind::ModuleKind;
pub use registry::ModuleRegistry;
pub use results::*;
pub use settings::{
    DuplicatesSettings, LargeFilesSettings, ModuleConfig, ModuleSettings, ScreenshotSettings,
    SimilarSettings, UnorganizedSettings,
};
pub use traits::ModuleCollaborator;

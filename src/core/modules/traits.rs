//! The contract every detection module implements.

use super::{ModuleConfig, ModuleKind, ModuleResult};
use crate::core::cancel::CancellationToken;
use crate::core::progress::ProgressSink;
use crate::error::ModuleError;

/// A detection module the orchestrator can run.
///
/// Implementations report monotonically non-decreasing percentages through
/// `progress` and should poll `cancel` between units of work, returning
/// `ModuleError::Cancelled` when they stop early.
pub trait ModuleCollaborator: Send + Sync {
    /// The kind of module this collaborator implements
    fn kind(&self) -> ModuleKind;

    /// Run the module to completion
    fn execute(
        &self,
        config: &ModuleConfig,
        progress: &ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<ModuleResult, ModuleError>;
}

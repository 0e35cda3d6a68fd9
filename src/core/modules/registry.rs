//! Registry of the collaborators available to a controller.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{ModuleCollaborator, ModuleKind};

/// Maps module kinds to the collaborator that runs them
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    collaborators: HashMap<ModuleKind, Arc<dyn ModuleCollaborator>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collaborator under its own kind, replacing any previous one
    pub fn register(&mut self, collaborator: Arc<dyn ModuleCollaborator>) -> &mut Self {
        self.collaborators.insert(collaborator.kind(), collaborator);
        self
    }

    /// Builder-style `register`
    pub fn with(mut self, collaborator: Arc<dyn ModuleCollaborator>) -> Self {
        self.register(collaborator);
        self
    }

    pub fn get(&self, kind: ModuleKind) -> Option<Arc<dyn ModuleCollaborator>> {
        self.collaborators.get(&kind).cloned()
    }

    pub fn contains(&self, kind: ModuleKind) -> bool {
        self.collaborators.contains_key(&kind)
    }

    /// Registered kinds, in execution order
    pub fn kinds(&self) -> Vec<ModuleKind> {
        let mut kinds: Vec<_> = self.collaborators.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

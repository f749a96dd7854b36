//! Group query descriptors.
//!
//! A [`GroupQuery`] states which component types an entity must hold and which
//! it must not. The engine evaluates it against each entity's sequence when a
//! group is requested; nothing is cached between calls.

use serde::{Deserialize, Serialize};

use crate::component::ComponentTypeId;
use crate::sequence::ComponentSequence;

/// Required and excluded component types for a group scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupQuery {
    /// Types every matching entity holds.
    pub with: Vec<ComponentTypeId>,
    /// Types no matching entity holds.
    pub without: Vec<ComponentTypeId>,
}

impl GroupQuery {
    /// Create a new empty query. An empty query matches every entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a component type.
    #[must_use]
    pub fn with(mut self, type_id: ComponentTypeId) -> Self {
        self.with.push(type_id);
        self
    }

    /// Exclude a component type.
    #[must_use]
    pub fn without(mut self, type_id: ComponentTypeId) -> Self {
        self.without.push(type_id);
        self
    }

    /// Query requiring all of `types`.
    #[must_use]
    pub fn all_of(types: &[ComponentTypeId]) -> Self {
        Self {
            with: types.to_vec(),
            without: Vec::new(),
        }
    }

    /// Returns `true` if `sequence` satisfies every requirement.
    #[must_use]
    pub fn matches(&self, sequence: &ComponentSequence) -> bool {
        self.with.iter().all(|&ty| sequence.contains(ty))
            && !self.without.iter().any(|&ty| sequence.contains(ty))
    }

    /// Returns `true` if some type is both required and excluded, so the
    /// query can never match.
    #[must_use]
    pub fn is_contradictory(&self) -> bool {
        self.with.iter().any(|ty| self.without.contains(ty))
    }
}

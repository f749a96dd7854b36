//! Detached component arrays.
//!
//! A [`Pack`] copies component handles out of one entity's sequence. It keeps
//! the instances alive on its own but is only handed back while every packed
//! instance is still attached to its source entity.

use std::fmt;

use aspect_component::{Args, Component, ComponentRef, ComponentTypeId, Entity};
use aspect_reflect::OperationDispatcher;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::Engine;
use crate::error::EngineError;

/// Index of a pack in the engine's pack table. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackId(pub usize);

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Pack {
    id: PackId,
    source: Entity,
    components: Vec<ComponentRef>,
}

impl Pack {
    #[must_use]
    pub fn id(&self) -> PackId {
        self.id
    }

    /// Entity the components were copied from.
    #[must_use]
    pub fn source(&self) -> Entity {
        self.source
    }

    /// Packed components in the order they were requested.
    #[must_use]
    pub fn components(&self) -> &[ComponentRef] {
        &self.components
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComponentRef> {
        self.components.iter()
    }

    /// The packed component of type `T`.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&ComponentRef> {
        self.find(T::component_type_id())
    }

    #[must_use]
    pub fn find(&self, ty: ComponentTypeId) -> Option<&ComponentRef> {
        self.components.iter().find(|c| c.component_type() == ty)
    }
}

impl<'a> IntoIterator for &'a Pack {
    type Item = &'a ComponentRef;
    type IntoIter = std::slice::Iter<'a, ComponentRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

impl Engine {
    /// Copy the `types` components of `entity` into a new pack.
    ///
    /// Every type must be present. The pack keeps its instances alive after
    /// they are erased or their entity is destroyed, until
    /// [`Engine::release_pack`] drops it.
    pub fn create_pack(&mut self, entity: Entity, types: &[ComponentTypeId]) -> Result<PackId, EngineError> {
        let components = self.get_many(entity, types)?;
        let id = PackId(self.packs.len());
        self.packs.push(Some(Pack {
            id,
            source: entity,
            components,
        }));
        debug!(instance = %self.instance, %entity, pack = %id, size = types.len(), "pack created");
        Ok(id)
    }

    /// The pack `id` if it was created from `entity` and every packed
    /// instance is still attached to it.
    ///
    /// Replacing or erasing any packed component, or destroying the entity,
    /// makes the pack unavailable.
    pub fn pack(&self, entity: Entity, id: PackId) -> Result<Option<Pack>, EngineError> {
        let pack = self
            .packs
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(EngineError::UnknownPack(id))?;
        if pack.source != entity {
            return Ok(None);
        }
        let Some(sequence) = self.container.get(&entity) else {
            return Ok(None);
        };
        Ok(pack
            .components
            .iter()
            .all(|c| sequence.contains_ref(c))
            .then(|| pack.clone()))
    }

    /// Number of packs ever created, released ones included.
    #[must_use]
    pub fn pack_count(&self) -> usize {
        self.packs.len()
    }

    /// Drop pack `id` and its component handles. The id is not handed out
    /// again.
    pub fn release_pack(&mut self, id: PackId) -> Result<Pack, EngineError> {
        let pack = self
            .packs
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(EngineError::UnknownPack(id))?;
        debug!(instance = %self.instance, pack = %id, "pack released");
        Ok(pack)
    }

    /// Invoke `op` on every component of `pack`, stopping at the first
    /// failure.
    pub fn invoke_each_pack(&self, pack: &Pack, op: &str, args: &Args) -> Result<(), EngineError> {
        let dispatcher = OperationDispatcher::new(&self.registry);
        for component in pack {
            dispatcher.invoke(component, op, args)?;
        }
        Ok(())
    }
}

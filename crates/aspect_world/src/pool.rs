//! Secondary type index over the component store.
//!
//! The [`TypePool`] maps each component type to the `(entity, component)`
//! pairs currently holding it. It is derived data: the engine updates it in
//! the same call as every change to an entity's sequence, and
//! [`Engine::check_consistency`](crate::Engine::check_consistency) verifies
//! the two agree.

use std::collections::HashMap;

use aspect_component::{ComponentRef, ComponentTypeId, Entity};

use crate::error::EngineError;

#[derive(Debug, Default)]
pub struct TypePool {
    entries: HashMap<ComponentTypeId, Vec<(Entity, ComponentRef)>>,
    max_types: usize,
}

impl TypePool {
    #[must_use]
    pub fn new(max_types: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_types,
        }
    }

    /// Record that `entity` now holds `component` as its `ty`.
    ///
    /// Fails if `ty` is new and the pool already tracks the maximum number of
    /// types.
    pub fn index(
        &mut self,
        ty: ComponentTypeId,
        entity: Entity,
        component: ComponentRef,
    ) -> Result<(), EngineError> {
        if !self.entries.contains_key(&ty) && self.entries.len() >= self.max_types {
            return Err(EngineError::TooManyComponentTypes(self.max_types));
        }
        self.entries.entry(ty).or_default().push((entity, component));
        Ok(())
    }

    /// Point `entity`'s `ty` pair at a new instance, keeping its position.
    pub fn reindex(&mut self, ty: ComponentTypeId, entity: Entity, component: ComponentRef) {
        if let Some(slot) = self
            .entries
            .get_mut(&ty)
            .and_then(|pairs| pairs.iter_mut().find(|(e, _)| *e == entity))
        {
            slot.1 = component;
        }
    }

    pub fn unindex(&mut self, ty: ComponentTypeId, entity: Entity) -> Option<ComponentRef> {
        let pairs = self.entries.get_mut(&ty)?;
        let index = pairs.iter().position(|(e, _)| *e == entity)?;
        let (_, component) = pairs.remove(index);
        if pairs.is_empty() {
            self.entries.remove(&ty);
        }
        Some(component)
    }

    /// Pairs of type `ty`, oldest first.
    #[must_use]
    pub fn pairs(&self, ty: ComponentTypeId) -> &[(Entity, ComponentRef)] {
        self.entries.get(&ty).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn entities_of(&self, ty: ComponentTypeId) -> Vec<Entity> {
        self.pairs(ty).iter().map(|(e, _)| *e).collect()
    }

    #[must_use]
    pub fn get(&self, ty: ComponentTypeId, entity: Entity) -> Option<&ComponentRef> {
        self.pairs(ty)
            .iter()
            .find(|(e, _)| *e == entity)
            .map(|(_, c)| c)
    }

    /// Entity holding exactly this instance.
    #[must_use]
    pub fn holder_of(&self, component: &ComponentRef) -> Option<Entity> {
        self.pairs(component.component_type())
            .iter()
            .find(|(_, c)| c.ptr_eq(component))
            .map(|(e, _)| *e)
    }

    /// Entity holding exactly this instance, or else the entity that most
    /// recently received a component of the same type.
    #[must_use]
    pub fn owner_of(&self, component: &ComponentRef) -> Option<Entity> {
        let pairs = self.pairs(component.component_type());
        pairs
            .iter()
            .find(|(_, c)| c.ptr_eq(component))
            .or_else(|| pairs.last())
            .map(|(e, _)| *e)
    }

    /// Drop every pair of type `ty`.
    pub fn remove_type(&mut self, ty: ComponentTypeId) -> Vec<(Entity, ComponentRef)> {
        self.entries.remove(&ty).unwrap_or_default()
    }

    /// Component types currently held by at least one entity.
    pub fn types(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.entries.keys().copied()
    }

    #[must_use]
    pub fn type_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of indexed pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

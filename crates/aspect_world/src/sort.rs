//! Reordering of the live entity list.
//!
//! Sorting only permutes [`Engine::entities`]; each entity keeps its
//! sequence. All sorts are stable.

use std::cmp::Ordering;

use aspect_component::{AnyComponent, Component, ComponentRef, ComponentTypeId, Entity};
use tracing::debug;

use crate::engine::Engine;
use crate::error::EngineError;

impl Engine {
    /// Reorder entities by `compare`.
    pub fn sort_entities<F>(&mut self, mut compare: F)
    where
        F: FnMut(Entity, Entity) -> Ordering,
    {
        self.entities.sort_by(|&a, &b| compare(a, b));
        debug!(instance = %self.instance, entities = self.entities.len(), "entities sorted");
    }

    /// Reorder entities by comparing their `ty` components.
    ///
    /// Entities without a `ty` keep their relative order after all entities
    /// that have one. Fails without reordering if any `ty` is mutably
    /// borrowed.
    pub fn sort_by_component<F>(&mut self, ty: ComponentTypeId, mut compare: F) -> Result<(), EngineError>
    where
        F: FnMut(&dyn AnyComponent, &dyn AnyComponent) -> Ordering,
    {
        let snapshot: Vec<(Entity, Option<ComponentRef>)> = self
            .entities
            .iter()
            .map(|&e| (e, self.container.get(&e).and_then(|s| s.get(ty)).cloned()))
            .collect();

        let borrows = snapshot
            .iter()
            .map(|(_, c)| c.as_ref().map(ComponentRef::borrow).transpose())
            .collect::<Result<Vec<_>, _>>()?;

        let mut order: Vec<usize> = (0..snapshot.len()).collect();
        order.sort_by(|&i, &j| match (&borrows[i], &borrows[j]) {
            (Some(a), Some(b)) => compare(&**a, &**b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        drop(borrows);

        self.entities = order.into_iter().map(|i| snapshot[i].0).collect();
        debug!(
            instance = %self.instance,
            component = %self.type_name(ty),
            entities = self.entities.len(),
            "entities sorted by component"
        );
        Ok(())
    }

    /// Typed form of [`Engine::sort_by_component`].
    pub fn sort_by<T, F>(&mut self, mut compare: F) -> Result<(), EngineError>
    where
        T: Component,
        F: FnMut(&T, &T) -> Ordering,
    {
        self.sort_by_component(T::component_type_id(), |a, b| {
            match (a.as_any().downcast_ref::<T>(), b.as_any().downcast_ref::<T>()) {
                (Some(a), Some(b)) => compare(a, b),
                _ => Ordering::Equal,
            }
        })
    }
}

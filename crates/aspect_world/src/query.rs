//! Views, groups and iteration.
//!
//! Every query is a full scan of the live entity list in its current order.
//! Results are snapshots and do not follow later mutation.

use aspect_component::{ComponentRef, ComponentTypeId, Entity, GroupQuery};
use tracing::trace;

use crate::engine::Engine;

impl Engine {
    // -- Query --

    /// Entities matching `query`, in iteration order.
    ///
    ///  - `with`: entity must hold ALL of these types
    ///  - `without`: entity must hold NONE of these types
    #[must_use]
    pub fn query(&self, query: &GroupQuery) -> Vec<Entity> {
        if query.is_contradictory() {
            return Vec::new();
        }
        let matched: Vec<Entity> = self
            .entities
            .iter()
            .filter(|e| self.container.get(e).is_some_and(|s| query.matches(s)))
            .copied()
            .collect();
        trace!(
            instance = %self.instance,
            with = query.with.len(),
            without = query.without.len(),
            matched = matched.len(),
            "query scanned"
        );
        matched
    }

    /// Entities holding `ty`.
    #[must_use]
    pub fn view(&self, ty: ComponentTypeId) -> Vec<Entity> {
        self.query(&GroupQuery::new().with(ty))
    }

    /// Entities holding every one of `types`.
    #[must_use]
    pub fn group(&self, types: &[ComponentTypeId]) -> Vec<Entity> {
        self.query(&GroupQuery::all_of(types))
    }

    /// First entity in iteration order holding `ty`, or [`Entity::INVALID`].
    #[must_use]
    pub fn find(&self, ty: ComponentTypeId) -> Entity {
        self.entities
            .iter()
            .copied()
            .find(|e| self.holds_type(*e, ty))
            .unwrap_or(Entity::INVALID)
    }

    /// Last entity in iteration order holding `ty`, or [`Entity::INVALID`].
    #[must_use]
    pub fn find_last(&self, ty: ComponentTypeId) -> Entity {
        self.entities
            .iter()
            .rev()
            .copied()
            .find(|e| self.holds_type(*e, ty))
            .unwrap_or(Entity::INVALID)
    }

    fn holds_type(&self, entity: Entity, ty: ComponentTypeId) -> bool {
        self.container.get(&entity).is_some_and(|s| s.contains(ty))
    }

    // -- Iteration --

    /// Call `f` with every live entity.
    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(Entity),
    {
        for &entity in &self.entities {
            f(entity);
        }
    }

    /// Call `f` with every component whose runtime type is `ty` or a
    /// registered subtype of it, together with its entity.
    pub fn each_component<F>(&self, ty: ComponentTypeId, mut f: F)
    where
        F: FnMut(Entity, &ComponentRef),
    {
        for &entity in &self.entities {
            let Some(sequence) = self.container.get(&entity) else {
                continue;
            };
            for component in sequence {
                if self.registry.is_subtype_of(component.component_type(), ty) {
                    f(entity, component);
                }
            }
        }
    }

    /// Call `f` with every component of every entity.
    pub fn each_any<F>(&self, mut f: F)
    where
        F: FnMut(Entity, &ComponentRef),
    {
        for &entity in &self.entities {
            if let Some(sequence) = self.container.get(&entity) {
                for component in sequence {
                    f(entity, component);
                }
            }
        }
    }
}

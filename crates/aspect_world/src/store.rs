//! Component storage operations on [`Engine`].
//!
//! Each operation edits the entity's [`ComponentSequence`] and the
//! [`TypePool`](crate::pool::TypePool) together.

use std::cell::{Ref, RefMut};

use aspect_component::{Args, Component, ComponentRef, ComponentSequence, ComponentTypeId, Entity};
use aspect_reflect::ComponentFactory;
use tracing::debug;

use crate::engine::Engine;
use crate::error::EngineError;

impl Engine {
    fn missing(&self, entity: Entity, ty: ComponentTypeId) -> EngineError {
        EngineError::MissingComponent {
            entity,
            component: self.type_name(ty),
        }
    }

    fn ensure_absent(&self, entity: Entity, ty: ComponentTypeId) -> Result<(), EngineError> {
        if self.sequence(entity)?.contains(ty) {
            return Err(EngineError::DuplicateComponent {
                entity,
                component: self.type_name(ty),
            });
        }
        Ok(())
    }

    fn ensure_type(&self, ty: ComponentTypeId, component: &ComponentRef) -> Result<(), EngineError> {
        if component.component_type() != ty {
            return Err(EngineError::TypeMismatch {
                expected: self.type_name(ty),
                found: component.name().to_owned(),
            });
        }
        Ok(())
    }

    /// Fails if `component` is already held by an entity other than `entity`.
    fn ensure_detached(&self, entity: Entity, component: &ComponentRef) -> Result<(), EngineError> {
        match self.pool.holder_of(component) {
            Some(holder) if holder != entity => Err(EngineError::AlreadyAttached {
                entity: holder,
                component: component.name().to_owned(),
            }),
            _ => Ok(()),
        }
    }

    fn build(&self, entity: Entity, ty: ComponentTypeId, args: Args) -> Result<ComponentRef, EngineError> {
        let component = ComponentFactory::new(&self.registry).construct(ty, args, Some(entity))?;
        self.ensure_type(ty, &component)?;
        Ok(component)
    }

    // -- Emplace --

    /// Attach `value` to `entity`.
    pub fn emplace<T: Component>(&mut self, entity: Entity, value: T) -> Result<ComponentRef, EngineError> {
        self.emplace_ref(entity, ComponentRef::new(value))
    }

    /// Attach an existing instance to `entity` under its own runtime type.
    pub fn emplace_ref(&mut self, entity: Entity, component: ComponentRef) -> Result<ComponentRef, EngineError> {
        let ty = component.component_type();
        self.emplace_as(entity, ty, component)
    }

    /// Attach `component` to `entity` as type `ty`.
    ///
    /// Fails if the entity is not live, if the component's runtime type is not
    /// `ty`, if the entity already holds a `ty`, or if the instance is attached
    /// to another entity.
    pub fn emplace_as(
        &mut self,
        entity: Entity,
        ty: ComponentTypeId,
        component: ComponentRef,
    ) -> Result<ComponentRef, EngineError> {
        self.sequence(entity)?;
        self.ensure_type(ty, &component)?;
        self.ensure_absent(entity, ty)?;
        self.ensure_detached(entity, &component)?;

        self.pool.index(ty, entity, component.clone())?;
        self.sequence_mut(entity)?.push(component.clone());
        debug!(instance = %self.instance, %entity, component = component.name(), "component emplaced");
        Ok(component)
    }

    /// Construct a `ty` from `args` and attach it to `entity`.
    ///
    /// The constructor sees `entity` through
    /// [`CallArgs::owner`](aspect_reflect::CallArgs::owner).
    pub fn emplace_with(
        &mut self,
        entity: Entity,
        ty: ComponentTypeId,
        args: Args,
    ) -> Result<ComponentRef, EngineError> {
        self.ensure_absent(entity, ty)?;
        let component = self.build(entity, ty, args)?;
        self.emplace_as(entity, ty, component)
    }

    /// Construct and attach several components, in order.
    pub fn emplace_many(
        &mut self,
        entity: Entity,
        items: Vec<(ComponentTypeId, Args)>,
    ) -> Result<Vec<ComponentRef>, EngineError> {
        items
            .into_iter()
            .map(|(ty, args)| self.emplace_with(entity, ty, args))
            .collect()
    }

    /// The `ty` of `entity`, constructing it from `args` if absent.
    pub fn get_or_emplace_with(
        &mut self,
        entity: Entity,
        ty: ComponentTypeId,
        args: Args,
    ) -> Result<ComponentRef, EngineError> {
        if let Some(existing) = self.sequence(entity)?.get(ty) {
            return Ok(existing.clone());
        }
        self.emplace_with(entity, ty, args)
    }

    /// The `T` of `entity`, attaching `make()` if absent.
    pub fn get_or_emplace<T, F>(&mut self, entity: Entity, make: F) -> Result<ComponentRef, EngineError>
    where
        T: Component,
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.sequence(entity)?.get(T::component_type_id()) {
            return Ok(existing.clone());
        }
        self.emplace(entity, make())
    }

    // -- Replace --

    /// Swap the `T` of `entity` for `value`, returning the previous instance.
    pub fn replace<T: Component>(&mut self, entity: Entity, value: T) -> Result<ComponentRef, EngineError> {
        self.replace_ref(entity, ComponentRef::new(value))
    }

    pub fn replace_ref(&mut self, entity: Entity, component: ComponentRef) -> Result<ComponentRef, EngineError> {
        let ty = component.component_type();
        self.replace_as(entity, ty, component)
    }

    /// Swap the `ty` of `entity` for `component` in its sequence slot.
    ///
    /// The slot position and the pool position are both kept. An instance
    /// attached to another entity is rejected.
    pub fn replace_as(
        &mut self,
        entity: Entity,
        ty: ComponentTypeId,
        component: ComponentRef,
    ) -> Result<ComponentRef, EngineError> {
        self.ensure_type(ty, &component)?;
        self.ensure_detached(entity, &component)?;
        let index = self
            .sequence(entity)?
            .position(ty)
            .ok_or_else(|| self.missing(entity, ty))?;

        let old = self.sequence_mut(entity)?.replace_at(index, component.clone());
        self.pool.reindex(ty, entity, component);
        debug!(instance = %self.instance, %entity, component = old.name(), "component replaced");
        Ok(old)
    }

    /// Construct a new `ty` from `args` and swap it in.
    pub fn replace_with(
        &mut self,
        entity: Entity,
        ty: ComponentTypeId,
        args: Args,
    ) -> Result<ComponentRef, EngineError> {
        if !self.sequence(entity)?.contains(ty) {
            return Err(self.missing(entity, ty));
        }
        let component = self.build(entity, ty, args)?;
        self.replace_as(entity, ty, component)
    }

    pub fn replace_many(
        &mut self,
        entity: Entity,
        items: Vec<(ComponentTypeId, Args)>,
    ) -> Result<Vec<ComponentRef>, EngineError> {
        items
            .into_iter()
            .map(|(ty, args)| self.replace_with(entity, ty, args))
            .collect()
    }

    /// Replace the `ty` of `entity` if present, emplace it otherwise.
    ///
    /// A well-formed `entity` that is not live is inserted first, and removed
    /// again if the component cannot be attached. Returns the new instance.
    pub fn replace_or_emplace_with(
        &mut self,
        entity: Entity,
        ty: ComponentTypeId,
        args: Args,
    ) -> Result<ComponentRef, EngineError> {
        let component = self.build(entity, ty, args)?;
        self.place(entity, ty, component)
    }

    pub fn replace_or_emplace<T: Component>(
        &mut self,
        entity: Entity,
        value: T,
    ) -> Result<ComponentRef, EngineError> {
        self.place(entity, T::component_type_id(), ComponentRef::new(value))
    }

    fn place(
        &mut self,
        entity: Entity,
        ty: ComponentTypeId,
        component: ComponentRef,
    ) -> Result<ComponentRef, EngineError> {
        let inserted = !self.contains(entity);
        if inserted {
            self.insert(entity)?;
        }
        let placed = if self.sequence(entity)?.contains(ty) {
            self.replace_as(entity, ty, component.clone()).map(|_| component)
        } else {
            self.emplace_as(entity, ty, component)
        };
        if placed.is_err() && inserted {
            self.release_entity(entity);
        }
        placed
    }

    /// Replace-or-emplace a freshly built `ty` on every live entity.
    pub fn assign_all(&mut self, ty: ComponentTypeId, args: Args) -> Result<usize, EngineError> {
        let targets = self.entities.clone();
        for &entity in &targets {
            self.replace_or_emplace_with(entity, ty, args.clone())?;
        }
        Ok(targets.len())
    }

    /// Replace-or-emplace a freshly built `ty` on the entities at iteration
    /// positions `first..=last`. Positions past the end are ignored.
    pub fn assign_range(
        &mut self,
        ty: ComponentTypeId,
        first: usize,
        last: usize,
        args: Args,
    ) -> Result<usize, EngineError> {
        if first > last || first >= self.entities.len() {
            return Ok(0);
        }
        let last = last.min(self.entities.len() - 1);
        let targets = self.entities[first..=last].to_vec();
        for &entity in &targets {
            self.replace_or_emplace_with(entity, ty, args.clone())?;
        }
        Ok(targets.len())
    }

    // -- Erase / remove --

    /// Detach the `ty` of `entity`. Absence is an error.
    pub fn erase(&mut self, entity: Entity, ty: ComponentTypeId) -> Result<ComponentRef, EngineError> {
        let Some(component) = self.sequence_mut(entity)?.remove(ty) else {
            return Err(self.missing(entity, ty));
        };
        self.pool.unindex(ty, entity);
        debug!(instance = %self.instance, %entity, component = component.name(), "component erased");
        Ok(component)
    }

    pub fn erase_many(&mut self, entity: Entity, types: &[ComponentTypeId]) -> Result<Vec<ComponentRef>, EngineError> {
        types.iter().map(|&ty| self.erase(entity, ty)).collect()
    }

    /// Detach the `ty` of `entity` if it has one.
    pub fn remove(&mut self, entity: Entity, ty: ComponentTypeId) -> Result<Option<ComponentRef>, EngineError> {
        if self.lookup(entity)?.is_some_and(|s| s.contains(ty)) {
            self.erase(entity, ty).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Detach whichever of `types` the entity holds.
    pub fn remove_many(&mut self, entity: Entity, types: &[ComponentTypeId]) -> Result<Vec<ComponentRef>, EngineError> {
        let mut removed = Vec::new();
        for &ty in types {
            removed.extend(self.remove(entity, ty)?);
        }
        Ok(removed)
    }

    /// Detach every component of `entity`, keeping the entity live.
    pub fn remove_all(&mut self, entity: Entity) -> Result<Vec<ComponentRef>, EngineError> {
        let removed = self.sequence_mut(entity)?.take_all();
        for component in &removed {
            self.pool.unindex(component.component_type(), entity);
        }
        debug!(instance = %self.instance, %entity, removed = removed.len(), "components cleared");
        Ok(removed)
    }

    /// Like [`Engine::remove_all`], returning only how many were detached.
    pub fn clear_entity(&mut self, entity: Entity) -> Result<usize, EngineError> {
        Ok(self.remove_all(entity)?.len())
    }

    /// Detach `ty` from every entity holding it.
    pub fn clear_type(&mut self, ty: ComponentTypeId) -> usize {
        let pairs = self.pool.remove_type(ty);
        for (entity, _) in &pairs {
            if let Some(sequence) = self.container.get_mut(entity) {
                sequence.remove(ty);
            }
        }
        debug!(instance = %self.instance, component = %self.type_name(ty), removed = pairs.len(), "component type cleared");
        pairs.len()
    }

    // -- Membership --

    pub fn has(&self, entity: Entity, ty: ComponentTypeId) -> Result<bool, EngineError> {
        Ok(self.lookup(entity)?.is_some_and(|s| s.contains(ty)))
    }

    /// Returns `true` if `entity` holds every one of `types`.
    pub fn has_all(&self, entity: Entity, types: &[ComponentTypeId]) -> Result<bool, EngineError> {
        Ok(self
            .lookup(entity)?
            .is_some_and(|s| types.iter().all(|&ty| s.contains(ty))))
    }

    /// Returns `true` if `entity` holds at least one of `types`.
    pub fn any(&self, entity: Entity, types: &[ComponentTypeId]) -> Result<bool, EngineError> {
        Ok(self
            .lookup(entity)?
            .is_some_and(|s| types.iter().any(|&ty| s.contains(ty))))
    }

    /// Returns `true` if `entity` holds this exact instance.
    pub fn holds(&self, entity: Entity, component: &ComponentRef) -> Result<bool, EngineError> {
        Ok(self.lookup(entity)?.is_some_and(|s| s.contains_ref(component)))
    }

    // -- Access --

    /// The `ty` of `entity`. Absence is an error.
    pub fn get(&self, entity: Entity, ty: ComponentTypeId) -> Result<ComponentRef, EngineError> {
        self.sequence(entity)?
            .get(ty)
            .cloned()
            .ok_or_else(|| self.missing(entity, ty))
    }

    /// The `ty` of `entity`, if present.
    pub fn try_get(&self, entity: Entity, ty: ComponentTypeId) -> Result<Option<ComponentRef>, EngineError> {
        Ok(self.lookup(entity)?.and_then(|s| s.get(ty)).cloned())
    }

    /// Every one of `types` on `entity`, in the order asked.
    pub fn get_many(&self, entity: Entity, types: &[ComponentTypeId]) -> Result<Vec<ComponentRef>, EngineError> {
        types.iter().map(|&ty| self.get(entity, ty)).collect()
    }

    /// Borrow the `T` of `entity`.
    pub fn get_as<T: Component>(&self, entity: Entity) -> Result<Ref<'_, T>, EngineError> {
        let ty = T::component_type_id();
        let component = self
            .sequence(entity)?
            .get(ty)
            .ok_or_else(|| self.missing(entity, ty))?;
        Ok(component.downcast_ref::<T>()?)
    }

    /// Mutably borrow the `T` of `entity`.
    pub fn get_mut_as<T: Component>(&self, entity: Entity) -> Result<RefMut<'_, T>, EngineError> {
        let ty = T::component_type_id();
        let component = self
            .sequence(entity)?
            .get(ty)
            .ok_or_else(|| self.missing(entity, ty))?;
        Ok(component.downcast_mut::<T>()?)
    }

    /// Mutate the `T` of `entity` in place.
    pub fn patch<T, F>(&self, entity: Entity, f: F) -> Result<(), EngineError>
    where
        T: Component,
        F: FnOnce(&mut T),
    {
        let mut value = self.get_mut_as::<T>(entity)?;
        f(&mut value);
        Ok(())
    }

    /// The `child` of `entity` if `child` is `parent` or one of its subtypes,
    /// `None` otherwise.
    pub fn get_if_family(
        &self,
        entity: Entity,
        parent: ComponentTypeId,
        child: ComponentTypeId,
    ) -> Result<Option<ComponentRef>, EngineError> {
        if !self.registry.is_subtype_of(child, parent) {
            return Ok(None);
        }
        self.get(entity, child).map(Some)
    }

    /// The components of `entity` in slot order.
    ///
    /// Iterating the returned sequence can be restarted at will. The engine
    /// cannot be mutated while it is borrowed.
    pub fn components(&self, entity: Entity) -> Result<&ComponentSequence, EngineError> {
        self.sequence(entity)
    }

    // -- Pool --

    /// Entities holding `ty`, in the order they received it.
    #[must_use]
    pub fn entities_of(&self, ty: ComponentTypeId) -> Vec<Entity> {
        self.pool.entities_of(ty)
    }

    /// Entity holding `component`, by identity, falling back to the entity
    /// that most recently received a component of the same type.
    #[must_use]
    pub fn owner_of(&self, component: &ComponentRef) -> Option<Entity> {
        self.pool.owner_of(component)
    }

    /// Returns `true` if the pool is an exact projection of the container:
    /// every held component is indexed under its type for its entity, the
    /// pool holds nothing else, and the entity list matches the container.
    #[must_use]
    pub fn check_consistency(&self) -> bool {
        if self.entities.len() != self.container.len()
            || !self.entities.iter().all(|e| self.container.contains_key(e))
        {
            return false;
        }
        let mut held = 0;
        for (&entity, sequence) in &self.container {
            for component in sequence {
                held += 1;
                let indexed = self
                    .pool
                    .get(component.component_type(), entity)
                    .is_some_and(|c| c.ptr_eq(component));
                if !indexed {
                    return false;
                }
            }
        }
        held == self.pool.len()
    }
}

#[cfg(test)]
mod tests {
    use aspect_component::{Args, Component, ComponentTypeId, Entity};
    use aspect_reflect::{Prim, TypeDescriptor};

    use crate::config::EngineConfig;
    use crate::engine::Engine;
    use crate::error::EngineError;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Tag(String);
    impl Component for Tag {
        fn type_name() -> &'static str {
            "Tag"
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Health(i64);
    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }
    }

    #[derive(Debug)]
    struct Owned(Option<Entity>);
    impl Component for Owned {
        fn type_name() -> &'static str {
            "Owned"
        }
    }

    fn tag() -> ComponentTypeId {
        Tag::component_type_id()
    }

    fn health() -> ComponentTypeId {
        Health::component_type_id()
    }

    fn engine() -> Engine {
        let mut engine = Engine::construct(
            EngineConfig::new().with_generator(aspect_component::GenerationPolicy::Incremental),
        )
        .unwrap();
        engine
            .register(
                TypeDescriptor::of::<Tag>()
                    .default_constructor()
                    .constructor(vec![Prim::String.into()], |a| Ok(Tag(a.str(0)?.to_owned()))),
            )
            .unwrap();
        engine
            .register(
                TypeDescriptor::of::<Health>()
                    .constructor(vec![Prim::I64.into()], |a| Ok(Health(a.i64(0)?))),
            )
            .unwrap();
        engine
            .register(TypeDescriptor::of::<Owned>().constructor(vec![], |a| Ok(Owned(a.owner()))))
            .unwrap();
        engine
    }

    #[test]
    fn test_emplace_then_get() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine.emplace_with(e, tag(), Args::new().with("Untagged")).unwrap();

        assert!(engine.has(e, tag()).unwrap());
        let c = engine.get(e, tag()).unwrap();
        assert_eq!(c.component_type(), tag());
        assert_eq!(engine.get_as::<Tag>(e).unwrap().0, "Untagged");
        assert!(engine.check_consistency());
    }

    #[test]
    fn test_emplace_duplicate_fails() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine.emplace(e, Health(3)).unwrap();
        let err = engine.emplace(e, Health(4)).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateComponent { ref component, .. } if component == "Health"));
        assert_eq!(engine.get_as::<Health>(e).unwrap().0, 3);
    }

    #[test]
    fn test_emplace_type_mismatch() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        let err = engine
            .emplace_as(e, health(), aspect_component::ComponentRef::new(Tag::default()))
            .unwrap_err();
        assert!(matches!(err, EngineError::TypeMismatch { .. }));
        assert_eq!(engine.component_count(e).unwrap(), 0);
    }

    #[test]
    fn test_emplace_on_dead_entity_fails() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine.destroy(e).unwrap();
        assert!(matches!(
            engine.emplace(e, Health(1)),
            Err(EngineError::InvalidEntity(_))
        ));
        assert!(matches!(
            engine.emplace(Entity::INVALID, Health(1)),
            Err(EngineError::InvalidEntity(_))
        ));
    }

    #[test]
    fn test_construction_errors_surface() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        let err = engine
            .emplace_with(e, health(), Args::new().with("ten"))
            .unwrap_err();
        assert!(matches!(err, EngineError::Construction(_)));
        assert!(!engine.has(e, health()).unwrap());
    }

    #[test]
    fn test_constructor_sees_owner() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine
            .emplace_with(e, Owned::component_type_id(), Args::NoArgs)
            .unwrap();
        assert_eq!(engine.get_as::<Owned>(e).unwrap().0, Some(e));
    }

    #[test]
    fn test_replace_keeps_slot_and_entity() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine.emplace(e, Health(1)).unwrap();
        engine.emplace(e, Tag("a".into())).unwrap();

        let old = engine.replace_with(e, health(), Args::new().with(50)).unwrap();
        assert_eq!(old.downcast_ref::<Health>().unwrap().0, 1);
        assert_eq!(engine.get_as::<Health>(e).unwrap().0, 50);
        let order: Vec<_> = engine.components(e).unwrap().types().collect();
        assert_eq!(order, vec![health(), tag()]);
        assert!(engine.check_consistency());
    }

    #[test]
    fn test_replace_missing_fails() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        assert!(matches!(
            engine.replace(e, Health(2)),
            Err(EngineError::MissingComponent { .. })
        ));
        assert!(matches!(
            engine.replace_with(e, health(), Args::new().with(2)),
            Err(EngineError::MissingComponent { .. })
        ));
    }

    #[test]
    fn test_replace_or_emplace() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine.replace_or_emplace(e, Health(1)).unwrap();
        engine.replace_or_emplace(e, Health(2)).unwrap();
        assert_eq!(engine.get_as::<Health>(e).unwrap().0, 2);

        let fresh = Entity(40);
        engine
            .replace_or_emplace_with(fresh, tag(), Args::new().with("late"))
            .unwrap();
        assert!(engine.contains(fresh));
        assert_eq!(engine.get_as::<Tag>(fresh).unwrap().0, "late");
        assert!(engine.check_consistency());
    }

    #[test]
    fn test_attached_instance_cannot_join_second_entity() {
        let mut engine = engine();
        let a = engine.create().unwrap();
        let b = engine.create().unwrap();
        let held = engine.emplace(a, Health(1)).unwrap();

        let err = engine.emplace_ref(b, held.clone()).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyAttached { entity, .. } if entity == a));
        assert!(!engine.has(b, health()).unwrap());

        engine.emplace(b, Health(2)).unwrap();
        assert!(matches!(
            engine.replace_ref(b, held.clone()),
            Err(EngineError::AlreadyAttached { .. })
        ));
        assert!(matches!(
            engine.replace_or_emplace_with(b, health(), Args::new().with(3)),
            Ok(_)
        ));

        engine.patch::<Health, _>(b, |h| h.0 = 99).unwrap();
        assert_eq!(engine.get_as::<Health>(a).unwrap().0, 1);
        assert_eq!(engine.owner_of(&held), Some(a));
        assert!(!engine.holds(b, &held).unwrap());
        assert!(engine.check_consistency());
    }

    #[test]
    fn test_detached_instance_moves_after_erase() {
        let mut engine = engine();
        let a = engine.create().unwrap();
        let b = engine.create().unwrap();
        let held = engine.emplace(a, Health(1)).unwrap();

        engine.replace_ref(a, held.clone()).unwrap();
        engine.erase(a, health()).unwrap();
        engine.emplace_ref(b, held.clone()).unwrap();
        assert_eq!(engine.owner_of(&held), Some(b));
        assert!(engine.check_consistency());
    }

    #[test]
    fn test_replace_or_emplace_failure_leaves_no_entity() {
        let mut engine = engine();
        let ghost = Entity(7);
        let err = engine
            .replace_or_emplace_with(ghost, health(), Args::new().with("bad"))
            .unwrap_err();
        assert!(matches!(err, EngineError::Construction(_)));
        assert!(!engine.contains(ghost));
        assert!(engine.is_empty());

        let mut limited = Engine::construct(EngineConfig::new().with_max_component_types(1)).unwrap();
        limited.replace_or_emplace(Entity(1), Health(1)).unwrap();
        assert!(matches!(
            limited.replace_or_emplace(Entity(2), Tag::default()),
            Err(EngineError::TooManyComponentTypes(1))
        ));
        assert!(!limited.contains(Entity(2)));
        assert_eq!(limited.len(), 1);
        assert!(limited.check_consistency());
    }

    #[test]
    fn test_erase_and_remove() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine.emplace(e, Health(1)).unwrap();

        engine.erase(e, health()).unwrap();
        assert!(!engine.has(e, health()).unwrap());
        assert!(matches!(
            engine.erase(e, health()),
            Err(EngineError::MissingComponent { .. })
        ));
        assert!(engine.remove(e, health()).unwrap().is_none());
        assert!(engine.check_consistency());
    }

    #[test]
    fn test_many_variants() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine
            .emplace_many(
                e,
                vec![(tag(), Args::new().with("x")), (health(), Args::new().with(9))],
            )
            .unwrap();
        assert!(engine.has_all(e, &[tag(), health()]).unwrap());

        engine
            .replace_many(e, vec![(health(), Args::new().with(10))])
            .unwrap();
        assert_eq!(engine.get_many(e, &[health()]).unwrap().len(), 1);

        let removed = engine.remove_many(e, &[health(), Owned::component_type_id()]).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(engine.erase_many(e, &[tag()]).unwrap().len(), 1);
        assert_eq!(engine.component_count(e).unwrap(), 0);
    }

    #[test]
    fn test_has_any_and_all() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine.emplace(e, Health(1)).unwrap();
        assert!(engine.any(e, &[tag(), health()]).unwrap());
        assert!(!engine.has_all(e, &[tag(), health()]).unwrap());
        assert!(!engine.any(e, &[tag()]).unwrap());
        assert!(engine.has_all(e, &[]).unwrap());
    }

    #[test]
    fn test_release_mode_membership_on_absent_entity() {
        let mut strict = engine();
        assert!(strict.has(Entity(99), tag()).is_err());
        assert!(strict.remove(Entity(99), tag()).is_err());

        let mut release = Engine::construct(EngineConfig::new().release()).unwrap();
        assert!(!release.has(Entity(99), tag()).unwrap());
        assert!(!release.any(Entity(99), &[tag()]).unwrap());
        assert!(release.try_get(Entity(99), tag()).unwrap().is_none());
        assert!(release.remove(Entity(99), tag()).unwrap().is_none());
        assert!(release.destroy(Entity(99)).is_err());
    }

    #[test]
    fn test_remove_all_and_clear() {
        let mut engine = engine();
        let a = engine.create().unwrap();
        let b = engine.create().unwrap();
        engine.emplace(a, Health(1)).unwrap();
        engine.emplace(a, Tag::default()).unwrap();
        engine.emplace(b, Health(2)).unwrap();

        assert_eq!(engine.clear_type(health()), 2);
        assert!(!engine.has(b, health()).unwrap());
        assert!(engine.has(a, tag()).unwrap());

        assert_eq!(engine.remove_all(a).unwrap().len(), 1);
        assert!(engine.contains(a));
        assert_eq!(engine.clear_entity(b).unwrap(), 0);
        assert!(engine.check_consistency());
    }

    #[test]
    fn test_get_or_emplace() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        let first = engine.get_or_emplace(e, || Health(1)).unwrap();
        let second = engine.get_or_emplace(e, || Health(2)).unwrap();
        assert!(first.ptr_eq(&second));

        let t = engine.get_or_emplace_with(e, tag(), Args::NoArgs).unwrap();
        assert_eq!(t.downcast_ref::<Tag>().unwrap().0, "");
    }

    #[test]
    fn test_patch_and_try_get() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine.emplace(e, Health(10)).unwrap();
        engine.patch::<Health, _>(e, |h| h.0 -= 3).unwrap();
        assert_eq!(engine.get_as::<Health>(e).unwrap().0, 7);
        assert!(engine.try_get(e, tag()).unwrap().is_none());
        assert!(matches!(
            engine.patch::<Tag, _>(e, |t| t.0.clear()),
            Err(EngineError::MissingComponent { .. })
        ));
    }

    #[test]
    fn test_get_if_family() {
        let mut engine = engine();
        engine.register(TypeDescriptor::family("Vital")).unwrap();
        #[derive(Debug)]
        struct Shield;
        impl Component for Shield {
            fn type_name() -> &'static str {
                "Shield"
            }
        }
        let vital = ComponentTypeId::from_name("Vital");
        engine
            .register(TypeDescriptor::of::<Shield>().extends(vital))
            .unwrap();

        let e = engine.create().unwrap();
        engine.emplace(e, Shield).unwrap();
        engine.emplace(e, Health(1)).unwrap();

        assert!(engine.get_if_family(e, vital, Shield::component_type_id()).unwrap().is_some());
        assert!(engine.get_if_family(e, vital, health()).unwrap().is_none());
    }

    #[test]
    fn test_assign_all_and_range() {
        let mut engine = engine();
        let ids = engine.create_many(4).unwrap();
        engine.emplace(ids[0], Health(100)).unwrap();

        assert_eq!(engine.assign_all(health(), Args::new().with(5)).unwrap(), 4);
        for &e in &ids {
            assert_eq!(engine.get_as::<Health>(e).unwrap().0, 5);
        }

        assert_eq!(engine.assign_range(tag(), 1, 2, Args::new().with("mid")).unwrap(), 2);
        assert_eq!(engine.view(tag()), vec![ids[1], ids[2]]);
        assert!(engine.check_consistency());
    }

    #[test]
    fn test_owner_of_and_entities_of() {
        let mut engine = engine();
        let a = engine.create().unwrap();
        let b = engine.create().unwrap();
        let ha = engine.emplace(a, Health(1)).unwrap();
        engine.emplace(b, Health(2)).unwrap();

        assert_eq!(engine.owner_of(&ha), Some(a));
        assert_eq!(
            engine.owner_of(&aspect_component::ComponentRef::new(Health(0))),
            Some(b)
        );
        assert_eq!(engine.entities_of(health()), vec![a, b]);
        assert!(engine.holds(a, &ha).unwrap());
        assert!(!engine.holds(b, &ha).unwrap());
    }

    #[test]
    fn test_component_type_limit() {
        let mut engine = Engine::construct(EngineConfig::new().with_max_component_types(1)).unwrap();
        let e = engine.create().unwrap();
        engine.emplace(e, Health(1)).unwrap();
        assert!(matches!(
            engine.emplace(e, Tag::default()),
            Err(EngineError::TooManyComponentTypes(1))
        ));
        assert_eq!(engine.component_count(e).unwrap(), 1);
        assert!(engine.check_consistency());
    }
}

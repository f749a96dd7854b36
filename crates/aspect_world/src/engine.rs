//! The [`Engine`] handle and entity lifecycle.
//!
//! An engine owns the live entity list, the per-entity component sequences
//! (the container), the [`TypePool`] derived from them, the type registry
//! used for construction and dispatch, and the pack table. Every mutation
//! goes through the engine so the container and the pool change together.

use std::collections::HashMap;

use aspect_component::{
    ComponentSequence, ComponentTypeId, Entity, EntityAllocator, GenerationPolicy,
};
use aspect_reflect::{TypeDescriptor, TypeRegistry};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ConfigError, EngineConfig, ValidationMode};
use crate::error::EngineError;
use crate::pack::Pack;
use crate::pool::TypePool;

/// A single-threaded entity/component store.
#[derive(Debug)]
pub struct Engine {
    /// Unique identifier of this engine instance, carried on every log event.
    pub(crate) instance: Uuid,
    pub(crate) config: EngineConfig,
    pub(crate) allocator: EntityAllocator,
    /// Live entities in iteration order.
    pub(crate) entities: Vec<Entity>,
    pub(crate) container: HashMap<Entity, ComponentSequence>,
    pub(crate) pool: TypePool,
    pub(crate) registry: TypeRegistry,
    /// Pack table indexed by `PackId`; released slots stay `None`.
    pub(crate) packs: Vec<Option<Pack>>,
}

impl Engine {
    /// Build an engine from a validated configuration.
    pub fn construct(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::construct_with(config, TypeRegistry::new())
    }

    /// Build an engine around an already populated type registry.
    pub fn construct_with(config: EngineConfig, registry: TypeRegistry) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, registry))
    }

    fn assemble(config: EngineConfig, registry: TypeRegistry) -> Self {
        let instance = Uuid::new_v4();
        let allocator = EntityAllocator::new(config.generator, config.entity_limit(), config.seed);
        info!(
            %instance,
            width = ?config.width,
            generator = ?config.generator,
            limit = config.entity_limit(),
            validation = ?config.validation,
            "engine constructed"
        );
        Self {
            instance,
            allocator,
            entities: Vec::new(),
            container: HashMap::new(),
            pool: TypePool::new(config.max_component_types),
            registry,
            packs: Vec::with_capacity(config.initial_pack_capacity),
            config,
        }
    }

    /// Destroy every entity and release the engine.
    pub fn deconstruct(mut self) {
        let destroyed = self.destroy_all();
        info!(instance = %self.instance, destroyed, "engine deconstructed");
    }

    #[must_use]
    pub fn instance_id(&self) -> Uuid {
        self.instance
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Register a component type or family for construction and dispatch.
    pub fn register(
        &mut self,
        descriptor: impl Into<TypeDescriptor>,
    ) -> Result<ComponentTypeId, EngineError> {
        Ok(self.registry.register(descriptor)?)
    }

    /// Registered name of `ty`, or its hex id when unregistered.
    pub(crate) fn type_name(&self, ty: ComponentTypeId) -> String {
        self.registry
            .name_of(ty)
            .map_or_else(|| ty.to_string(), str::to_owned)
    }

    // -- Validation --

    /// Returns `true` if `entity` is a well-formed identifier for this
    /// engine: not the sentinel, and inside the configured id range.
    #[must_use]
    pub fn is_valid(&self, entity: Entity) -> bool {
        entity.is_valid()
            && self.config.width.contains(entity)
            && entity.id() < self.config.entity_limit()
    }

    /// Returns `true` if `entity` is live.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.container.contains_key(&entity)
    }

    /// The sequence of a live entity, or [`EngineError::InvalidEntity`].
    pub(crate) fn sequence(&self, entity: Entity) -> Result<&ComponentSequence, EngineError> {
        if self.config.validation == ValidationMode::Strict && !self.is_valid(entity) {
            return Err(EngineError::InvalidEntity(entity));
        }
        self.container
            .get(&entity)
            .ok_or(EngineError::InvalidEntity(entity))
    }

    pub(crate) fn sequence_mut(
        &mut self,
        entity: Entity,
    ) -> Result<&mut ComponentSequence, EngineError> {
        if self.config.validation == ValidationMode::Strict && !self.is_valid(entity) {
            return Err(EngineError::InvalidEntity(entity));
        }
        self.container
            .get_mut(&entity)
            .ok_or(EngineError::InvalidEntity(entity))
    }

    /// Like [`Engine::sequence`], but in release mode an absent entity is
    /// `None` rather than an error.
    pub(crate) fn lookup(&self, entity: Entity) -> Result<Option<&ComponentSequence>, EngineError> {
        match self.config.validation {
            ValidationMode::Strict => self.sequence(entity).map(Some),
            ValidationMode::Release => Ok(self.container.get(&entity)),
        }
    }

    // -- Creation --

    /// Create a new entity with no components.
    ///
    /// Under random generation a draw that hits a live entity destroys that
    /// entity and draws again. Under incremental generation live ids (placed
    /// with [`Engine::insert`]) are skipped.
    pub fn create(&mut self) -> Result<Entity, EngineError> {
        let limit = self.config.entity_limit();
        if self.entities.len() as u64 >= limit {
            return Err(EngineError::CapacityExceeded(limit));
        }
        loop {
            let entity = self
                .allocator
                .allocate()
                .ok_or(EngineError::CapacityExceeded(limit))?;
            if !self.contains(entity) {
                self.register_entity(entity);
                debug!(instance = %self.instance, %entity, "entity created");
                return Ok(entity);
            }
            if self.allocator.policy() == GenerationPolicy::Random {
                warn!(
                    instance = %self.instance,
                    %entity,
                    "generated id is already live, destroying the existing entity"
                );
                self.release_entity(entity);
            }
        }
    }

    /// Create `count` entities.
    pub fn create_many(&mut self, count: usize) -> Result<Vec<Entity>, EngineError> {
        (0..count).map(|_| self.create()).collect()
    }

    /// Create an entity and run `init` on it.
    ///
    /// If `init` fails the entity is destroyed again and the error returned.
    pub fn create_with<F>(&mut self, init: F) -> Result<Entity, EngineError>
    where
        F: FnOnce(&mut Self, Entity) -> Result<(), EngineError>,
    {
        let entity = self.create()?;
        if let Err(e) = init(self, entity) {
            self.release_entity(entity);
            return Err(e);
        }
        Ok(entity)
    }

    /// Register a caller-chosen identifier as a live entity.
    pub fn insert(&mut self, entity: Entity) -> Result<Entity, EngineError> {
        if !self.is_valid(entity) {
            return Err(EngineError::InvalidEntity(entity));
        }
        if self.contains(entity) {
            return Err(EngineError::EntityExists(entity));
        }
        let limit = self.config.entity_limit();
        if self.entities.len() as u64 >= limit {
            return Err(EngineError::CapacityExceeded(limit));
        }
        self.register_entity(entity);
        debug!(instance = %self.instance, %entity, "entity inserted");
        Ok(entity)
    }

    fn register_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
        self.container.insert(entity, ComponentSequence::new());
    }

    // -- Destruction --

    /// Destroy a live entity, erasing all of its components first.
    pub fn destroy(&mut self, entity: Entity) -> Result<Entity, EngineError> {
        self.sequence(entity)?;
        self.release_entity(entity);
        debug!(instance = %self.instance, %entity, "entity destroyed");
        Ok(entity)
    }

    /// Destroy `entity`, then call `after` with it.
    pub fn destroy_with<F>(&mut self, entity: Entity, after: F) -> Result<Entity, EngineError>
    where
        F: FnOnce(Entity),
    {
        let entity = self.destroy(entity)?;
        after(entity);
        Ok(entity)
    }

    /// Destroy each entity in turn, stopping at the first that is not live.
    ///
    /// Entities before the failing one stay destroyed.
    pub fn destroy_many(&mut self, entities: &[Entity]) -> Result<usize, EngineError> {
        for &entity in entities {
            self.destroy(entity)?;
        }
        Ok(entities.len())
    }

    /// Destroy every entity. Returns how many were destroyed.
    pub fn destroy_all(&mut self) -> usize {
        let mut destroyed = 0;
        while let Some(&entity) = self.entities.last() {
            self.release_entity(entity);
            destroyed += 1;
        }
        if destroyed > 0 {
            info!(instance = %self.instance, destroyed, "all entities destroyed");
        }
        destroyed
    }

    /// Destroy the entities at iteration positions `first..=last`.
    ///
    /// Positions past the end are ignored. Returns how many were destroyed.
    pub fn destroy_in_range(&mut self, first: usize, last: usize) -> usize {
        if first > last || first >= self.entities.len() {
            return 0;
        }
        let last = last.min(self.entities.len() - 1);
        let doomed: Vec<Entity> = self.entities[first..=last].to_vec();
        for &entity in &doomed {
            self.release_entity(entity);
        }
        info!(instance = %self.instance, first, last, destroyed = doomed.len(), "entity range destroyed");
        doomed.len()
    }

    /// Destroy the first entity in iteration order.
    pub fn destroy_first(&mut self) -> Option<Entity> {
        let entity = *self.entities.first()?;
        self.release_entity(entity);
        debug!(instance = %self.instance, %entity, "entity destroyed");
        Some(entity)
    }

    /// Destroy the last entity in iteration order.
    pub fn destroy_last(&mut self) -> Option<Entity> {
        let entity = *self.entities.last()?;
        self.release_entity(entity);
        debug!(instance = %self.instance, %entity, "entity destroyed");
        Some(entity)
    }

    /// Erase every component of `entity` from the pool, then drop it from the
    /// container and the entity list and hand its id back to the allocator.
    pub(crate) fn release_entity(&mut self, entity: Entity) {
        if let Some(sequence) = self.container.get_mut(&entity) {
            for component in sequence.take_all() {
                self.pool.unindex(component.component_type(), entity);
            }
        }
        self.container.remove(&entity);
        if let Some(pos) = self.entities.iter().rposition(|&e| e == entity) {
            self.entities.remove(pos);
        }
        self.allocator.release(entity);
    }

    // -- Inspection --

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Live entities in iteration order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Iterate live entities; `.rev()` walks them backwards.
    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    /// Number of components attached to `entity`.
    pub fn component_count(&self, entity: Entity) -> Result<usize, EngineError> {
        Ok(self.sequence(entity)?.len())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::assemble(EngineConfig::default(), TypeRegistry::new())
    }
}

impl<'a> IntoIterator for &'a Engine {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

//! Entity identifiers and identifier generation.
//!
//! An [`Entity`] is a plain integer key with no inherent data. Identifiers are
//! drawn by an [`EntityAllocator`] whose [`GenerationPolicy`] and
//! [`EntityWidth`] are chosen when the engine is configured.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A unique entity identifier.
///
/// Entities are pure keys: components are attached to them to give them
/// meaning. Identifiers are only unique among currently-live entities; a
/// destroyed identifier can be handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u64);

impl Entity {
    /// The invalid entity sentinel. Never produced by an allocator.
    pub const INVALID: Entity = Entity(u64::MAX);

    /// Create an entity from a raw `u64` identifier.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` unless this is [`Entity::INVALID`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != u64::MAX
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "Entity({})", self.0)
        } else {
            f.write_str("Entity(INVALID)")
        }
    }
}

/// Integer width of entity identifiers.
///
/// The width bounds the identifier space: an engine configured for
/// [`EntityWidth::Int16`] never hands out an id that does not fit a signed
/// 16-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityWidth {
    /// 16-bit identifiers.
    Int16,
    /// 32-bit identifiers.
    #[default]
    Int32,
    /// 64-bit identifiers.
    Int64,
}

impl EntityWidth {
    /// Number of distinct identifiers available at this width (`signed max - 1`).
    #[must_use]
    pub const fn capacity(self) -> u64 {
        match self {
            Self::Int16 => i16::MAX as u64 - 1,
            Self::Int32 => i32::MAX as u64 - 1,
            Self::Int64 => i64::MAX as u64 - 1,
        }
    }

    /// Returns `true` if `entity` lies inside this width's identifier space.
    #[must_use]
    pub const fn contains(self, entity: Entity) -> bool {
        entity.0 < self.capacity()
    }
}

/// How fresh identifiers are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationPolicy {
    /// Uniform random draw in `[0, limit)`.
    #[default]
    Random,
    /// Monotonic counter starting at 0; released ids are recycled once the
    /// counter reaches the limit.
    Incremental,
}

/// Produces entity identifiers within `[0, limit)`.
///
/// The allocator does not know which ids are live. Under
/// [`GenerationPolicy::Random`] the caller is responsible for handling a draw
/// that collides with a live entity.
#[derive(Debug)]
pub struct EntityAllocator {
    policy: GenerationPolicy,
    limit: u64,
    next_id: u64,
    free: Vec<u64>,
    rng: StdRng,
}

impl EntityAllocator {
    /// Creates an allocator drawing ids below `limit`.
    ///
    /// `seed` makes random generation reproducible; without it the generator
    /// is seeded from OS entropy.
    #[must_use]
    pub fn new(policy: GenerationPolicy, limit: u64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            policy,
            limit,
            next_id: 0,
            free: Vec::new(),
            rng,
        }
    }

    /// The active generation policy.
    #[must_use]
    pub fn policy(&self) -> GenerationPolicy {
        self.policy
    }

    /// Exclusive upper bound of generated ids.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Draws the next identifier, or `None` once an incremental allocator has
    /// exhausted both its counter and its recycle list.
    pub fn allocate(&mut self) -> Option<Entity> {
        match self.policy {
            GenerationPolicy::Random => Some(Entity(self.rng.gen_range(0..self.limit))),
            GenerationPolicy::Incremental => {
                if self.next_id < self.limit {
                    let id = self.next_id;
                    self.next_id += 1;
                    Some(Entity(id))
                } else {
                    self.free.pop().map(Entity)
                }
            }
        }
    }

    /// Returns a destroyed identifier to the recycle pool.
    ///
    /// Random allocators draw from the whole space anyway, so only the
    /// incremental policy keeps a list.
    pub fn release(&mut self, entity: Entity) {
        if self.policy == GenerationPolicy::Incremental
            && entity.0 < self.next_id
            && !self.free.contains(&entity.0)
        {
            self.free.push(entity.0);
        }
    }

    /// Number of ids currently waiting for reuse.
    #[must_use]
    pub fn recycled(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_creation() {
        let e = Entity::from_raw(42);
        assert_eq!(e.id(), 42);
        assert!(e.is_valid());
    }

    #[test]
    fn test_entity_invalid() {
        assert!(!Entity::INVALID.is_valid());
        assert_eq!(Entity::INVALID.to_string(), "Entity(INVALID)");
    }

    #[test]
    fn test_width_capacity() {
        assert_eq!(EntityWidth::Int16.capacity(), 32_766);
        assert_eq!(EntityWidth::Int32.capacity(), 2_147_483_646);
        assert!(EntityWidth::Int16.contains(Entity(32_765)));
        assert!(!EntityWidth::Int16.contains(Entity(32_766)));
        assert!(!EntityWidth::Int64.contains(Entity::INVALID));
    }

    #[test]
    fn test_incremental_allocator_produces_sequential_ids() {
        let mut alloc = EntityAllocator::new(GenerationPolicy::Incremental, 10, None);
        let e0 = alloc.allocate().unwrap();
        let e1 = alloc.allocate().unwrap();
        let e2 = alloc.allocate().unwrap();
        assert_eq!((e0.id(), e1.id(), e2.id()), (0, 1, 2));
    }

    #[test]
    fn test_incremental_allocator_recycles_when_exhausted() {
        let mut alloc = EntityAllocator::new(GenerationPolicy::Incremental, 2, None);
        let e0 = alloc.allocate().unwrap();
        let _e1 = alloc.allocate().unwrap();
        assert!(alloc.allocate().is_none());

        alloc.release(e0);
        assert_eq!(alloc.recycled(), 1);
        assert_eq!(alloc.allocate(), Some(e0));
        assert!(alloc.allocate().is_none());
    }

    #[test]
    fn test_random_allocator_stays_in_range() {
        let mut alloc = EntityAllocator::new(GenerationPolicy::Random, 16, Some(7));
        for _ in 0..200 {
            let e = alloc.allocate().unwrap();
            assert!(e.id() < 16);
        }
    }

    #[test]
    fn test_random_allocator_is_reproducible_with_seed() {
        let mut a = EntityAllocator::new(GenerationPolicy::Random, 1_000, Some(99));
        let mut b = EntityAllocator::new(GenerationPolicy::Random, 1_000, Some(99));
        let xs: Vec<_> = (0..8).map(|_| a.allocate().unwrap()).collect();
        let ys: Vec<_> = (0..8).map(|_| b.allocate().unwrap()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_width_deserializes_lowercase() {
        let w: EntityWidth = serde_json::from_str("\"int16\"").unwrap();
        assert_eq!(w, EntityWidth::Int16);
        let p: GenerationPolicy = serde_json::from_str("\"incremental\"").unwrap();
        assert_eq!(p, GenerationPolicy::Incremental);
    }
}

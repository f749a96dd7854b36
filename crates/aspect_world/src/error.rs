use aspect_component::{AccessError, Entity};
use aspect_reflect::{ConstructionError, DispatchError, RegistryError};
use thiserror::Error;

use crate::pack::PackId;

/// Errors raised by [`Engine`](crate::Engine) operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid entity: {0}")]
    InvalidEntity(Entity),

    #[error("{entity} already has a {component} component")]
    DuplicateComponent { entity: Entity, component: String },

    #[error("{entity} has no {component} component")]
    MissingComponent { entity: Entity, component: String },

    #[error("component is a {found}, expected {expected}")]
    TypeMismatch { expected: String, found: String },

    #[error("component {component} is already attached to {entity}")]
    AlreadyAttached { entity: Entity, component: String },

    #[error("{0} is already live")]
    EntityExists(Entity),

    #[error("entity capacity of {0} reached")]
    CapacityExceeded(u64),

    #[error("component type limit of {0} reached")]
    TooManyComponentTypes(usize),

    #[error("no pack with id {0}")]
    UnknownPack(PackId),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Access(#[from] AccessError),
}

use aspect_component::{ArgError, ComponentTypeId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate type: {0}")]
    DuplicateType(String),
    #[error("unknown type referenced: {0}")]
    UnknownType(String),
}

/// Why a component could not be built from a descriptor and arguments.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("no type registered with id {0}")]
    UnknownType(ComponentTypeId),

    #[error("{0} has no constructors")]
    NoConstructors(String),

    #[error("{0} has no zero-argument constructor")]
    NoDefaultConstructor(String),

    #[error("no constructor of {ty} takes {given} argument(s); available: {}", .available.join(", "))]
    NoMatchingSignature {
        ty: String,
        given: usize,
        available: Vec<String>,
    },

    #[error("{ty}{signature}: argument {index} should be {expected}, got {found}")]
    ArgumentMismatch {
        ty: String,
        signature: String,
        index: usize,
        expected: String,
        found: String,
    },

    #[error("cannot build enclosing instance for {ty}: {source}")]
    Enclosing {
        ty: String,
        #[source]
        source: Box<ConstructionError>,
    },

    #[error("constructor of {ty}: {source}")]
    Argument {
        ty: String,
        #[source]
        source: ArgError,
    },

    #[error("constructor of {ty} failed: {message}")]
    Failed { ty: String, message: String },
}

/// Why a named operation could not be invoked.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no type registered with id {0}")]
    UnknownType(ComponentTypeId),

    #[error("{ty} has no operation named '{op}'")]
    UnknownOperation { ty: String, op: String },

    #[error("no overload of {ty}::{op} accepts ({})", .given.join(", "))]
    ArgumentMismatch {
        ty: String,
        op: String,
        given: Vec<String>,
    },

    #[error("{ty}::{op}: component is already borrowed")]
    Borrowed { ty: String, op: String },

    #[error("{ty}::{op}: {source}")]
    Argument {
        ty: String,
        op: String,
        #[source]
        source: ArgError,
    },

    #[error("{ty}::{op} failed: {message}")]
    Failed {
        ty: String,
        op: String,
        message: String,
    },
}

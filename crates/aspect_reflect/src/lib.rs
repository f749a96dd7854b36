//! # aspect_reflect
//!
//! Build and call components by runtime type.
//!
//! Each component type registers a [`TypeDescriptor`] listing its constructor
//! signatures and named operations as closures. [`ComponentFactory`] picks a
//! constructor for a runtime argument list; [`OperationDispatcher`] picks an
//! operation overload. Both report failures as typed errors.

pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod factory;
pub mod params;
pub mod registry;

pub use descriptor::{DescriptorBuilder, Operation, Signature, TypeDescriptor};
pub use dispatch::OperationDispatcher;
pub use error::{ConstructionError, DispatchError, RegistryError};
pub use factory::ComponentFactory;
pub use params::{CallArgs, CallError, ParamType, Prim};
pub use registry::TypeRegistry;

//! # aspect_world
//!
//! A single-threaded entity/component storage engine.
//!
//! An [`Engine`] tracks live [`Entity`] identifiers and attaches to each an
//! ordered sequence of type-erased components. A secondary [`TypePool`]
//! indexes the same components by type. Views and groups are recomputed from
//! the live entity list on every call, sorts permute that list, and packs
//! hold detached copies of component handles.
//!
//! Components can be attached directly as Rust values or built at runtime
//! from a registered [`TypeDescriptor`] and an [`Args`] list, and registered
//! operations can be invoked on them by name.
//!
//! ```rust
//! use aspect_world::{Args, Component, Engine, EngineConfig, Prim, TypeDescriptor};
//!
//! #[derive(Debug)]
//! struct Health(i64);
//!
//! impl Component for Health {
//!     fn type_name() -> &'static str {
//!         "Health"
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = Engine::construct(EngineConfig::new())?;
//! let health = engine.register(
//!     TypeDescriptor::of::<Health>()
//!         .constructor(vec![Prim::I64.into()], |a| Ok(Health(a.i64(0)?)))
//!         .operation("damage", vec![Prim::I64.into()], |h, a| {
//!             h.0 -= a.i64(0)?;
//!             Ok(())
//!         }),
//! )?;
//!
//! let e = engine.create()?;
//! engine.emplace_with(e, health, Args::new().with(100))?;
//! engine.invoke(e, health, "damage", &Args::new().with(30))?;
//! assert_eq!(engine.get_as::<Health>(e)?.0, 70);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod pack;
pub mod pool;
pub mod query;
pub mod sort;
pub mod store;

pub use config::{ConfigError, EngineConfig, ValidationMode};
pub use engine::Engine;
pub use error::EngineError;
pub use pack::{Pack, PackId};
pub use pool::TypePool;

pub use aspect_component::{
    AnyComponent, Arg, Args, Component, ComponentRef, ComponentSequence, ComponentTypeId, Entity,
    EntityWidth, GenerationPolicy, GroupQuery,
};
pub use aspect_reflect::{
    CallArgs, CallError, ConstructionError, DispatchError, ParamType, Prim, TypeDescriptor,
    TypeRegistry,
};

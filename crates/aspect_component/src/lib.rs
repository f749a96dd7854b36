//! # aspect_component
//!
//! Value-level building blocks of the aspect storage engine.
//!
//! This crate provides:
//!
//! - [`Entity`]: plain integer entity identifiers, plus the
//!   [`EntityAllocator`] that draws them under a [`GenerationPolicy`].
//! - [`Component`] trait and [`ComponentRef`], the shared type-erased handle
//!   every stored component lives behind.
//! - [`ComponentSequence`]: the ordered components of one entity.
//! - [`Arg`] / [`Args`]: argument values for runtime construction and
//!   dispatch.
//! - [`GroupQuery`]: required/excluded type filters for group scans.

pub mod component;
pub mod entity;
pub mod query;
pub mod sequence;
pub mod value;

pub use component::{AccessError, AnyComponent, Component, ComponentRef, ComponentTypeId};
pub use entity::{Entity, EntityAllocator, EntityWidth, GenerationPolicy};
pub use query::GroupQuery;
pub use sequence::ComponentSequence;
pub use value::{Arg, ArgError, Args};

//! Core [`Component`] trait and the shared, type-erased [`ComponentRef`]
//! handle the engine stores.
//!
//! ## Type Identity
//!
//! [`ComponentTypeId`] is derived from the component's **string name** using
//! the FNV-1a 64-bit hash algorithm. Types that exist only as descriptors
//! (families with no Rust type behind them) get their id the same way, so a
//! Rust type and a registered name always agree.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A unique identifier for a component type, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a type name.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// The core component trait.
///
/// Any `'static` value can be a component. Components live on one thread with
/// the engine that owns them, so there is no `Send` or `Sync` bound.
///
/// # Examples
///
/// ```rust
/// use aspect_component::Component;
///
/// #[derive(Debug, Clone)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
/// }
/// ```
pub trait Component: Any + fmt::Debug {
    /// A human-readable name for this component type.
    fn type_name() -> &'static str
    where
        Self: Sized;

    /// Returns the [`ComponentTypeId`] for this component.
    fn component_type_id() -> ComponentTypeId
    where
        Self: Sized,
    {
        ComponentTypeId::from_name(Self::type_name())
    }
}

/// Object-safe view of a [`Component`], implemented for every component.
pub trait AnyComponent: Any + fmt::Debug {
    /// Runtime type id of the concrete component.
    fn component_type(&self) -> ComponentTypeId;
    /// Runtime type name of the concrete component.
    fn component_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyComponent for T {
    fn component_type(&self) -> ComponentTypeId {
        T::component_type_id()
    }

    fn component_name(&self) -> &'static str {
        T::type_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Errors raised when accessing the value behind a [`ComponentRef`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The instance is not of the requested Rust type.
    #[error("component is a {found}, not a {expected}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    /// The instance is already borrowed in a conflicting way.
    #[error("component {0} is already borrowed")]
    Borrowed(&'static str),
}

/// A shared handle to one component instance.
///
/// Cloning the handle shares the instance. Two handles are the *same*
/// component only when [`ComponentRef::ptr_eq`] holds; equal values in
/// different instances are different components.
#[derive(Clone)]
pub struct ComponentRef {
    type_id: ComponentTypeId,
    name: &'static str,
    cell: Rc<RefCell<dyn AnyComponent>>,
}

impl ComponentRef {
    /// Wraps a freshly built component value.
    pub fn new<T: Component>(value: T) -> Self {
        let cell: Rc<RefCell<dyn AnyComponent>> = Rc::new(RefCell::new(value));
        Self {
            type_id: T::component_type_id(),
            name: T::type_name(),
            cell,
        }
    }

    /// Runtime type id of the wrapped instance.
    #[must_use]
    pub fn component_type(&self) -> ComponentTypeId {
        self.type_id
    }

    /// Runtime type name of the wrapped instance.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if both handles point at the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &ComponentRef) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.cell), Rc::as_ptr(&other.cell))
    }

    /// Returns `true` if the wrapped instance is exactly a `T`.
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.type_id == T::component_type_id()
    }

    pub fn borrow(&self) -> Result<Ref<'_, dyn AnyComponent>, AccessError> {
        self.cell
            .try_borrow()
            .map_err(|_| AccessError::Borrowed(self.name))
    }

    pub fn borrow_mut(&self) -> Result<RefMut<'_, dyn AnyComponent>, AccessError> {
        self.cell
            .try_borrow_mut()
            .map_err(|_| AccessError::Borrowed(self.name))
    }

    /// Borrows the instance as a concrete `T`.
    pub fn downcast_ref<T: Component>(&self) -> Result<Ref<'_, T>, AccessError> {
        let guard = self.borrow()?;
        Ref::filter_map(guard, |c| c.as_any().downcast_ref::<T>()).map_err(|_| {
            AccessError::WrongType {
                expected: T::type_name(),
                found: self.name,
            }
        })
    }

    /// Mutably borrows the instance as a concrete `T`.
    pub fn downcast_mut<T: Component>(&self) -> Result<RefMut<'_, T>, AccessError> {
        let guard = self.borrow_mut()?;
        RefMut::filter_map(guard, |c| c.as_any_mut().downcast_mut::<T>()).map_err(|_| {
            AccessError::WrongType {
                expected: T::type_name(),
                found: self.name,
            }
        })
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.try_borrow() {
            Ok(value) => write!(f, "ComponentRef({:?})", &*value),
            Err(_) => write!(f, "ComponentRef({} <borrowed>)", self.name),
        }
    }
}

//! The per-entity, ordered collection of component instances.

use crate::component::{ComponentRef, ComponentTypeId};

/// An ordered set of components attached to one entity.
///
/// Insertion order is kept for iteration. At most one component of each
/// runtime type is present; [`ComponentSequence::push`] does not check this,
/// the owning store does before calling it.
#[derive(Debug, Clone, Default)]
pub struct ComponentSequence {
    items: Vec<ComponentRef>,
}

impl ComponentSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Slot index of the component with runtime type `ty`.
    #[must_use]
    pub fn position(&self, ty: ComponentTypeId) -> Option<usize> {
        self.items.iter().position(|c| c.component_type() == ty)
    }

    #[must_use]
    pub fn get(&self, ty: ComponentTypeId) -> Option<&ComponentRef> {
        self.items.iter().find(|c| c.component_type() == ty)
    }

    #[must_use]
    pub fn contains(&self, ty: ComponentTypeId) -> bool {
        self.position(ty).is_some()
    }

    /// Returns `true` if this exact instance is held, compared by identity.
    #[must_use]
    pub fn contains_ref(&self, component: &ComponentRef) -> bool {
        self.items.iter().any(|c| c.ptr_eq(component))
    }

    pub fn push(&mut self, component: ComponentRef) {
        self.items.push(component);
    }

    /// Swaps the component in slot `index`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn replace_at(&mut self, index: usize, component: ComponentRef) -> ComponentRef {
        std::mem::replace(&mut self.items[index], component)
    }

    /// Removes the component of type `ty`, keeping the order of the rest.
    pub fn remove(&mut self, ty: ComponentTypeId) -> Option<ComponentRef> {
        let index = self.position(ty)?;
        Some(self.items.remove(index))
    }

    /// Removes and returns every component, leaving the sequence empty.
    pub fn take_all(&mut self) -> Vec<ComponentRef> {
        std::mem::take(&mut self.items)
    }

    /// Runtime types in slot order.
    pub fn types(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.items.iter().map(ComponentRef::component_type)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComponentRef> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a ComponentSequence {
    type Item = &'a ComponentRef;
    type IntoIter = std::slice::Iter<'a, ComponentRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

//! The registry of runtime type descriptors.

use std::collections::HashMap;

use aspect_component::ComponentTypeId;
use tracing::debug;

use crate::descriptor::TypeDescriptor;
use crate::error::RegistryError;

/// All registered component types and families, keyed by id.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<ComponentTypeId, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor.
    ///
    /// Supertypes and the enclosing type must already be registered, which
    /// also keeps the supertype graph acyclic.
    pub fn register(
        &mut self,
        descriptor: impl Into<TypeDescriptor>,
    ) -> Result<ComponentTypeId, RegistryError> {
        let descriptor = descriptor.into();
        if self.types.contains_key(&descriptor.id) {
            return Err(RegistryError::DuplicateType(descriptor.name));
        }
        for parent in &descriptor.parents {
            if !self.types.contains_key(parent) {
                return Err(RegistryError::UnknownType(format!(
                    "'{}' extends unregistered type {}",
                    descriptor.name, parent
                )));
            }
        }
        if let Some(enclosing) = descriptor.enclosing {
            if !self.types.contains_key(&enclosing) {
                return Err(RegistryError::UnknownType(format!(
                    "'{}' is nested in unregistered type {}",
                    descriptor.name, enclosing
                )));
            }
        }

        let id = descriptor.id;
        debug!(
            name = %descriptor.name,
            signatures = descriptor.signatures.len(),
            operations = descriptor.operations.len(),
            "type registered"
        );
        self.types.insert(id, descriptor);
        Ok(id)
    }

    pub fn get(&self, id: ComponentTypeId) -> Option<&TypeDescriptor> {
        self.types.get(&id)
    }

    /// Look a descriptor up by its registered name.
    pub fn get_by_name(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(&ComponentTypeId::from_name(name))
    }

    pub fn contains(&self, id: ComponentTypeId) -> bool {
        self.types.contains_key(&id)
    }

    pub fn name_of(&self, id: ComponentTypeId) -> Option<&str> {
        self.types.get(&id).map(|d| d.name.as_str())
    }

    /// Returns `true` if `child` is `ancestor` or transitively extends it.
    ///
    /// An unregistered `child` is only a subtype of itself.
    pub fn is_subtype_of(&self, child: ComponentTypeId, ancestor: ComponentTypeId) -> bool {
        if child == ancestor {
            return true;
        }
        let mut pending = vec![child];
        while let Some(ty) = pending.pop() {
            let Some(desc) = self.types.get(&ty) else {
                continue;
            };
            for &parent in &desc.parents {
                if parent == ancestor {
                    return true;
                }
                pending.push(parent);
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// List all registered type names.
    pub fn type_names(&self) -> Vec<&str> {
        self.types.values().map(|d| d.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspect_component::Component;

    #[derive(Debug, Default)]
    struct Sprite;
    impl Component for Sprite {
        fn type_name() -> &'static str {
            "Sprite"
        }
    }

    #[derive(Debug, Default)]
    struct AnimatedSprite;
    impl Component for AnimatedSprite {
        fn type_name() -> &'static str {
            "AnimatedSprite"
        }
    }

    fn renderable() -> ComponentTypeId {
        ComponentTypeId::from_name("Renderable")
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = TypeRegistry::new();
        let id = registry
            .register(TypeDescriptor::of::<Sprite>().default_constructor())
            .unwrap();
        assert_eq!(id, Sprite::component_type_id());
        assert_eq!(registry.name_of(id), Some("Sprite"));
        assert!(registry.get_by_name("Sprite").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDescriptor::of::<Sprite>()).unwrap();
        let err = registry.register(TypeDescriptor::of::<Sprite>()).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateType("Sprite".into()));
    }

    #[test]
    fn test_unregistered_parent_fails() {
        let mut registry = TypeRegistry::new();
        let err = registry
            .register(TypeDescriptor::of::<Sprite>().extends(renderable()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownType(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregistered_enclosing_fails() {
        let mut registry = TypeRegistry::new();
        let err = registry
            .register(TypeDescriptor::of::<AnimatedSprite>().nested_in(Sprite::component_type_id()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownType(_)));
    }

    #[test]
    fn test_subtype_is_transitive() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDescriptor::family("Renderable")).unwrap();
        registry
            .register(TypeDescriptor::of::<Sprite>().extends(renderable()))
            .unwrap();
        registry
            .register(TypeDescriptor::of::<AnimatedSprite>().extends(Sprite::component_type_id()))
            .unwrap();

        let animated = AnimatedSprite::component_type_id();
        assert!(registry.is_subtype_of(animated, renderable()));
        assert!(registry.is_subtype_of(animated, Sprite::component_type_id()));
        assert!(registry.is_subtype_of(animated, animated));
        assert!(!registry.is_subtype_of(renderable(), animated));
        assert!(!registry.is_subtype_of(Sprite::component_type_id(), animated));
    }
}

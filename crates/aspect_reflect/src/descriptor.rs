//! Runtime type descriptors.
//!
//! A [`TypeDescriptor`] is everything the engine knows about a component type
//! at runtime: its name and id, the types it is a subtype of, the type it is
//! nested inside, the constructor signatures it can be built from, and the
//! named operations that can be invoked on it. Descriptors are registered
//! explicitly; nothing is discovered by inspection.

use std::fmt;
use std::marker::PhantomData;

use aspect_component::{Component, ComponentRef, ComponentTypeId};

use crate::params::{CallArgs, CallError, ParamType};
use crate::registry::TypeRegistry;

type BuildFn = Box<dyn Fn(&CallArgs<'_>) -> Result<ComponentRef, CallError>>;
type OperationFn = Box<dyn Fn(&ComponentRef, &CallArgs<'_>) -> Result<(), CallError>>;

/// One way of constructing a component.
pub struct Signature {
    /// Declared parameters. For nested types the first parameter is the
    /// enclosing instance.
    pub params: Vec<ParamType>,
    build: BuildFn,
}

impl Signature {
    pub(crate) fn call(&self, args: &CallArgs<'_>) -> Result<ComponentRef, CallError> {
        (self.build)(args)
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Renders the parameter list, e.g. `(f32, string)`.
    #[must_use]
    pub fn describe(&self, registry: &TypeRegistry) -> String {
        describe_params(&self.params, registry)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A named operation invocable on a component.
pub struct Operation {
    pub name: String,
    pub params: Vec<ParamType>,
    call: OperationFn,
}

impl Operation {
    pub(crate) fn call(&self, target: &ComponentRef, args: &CallArgs<'_>) -> Result<(), CallError> {
        (self.call)(target, args)
    }

    #[must_use]
    pub fn describe(&self, registry: &TypeRegistry) -> String {
        format!("{}{}", self.name, describe_params(&self.params, registry))
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

fn describe_params(params: &[ParamType], registry: &TypeRegistry) -> String {
    let parts: Vec<String> = params.iter().map(|p| p.describe(registry)).collect();
    format!("({})", parts.join(", "))
}

/// Runtime description of a component type.
#[derive(Debug)]
pub struct TypeDescriptor {
    pub id: ComponentTypeId,
    pub name: String,
    /// Direct supertypes. Must be registered before this type.
    pub parents: Vec<ComponentTypeId>,
    /// Enclosing type whose instance every constructor receives first.
    pub enclosing: Option<ComponentTypeId>,
    /// Constructor signatures in declaration order.
    pub signatures: Vec<Signature>,
    pub operations: Vec<Operation>,
}

impl TypeDescriptor {
    /// Start describing the Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> DescriptorBuilder<T> {
        DescriptorBuilder {
            desc: Self::bare(T::component_type_id(), T::type_name().to_owned()),
            _marker: PhantomData,
        }
    }

    /// A family: a named supertype with no Rust type and no constructors.
    ///
    /// Families only exist so that other types can extend them and queries can
    /// select every member at once.
    #[must_use]
    pub fn family(name: &str) -> Self {
        Self::bare(ComponentTypeId::from_name(name), name.to_owned())
    }

    /// Declare a supertype.
    #[must_use]
    pub fn extends(mut self, parent: ComponentTypeId) -> Self {
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
        self
    }

    fn bare(id: ComponentTypeId, name: String) -> Self {
        Self {
            id,
            name,
            parents: Vec::new(),
            enclosing: None,
            signatures: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Returns `true` for descriptors built through [`TypeDescriptor::family`]
    /// or otherwise lacking any constructor.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Number of parameters injected ahead of the caller's arguments.
    #[must_use]
    pub fn implicit_params(&self) -> usize {
        usize::from(self.enclosing.is_some())
    }

    /// Operations registered under `name`, in declaration order.
    pub fn operations_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Operation> + 'a {
        self.operations.iter().filter(move |op| op.name == name)
    }
}

/// Typed builder for a [`TypeDescriptor`] describing `T`.
///
/// ```rust
/// use aspect_component::Component;
/// use aspect_reflect::{Prim, TypeDescriptor};
///
/// #[derive(Debug, Default)]
/// struct Speed(f64);
/// impl Component for Speed {
///     fn type_name() -> &'static str { "Speed" }
/// }
///
/// let desc: TypeDescriptor = TypeDescriptor::of::<Speed>()
///     .default_constructor()
///     .constructor(vec![Prim::F64.into()], |args| Ok(Speed(args.f64(0)?)))
///     .operation("scale", vec![Prim::F64.into()], |speed, args| {
///         speed.0 *= args.f64(0)?;
///         Ok(())
///     })
///     .build();
/// assert_eq!(desc.signatures.len(), 2);
/// ```
#[must_use]
pub struct DescriptorBuilder<T: Component> {
    desc: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> DescriptorBuilder<T> {
    /// Declare a supertype.
    pub fn extends(mut self, parent: ComponentTypeId) -> Self {
        self.desc = self.desc.extends(parent);
        self
    }

    /// Mark `T` as nested inside `enclosing`.
    ///
    /// Every constructor then receives a freshly built enclosing instance as
    /// argument 0, ahead of the caller's arguments, and its declared parameter
    /// list gains a leading [`ParamType::Named`] for it.
    pub fn nested_in(mut self, enclosing: ComponentTypeId) -> Self {
        self.desc.enclosing = Some(enclosing);
        self
    }

    /// Add a constructor signature.
    pub fn constructor<F>(mut self, params: Vec<ParamType>, build: F) -> Self
    where
        F: Fn(&CallArgs<'_>) -> Result<T, CallError> + 'static,
    {
        let erased: BuildFn = Box::new(move |args: &CallArgs<'_>| build(args).map(ComponentRef::new));
        self.desc.signatures.push(Signature {
            params,
            build: erased,
        });
        self
    }

    /// Add a zero-parameter constructor using `T::default()`.
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(Vec::new(), |_| Ok(T::default()))
    }

    /// Add a named operation.
    pub fn operation<F>(mut self, name: &str, params: Vec<ParamType>, op: F) -> Self
    where
        F: Fn(&mut T, &CallArgs<'_>) -> Result<(), CallError> + 'static,
    {
        let call: OperationFn = Box::new(move |target: &ComponentRef, args: &CallArgs<'_>| {
            let mut this = target.downcast_mut::<T>()?;
            op(&mut this, args)
        });
        self.desc.operations.push(Operation {
            name: name.to_owned(),
            params,
            call,
        });
        self
    }

    /// Finish the descriptor.
    pub fn build(mut self) -> TypeDescriptor {
        if let Some(enclosing) = self.desc.enclosing {
            for sig in &mut self.desc.signatures {
                sig.params.insert(0, ParamType::Named(enclosing));
            }
        }
        self.desc
    }
}

impl<T: Component> From<DescriptorBuilder<T>> for TypeDescriptor {
    fn from(builder: DescriptorBuilder<T>) -> Self {
        builder.build()
    }
}

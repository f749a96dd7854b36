//! Constructor resolution: descriptor + arguments -> component instance.

use aspect_component::{Arg, Args, ComponentRef, ComponentTypeId, Entity};
use tracing::trace;

use crate::descriptor::{Signature, TypeDescriptor};
use crate::error::ConstructionError;
use crate::params::{CallArgs, CallError};
use crate::registry::TypeRegistry;

/// Builds components from registered descriptors.
///
/// Resolution rules:
///
/// 1. [`Args::NoArgs`] selects the signature with no caller parameters.
/// 2. Otherwise signatures are tried in declaration order; one is a candidate
///    when its arity equals the argument count (plus one for nested types).
/// 3. A candidate is chosen when every argument is accepted by its parameter
///    type. A rejected argument moves on to the next signature, except on the
///    last declared signature, where it is reported as
///    [`ConstructionError::ArgumentMismatch`].
/// 4. For nested types the enclosing instance is built first with its own
///    zero-argument constructor (recursively, outermost first) and passed as
///    argument 0.
#[derive(Debug, Clone, Copy)]
pub struct ComponentFactory<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> ComponentFactory<'r> {
    #[must_use]
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Construct an instance of `ty` from `args`.
    ///
    /// `owner` is made available to the constructor through
    /// [`CallArgs::owner`].
    pub fn construct(
        &self,
        ty: ComponentTypeId,
        args: Args,
        owner: Option<Entity>,
    ) -> Result<ComponentRef, ConstructionError> {
        let desc = self
            .registry
            .get(ty)
            .ok_or(ConstructionError::UnknownType(ty))?;
        if desc.signatures.is_empty() {
            return Err(ConstructionError::NoConstructors(desc.name.clone()));
        }

        let no_args = args.is_no_args();
        let mut bound = args.into_vec();
        if let Some(enclosing) = desc.enclosing {
            let outer = self
                .construct(enclosing, Args::NoArgs, owner)
                .map_err(|e| ConstructionError::Enclosing {
                    ty: desc.name.clone(),
                    source: Box::new(e),
                })?;
            bound.insert(0, Arg::Component(outer));
        }

        let sig = if no_args {
            self.default_signature(desc)?
        } else {
            self.resolve(desc, &bound)?
        };

        trace!(ty = %desc.name, signature = %sig.describe(self.registry), "constructing component");
        sig.call(&CallArgs::new(&bound, owner))
            .map_err(|e| call_error(&desc.name, e))
    }

    fn default_signature<'d>(
        &self,
        desc: &'d TypeDescriptor,
    ) -> Result<&'d Signature, ConstructionError> {
        let implicit = desc.implicit_params();
        desc.signatures
            .iter()
            .find(|s| s.arity() == implicit)
            .ok_or_else(|| ConstructionError::NoDefaultConstructor(desc.name.clone()))
    }

    fn resolve<'d>(
        &self,
        desc: &'d TypeDescriptor,
        bound: &[Arg],
    ) -> Result<&'d Signature, ConstructionError> {
        let last = desc.signatures.len() - 1;
        for (i, sig) in desc.signatures.iter().enumerate() {
            if sig.arity() != bound.len() {
                continue;
            }
            let rejected = sig
                .params
                .iter()
                .zip(bound)
                .position(|(param, arg)| !param.accepts(arg, self.registry));
            match rejected {
                None => return Ok(sig),
                Some(index) if i == last => {
                    return Err(ConstructionError::ArgumentMismatch {
                        ty: desc.name.clone(),
                        signature: sig.describe(self.registry),
                        index,
                        expected: sig.params[index].describe(self.registry),
                        found: bound[index].describe(),
                    });
                }
                Some(_) => {}
            }
        }

        Err(ConstructionError::NoMatchingSignature {
            ty: desc.name.clone(),
            given: bound.len() - desc.implicit_params(),
            available: desc
                .signatures
                .iter()
                .map(|s| s.describe(self.registry))
                .collect(),
        })
    }
}

fn call_error(ty: &str, e: CallError) -> ConstructionError {
    match e {
        CallError::Argument(source) => ConstructionError::Argument {
            ty: ty.to_owned(),
            source,
        },
        other => ConstructionError::Failed {
            ty: ty.to_owned(),
            message: other.to_string(),
        },
    }
}

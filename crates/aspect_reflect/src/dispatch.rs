//! Named operation dispatch on type-erased components.

use aspect_component::{AccessError, Args, ComponentRef};
use tracing::trace;

use crate::error::DispatchError;
use crate::params::{CallArgs, CallError};
use crate::registry::TypeRegistry;

/// Invokes operations registered on a component's runtime type.
///
/// Overloads sharing a name are tried in declaration order; the first whose
/// arity matches and whose parameters accept every argument is called.
/// Operations are looked up on the runtime type only, never on supertypes.
#[derive(Debug, Clone, Copy)]
pub struct OperationDispatcher<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> OperationDispatcher<'r> {
    #[must_use]
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Returns `true` if `component` has at least one overload named `op`.
    #[must_use]
    pub fn supports(&self, component: &ComponentRef, op: &str) -> bool {
        self.registry
            .get(component.component_type())
            .is_some_and(|d| d.operations_named(op).next().is_some())
    }

    pub fn invoke(&self, component: &ComponentRef, op: &str, args: &Args) -> Result<(), DispatchError> {
        let ty = component.component_type();
        let desc = self.registry.get(ty).ok_or(DispatchError::UnknownType(ty))?;

        let mut overloads = desc.operations_named(op).peekable();
        if overloads.peek().is_none() {
            return Err(DispatchError::UnknownOperation {
                ty: desc.name.clone(),
                op: op.to_owned(),
            });
        }

        let given = args.as_slice();
        let chosen = overloads.find(|o| {
            o.params.len() == given.len()
                && o.params
                    .iter()
                    .zip(given)
                    .all(|(param, arg)| param.accepts(arg, self.registry))
        });
        let Some(operation) = chosen else {
            return Err(DispatchError::ArgumentMismatch {
                ty: desc.name.clone(),
                op: op.to_owned(),
                given: given.iter().map(|a| a.describe()).collect(),
            });
        };

        trace!(ty = %desc.name, op = %operation.describe(self.registry), "dispatching operation");
        operation
            .call(component, &CallArgs::new(given, None))
            .map_err(|e| match e {
                CallError::Access(AccessError::Borrowed(_)) => DispatchError::Borrowed {
                    ty: desc.name.clone(),
                    op: op.to_owned(),
                },
                CallError::Argument(source) => DispatchError::Argument {
                    ty: desc.name.clone(),
                    op: op.to_owned(),
                    source,
                },
                other => DispatchError::Failed {
                    ty: desc.name.clone(),
                    op: op.to_owned(),
                    message: other.to_string(),
                },
            })
    }
}

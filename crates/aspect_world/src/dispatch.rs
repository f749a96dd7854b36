//! Named operation calls on entities' components.

use aspect_component::{Args, ComponentRef, ComponentTypeId, Entity};
use aspect_reflect::OperationDispatcher;
use tracing::trace;

use crate::engine::Engine;
use crate::error::EngineError;

impl Engine {
    fn dispatcher(&self) -> OperationDispatcher<'_> {
        OperationDispatcher::new(&self.registry)
    }

    /// Invoke `op` on the `ty` component of `entity`.
    pub fn invoke(&self, entity: Entity, ty: ComponentTypeId, op: &str, args: &Args) -> Result<(), EngineError> {
        let component = self.get(entity, ty)?;
        self.invoke_component(&component, op, args)
    }

    /// Invoke `op` on each of the `types` components of `entity`, in order.
    ///
    /// Stops at the first failure; earlier calls are not undone.
    pub fn invoke_each(
        &self,
        entity: Entity,
        types: &[ComponentTypeId],
        op: &str,
        args: &Args,
    ) -> Result<(), EngineError> {
        for component in self.get_many(entity, types)? {
            self.invoke_component(&component, op, args)?;
        }
        Ok(())
    }

    /// Invoke `op` on every component of `entity` whose runtime type is
    /// `family` or one of its registered subtypes. Returns how many were
    /// called.
    pub fn invoke_family(
        &self,
        entity: Entity,
        family: ComponentTypeId,
        op: &str,
        args: &Args,
    ) -> Result<usize, EngineError> {
        let members: Vec<ComponentRef> = self
            .sequence(entity)?
            .iter()
            .filter(|c| self.registry.is_subtype_of(c.component_type(), family))
            .cloned()
            .collect();
        trace!(instance = %self.instance, %entity, family = %self.type_name(family), members = members.len(), op, "family dispatch");
        for component in &members {
            self.invoke_component(component, op, args)?;
        }
        Ok(members.len())
    }

    /// Invoke `op` on a component handle, attached or not.
    pub fn invoke_component(&self, component: &ComponentRef, op: &str, args: &Args) -> Result<(), EngineError> {
        Ok(self.dispatcher().invoke(component, op, args)?)
    }
}

#[cfg(test)]
mod tests {
    use aspect_component::{Args, Component, ComponentTypeId, GenerationPolicy};
    use aspect_reflect::{DispatchError, ParamType, Prim, TypeDescriptor};

    use crate::config::EngineConfig;
    use crate::engine::Engine;
    use crate::error::EngineError;

    #[derive(Debug, Default)]
    struct Counter(i64);
    impl Component for Counter {
        fn type_name() -> &'static str {
            "Counter"
        }
    }

    #[derive(Debug, Default)]
    struct Gauge(f64);
    impl Component for Gauge {
        fn type_name() -> &'static str {
            "Gauge"
        }
    }

    #[derive(Debug)]
    struct Label(String);
    impl Component for Label {
        fn type_name() -> &'static str {
            "Label"
        }
    }

    fn metric() -> ComponentTypeId {
        ComponentTypeId::from_name("Metric")
    }

    fn engine() -> Engine {
        let mut engine =
            Engine::construct(EngineConfig::new().with_generator(GenerationPolicy::Incremental)).unwrap();
        engine.register(TypeDescriptor::family("Metric")).unwrap();
        engine
            .register(
                TypeDescriptor::of::<Counter>()
                    .extends(metric())
                    .operation("add", vec![Prim::I64.into()], |c, a| {
                        c.0 += a.i64(0)?;
                        Ok(())
                    })
                    .operation("reset", vec![], |c, _| {
                        c.0 = 0;
                        Ok(())
                    }),
            )
            .unwrap();
        engine
            .register(
                TypeDescriptor::of::<Gauge>()
                    .extends(metric())
                    .operation("add", vec![Prim::F64.into()], |g, a| {
                        g.0 += a.f64(0)?;
                        Ok(())
                    })
                    .operation("reset", vec![], |g, _| {
                        g.0 = 0.0;
                        Ok(())
                    }),
            )
            .unwrap();
        engine
            .register(
                TypeDescriptor::of::<Label>().operation("reset", vec![ParamType::Any], |l, _| {
                    l.0.clear();
                    Ok(())
                }),
            )
            .unwrap();
        engine
    }

    #[test]
    fn test_invoke_on_entity_component() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine.emplace(e, Counter(1)).unwrap();
        engine
            .invoke(e, Counter::component_type_id(), "add", &Args::new().with(4))
            .unwrap();
        assert_eq!(engine.get_as::<Counter>(e).unwrap().0, 5);
    }

    #[test]
    fn test_invoke_errors() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine.emplace(e, Counter(1)).unwrap();
        let counter = Counter::component_type_id();

        assert!(matches!(
            engine.invoke(e, counter, "scale", &Args::new()),
            Err(EngineError::Dispatch(DispatchError::UnknownOperation { .. }))
        ));
        assert!(matches!(
            engine.invoke(e, counter, "add", &Args::new().with("x")),
            Err(EngineError::Dispatch(DispatchError::ArgumentMismatch { .. }))
        ));
        assert!(matches!(
            engine.invoke(e, Gauge::component_type_id(), "add", &Args::new().with(1.0)),
            Err(EngineError::MissingComponent { .. })
        ));
    }

    #[test]
    fn test_invoke_each() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine.emplace(e, Counter(3)).unwrap();
        engine.emplace(e, Gauge(2.5)).unwrap();
        engine
            .invoke_each(
                e,
                &[Counter::component_type_id(), Gauge::component_type_id()],
                "reset",
                &Args::new(),
            )
            .unwrap();
        assert_eq!(engine.get_as::<Counter>(e).unwrap().0, 0);
        assert_eq!(engine.get_as::<Gauge>(e).unwrap().0, 0.0);
    }

    #[test]
    fn test_invoke_family_skips_non_members() {
        let mut engine = engine();
        let e = engine.create().unwrap();
        engine.emplace(e, Counter(3)).unwrap();
        engine.emplace(e, Label("x".into())).unwrap();
        engine.emplace(e, Gauge(1.0)).unwrap();

        let called = engine.invoke_family(e, metric(), "reset", &Args::new()).unwrap();
        assert_eq!(called, 2);
        assert_eq!(engine.get_as::<Label>(e).unwrap().0, "x");
    }

    #[test]
    fn test_invoke_detached_component() {
        let engine = engine();
        let loose = aspect_component::ComponentRef::new(Counter(0));
        engine.invoke_component(&loose, "add", &Args::new().with(2)).unwrap();
        assert_eq!(loose.downcast_ref::<Counter>().unwrap().0, 2);
    }
}

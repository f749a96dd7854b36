//! Parameter types, compatibility rules, and the positional argument view
//! handed to constructor and operation closures.

use std::cell::{Ref, RefMut};

use aspect_component::{AccessError, Arg, ArgError, Component, ComponentRef, ComponentTypeId, Entity};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::registry::TypeRegistry;

/// Primitive parameter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prim {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
}

impl Prim {
    /// Parse a primitive from its schema name (`"i32"`, `"string"`, ...).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "string" => Self::String,
            _ => return None,
        })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
        }
    }

    /// Returns `true` if `value` can be passed where this primitive is
    /// expected.
    ///
    /// Integers must fit the declared width. Float parameters accept any
    /// number, integers included.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        fn signed(value: &Value, min: i64, max: i64) -> bool {
            value.as_i64().is_some_and(|v| (min..=max).contains(&v))
        }
        fn unsigned(value: &Value, max: u64) -> bool {
            value.as_u64().is_some_and(|v| v <= max)
        }

        match self {
            Self::Bool => value.is_boolean(),
            Self::I8 => signed(value, i8::MIN.into(), i8::MAX.into()),
            Self::I16 => signed(value, i16::MIN.into(), i16::MAX.into()),
            Self::I32 => signed(value, i32::MIN.into(), i32::MAX.into()),
            Self::I64 => value.is_i64(),
            Self::U8 => unsigned(value, u8::MAX.into()),
            Self::U16 => unsigned(value, u16::MAX.into()),
            Self::U32 => unsigned(value, u32::MAX.into()),
            Self::U64 => value.is_u64(),
            Self::F32 | Self::F64 => value.is_number(),
            Self::String => value.is_string(),
        }
    }
}

/// The declared type of one constructor or operation parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Primitive(Prim),
    /// A component instance whose runtime type is this type or a subtype of
    /// it.
    Named(ComponentTypeId),
    List(Box<ParamType>),
    Option(Box<ParamType>),
    /// A JSON object whose values all match the inner type.
    Map(Box<ParamType>),
    /// Any argument at all.
    Any,
}

impl ParamType {
    /// Shorthand for a component parameter of Rust type `T`.
    #[must_use]
    pub fn component<T: Component>() -> Self {
        Self::Named(T::component_type_id())
    }

    /// Returns `true` if `arg` can be bound to a parameter of this type.
    #[must_use]
    pub fn accepts(&self, arg: &Arg, registry: &TypeRegistry) -> bool {
        match (self, arg) {
            (Self::Any, _) => true,
            (Self::Named(expected), Arg::Component(c)) => {
                registry.is_subtype_of(c.component_type(), *expected)
            }
            (Self::Named(_), Arg::Value(_)) => false,
            (Self::Option(_), Arg::Value(Value::Null)) => true,
            (Self::Option(inner), _) => inner.accepts(arg, registry),
            (_, Arg::Component(_)) => false,
            (_, Arg::Value(v)) => self.accepts_value(v),
        }
    }

    fn accepts_value(&self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Primitive(p) => p.accepts(value),
            Self::Named(_) => false,
            Self::List(inner) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| inner.accepts_value(v))),
            Self::Option(inner) => value.is_null() || inner.accepts_value(value),
            Self::Map(inner) => value
                .as_object()
                .is_some_and(|m| m.values().all(|v| inner.accepts_value(v))),
        }
    }

    /// Human-readable form, resolving component names through `registry`.
    #[must_use]
    pub fn describe(&self, registry: &TypeRegistry) -> String {
        match self {
            Self::Primitive(p) => p.name().to_owned(),
            Self::Named(id) => registry
                .name_of(*id)
                .map_or_else(|| id.to_string(), str::to_owned),
            Self::List(inner) => format!("list<{}>", inner.describe(registry)),
            Self::Option(inner) => format!("option<{}>", inner.describe(registry)),
            Self::Map(inner) => format!("map<string, {}>", inner.describe(registry)),
            Self::Any => "any".to_owned(),
        }
    }
}

impl From<Prim> for ParamType {
    fn from(p: Prim) -> Self {
        Self::Primitive(p)
    }
}

/// Failure reported by a constructor or operation closure.
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Argument(#[from] ArgError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("{0}")]
    Failed(String),
}

impl CallError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Positional arguments bound to a resolved signature.
#[derive(Debug, Clone, Copy)]
pub struct CallArgs<'a> {
    args: &'a [Arg],
    owner: Option<Entity>,
}

impl<'a> CallArgs<'a> {
    #[must_use]
    pub fn new(args: &'a [Arg], owner: Option<Entity>) -> Self {
        Self { args, owner }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// The entity the component is being built for, if known.
    #[must_use]
    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    pub fn get(&self, index: usize) -> Result<&'a Arg, ArgError> {
        self.args.get(index).ok_or(ArgError::Missing {
            index,
            len: self.args.len(),
        })
    }

    pub fn value(&self, index: usize) -> Result<&'a Value, ArgError> {
        let arg = self.get(index)?;
        arg.as_value().ok_or_else(|| kind(index, "value", arg))
    }

    pub fn i64(&self, index: usize) -> Result<i64, ArgError> {
        let arg = self.get(index)?;
        arg.as_value()
            .and_then(Value::as_i64)
            .ok_or_else(|| kind(index, "integer", arg))
    }

    pub fn u64(&self, index: usize) -> Result<u64, ArgError> {
        let arg = self.get(index)?;
        arg.as_value()
            .and_then(Value::as_u64)
            .ok_or_else(|| kind(index, "unsigned integer", arg))
    }

    pub fn f64(&self, index: usize) -> Result<f64, ArgError> {
        let arg = self.get(index)?;
        arg.as_value()
            .and_then(Value::as_f64)
            .ok_or_else(|| kind(index, "number", arg))
    }

    pub fn bool(&self, index: usize) -> Result<bool, ArgError> {
        let arg = self.get(index)?;
        arg.as_value()
            .and_then(Value::as_bool)
            .ok_or_else(|| kind(index, "bool", arg))
    }

    pub fn str(&self, index: usize) -> Result<&'a str, ArgError> {
        let arg = self.get(index)?;
        arg.as_value()
            .and_then(Value::as_str)
            .ok_or_else(|| kind(index, "string", arg))
    }

    /// Deserializes a value argument into `T`.
    pub fn parse<T: DeserializeOwned>(&self, index: usize) -> Result<T, ArgError> {
        let arg = self.get(index)?;
        arg.as_value()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .ok_or_else(|| kind(index, std::any::type_name::<T>(), arg))
    }

    pub fn component(&self, index: usize) -> Result<&'a ComponentRef, ArgError> {
        let arg = self.get(index)?;
        arg.as_component()
            .ok_or_else(|| kind(index, "component", arg))
    }

    /// Borrows a component argument as a concrete `T`.
    pub fn component_ref<T: Component>(&self, index: usize) -> Result<Ref<'a, T>, CallError> {
        Ok(self.component(index)?.downcast_ref::<T>()?)
    }

    /// Mutably borrows a component argument as a concrete `T`.
    pub fn component_mut<T: Component>(&self, index: usize) -> Result<RefMut<'a, T>, CallError> {
        Ok(self.component(index)?.downcast_mut::<T>()?)
    }
}

fn kind(index: usize, expected: &'static str, found: &Arg) -> ArgError {
    ArgError::Kind {
        index,
        expected,
        found: found.describe(),
    }
}

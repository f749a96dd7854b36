//! Argument values passed to constructors and operations.
//!
//! Plain data travels as a [`serde_json::Value`]; component instances travel
//! as [`ComponentRef`] handles so an operation can receive another component
//! (or an enclosing instance) by identity.

use serde_json::Value;
use thiserror::Error;

use crate::component::{Component, ComponentRef};

/// Errors raised when reading positional arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("argument {index} missing (got {len})")]
    Missing { index: usize, len: usize },

    #[error("argument {index} should be {expected}, got {found}")]
    Kind {
        index: usize,
        expected: &'static str,
        found: String,
    },
}

/// A single argument.
#[derive(Debug, Clone)]
pub enum Arg {
    Value(Value),
    Component(ComponentRef),
}

impl Arg {
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Component(_) => None,
        }
    }

    #[must_use]
    pub fn as_component(&self) -> Option<&ComponentRef> {
        match self {
            Self::Component(c) => Some(c),
            Self::Value(_) => None,
        }
    }

    /// Short description of the argument's runtime kind, used in errors.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Value(Value::Null) => "null".to_owned(),
            Self::Value(Value::Bool(_)) => "bool".to_owned(),
            Self::Value(Value::Number(n)) if n.is_f64() => "float".to_owned(),
            Self::Value(Value::Number(_)) => "integer".to_owned(),
            Self::Value(Value::String(_)) => "string".to_owned(),
            Self::Value(Value::Array(_)) => "list".to_owned(),
            Self::Value(Value::Object(_)) => "map".to_owned(),
            Self::Component(c) => c.name().to_owned(),
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<ComponentRef> for Arg {
    fn from(c: ComponentRef) -> Self {
        Self::Component(c)
    }
}

impl From<&ComponentRef> for Arg {
    fn from(c: &ComponentRef) -> Self {
        Self::Component(c.clone())
    }
}

macro_rules! arg_from_json {
    ($($t:ty),*) => {
        $(impl From<$t> for Arg {
            fn from(v: $t) -> Self {
                Self::Value(Value::from(v))
            }
        })*
    };
}

arg_from_json!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String, &str);

/// An argument list.
///
/// [`Args::NoArgs`] asks for the zero-argument constructor outright, skipping
/// signature matching. An empty [`Args::List`] goes through matching like any
/// other list.
#[derive(Debug, Clone, Default)]
pub enum Args {
    #[default]
    NoArgs,
    List(Vec<Arg>),
}

impl Args {
    /// An empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::List(Vec::new())
    }

    /// Appends an argument, turning `NoArgs` into a list.
    #[must_use]
    pub fn with(self, arg: impl Into<Arg>) -> Self {
        let mut list = self.into_vec();
        list.push(arg.into());
        Self::List(list)
    }

    /// Appends a component instance wrapped in a fresh handle.
    #[must_use]
    pub fn with_component<T: Component>(self, value: T) -> Self {
        self.with(ComponentRef::new(value))
    }

    #[must_use]
    pub fn is_no_args(&self) -> bool {
        matches!(self, Self::NoArgs)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Arg] {
        match self {
            Self::NoArgs => &[],
            Self::List(list) => list,
        }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Arg> {
        match self {
            Self::NoArgs => Vec::new(),
            Self::List(list) => list,
        }
    }
}

impl From<Vec<Arg>> for Args {
    fn from(list: Vec<Arg>) -> Self {
        Self::List(list)
    }
}

impl FromIterator<Arg> for Args {
    fn from_iter<I: IntoIterator<Item = Arg>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}

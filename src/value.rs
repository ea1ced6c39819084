use std::{any::Any, fmt, rc::Rc};

use crate::diagnostics::{Diagnostic, Result};

/// Runtime value handed to and returned from the evaluator.
///
/// Cloning is cheap: the payload sits behind a shared pointer.
#[derive(Clone)]
pub struct Value(pub Rc<ValueKind>);

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self(Rc::new(kind))
    }

    pub fn nil() -> Self {
        Self::new(ValueKind::Nil)
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ValueKind::Bool(value))
    }

    pub fn number(value: f64) -> Self {
        Self::new(ValueKind::Number(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ValueKind::String(value.into()))
    }

    /// Wraps a host closure accepting any number of arguments.
    pub fn function<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        Self::new(ValueKind::Function(NativeFunction {
            name: name.into(),
            arity: None,
            callback: Rc::new(callback),
        }))
    }

    /// Wraps a host closure that must receive exactly `arity` arguments.
    pub fn function_with_arity<F>(name: impl Into<String>, arity: usize, callback: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        Self::new(ValueKind::Function(NativeFunction {
            name: name.into(),
            arity: Some(arity),
            callback: Rc::new(callback),
        }))
    }

    /// Wraps an arbitrary host value. The evaluator passes it through
    /// untouched; only `==`/`!=` (by identity) and truthiness apply to it.
    pub fn opaque<T: Any>(value: T) -> Self {
        Self::new(ValueKind::Opaque(HostValue {
            type_name: std::any::type_name::<T>(),
            inner: Rc::new(value),
        }))
    }

    pub fn kind(&self) -> &ValueKind {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        matches!(&*self.0, ValueKind::Nil)
    }

    pub fn as_number(&self) -> Option<f64> {
        match &*self.0 {
            ValueKind::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &*self.0 {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &*self.0 {
            ValueKind::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&NativeFunction> {
        match &*self.0 {
            ValueKind::Function(fun) => Some(fun),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match &*self.0 {
            ValueKind::Opaque(host) => host.inner.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// `nil` and `false` are falsy, everything else (including `0` and `""`) is truthy.
    pub fn is_truthy(&self) -> bool {
        match &*self.0 {
            ValueKind::Nil => false,
            ValueKind::Bool(b) => *b,
            _ => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &*self.0 {
            ValueKind::Nil => "Nil",
            ValueKind::Bool(_) => "Bool",
            ValueKind::Number(_) => "Number",
            ValueKind::String(_) => "String",
            ValueKind::Function(_) => "Function",
            ValueKind::Opaque(_) => "Opaque",
        }
    }
}

/// Value equality as observed by `==`: same kind and same value.
/// Functions and host values compare by identity; NaN is never equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&*self.0, &*other.0) {
            (ValueKind::Nil, ValueKind::Nil) => true,
            (ValueKind::Bool(a), ValueKind::Bool(b)) => a == b,
            (ValueKind::Number(a), ValueKind::Number(b)) => a == b,
            (ValueKind::String(a), ValueKind::String(b)) => a == b,
            (ValueKind::Function(a), ValueKind::Function(b)) => {
                Rc::ptr_eq(&a.callback, &b.callback)
            }
            (ValueKind::Opaque(a), ValueKind::Opaque(b)) => Rc::ptr_eq(&a.inner, &b.inner),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::string(value)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::Nil => write!(f, "nil"),
            ValueKind::Bool(b) => write!(f, "{b}"),
            ValueKind::Number(n) => write!(f, "{n}"),
            ValueKind::String(s) => write!(f, "{s:?}"),
            ValueKind::Function(fun) => write!(f, "<native fn {}>", fun.name),
            ValueKind::Opaque(host) => write!(f, "<opaque {}>", host.type_name),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::Nil => write!(f, "nil"),
            ValueKind::Bool(b) => write!(f, "{b}"),
            ValueKind::Number(n) => write!(f, "{n}"),
            ValueKind::String(s) => write!(f, "{s}"),
            ValueKind::Function(fun) => write!(f, "<native fn {}>", fun.name),
            ValueKind::Opaque(host) => write!(f, "<opaque {}>", host.type_name),
        }
    }
}

#[derive(Clone)]
pub enum ValueKind {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Function(NativeFunction),
    Opaque(HostValue),
}

pub type Callback = Rc<dyn Fn(&[Value]) -> Result<Value>>;

#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub arity: Option<usize>,
    pub callback: Callback,
}

impl NativeFunction {
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        if let Some(arity) = self.arity {
            if args.len() != arity {
                return Err(Diagnostic::runtime(format!(
                    "function `{}` expected {} arguments but received {}",
                    self.name,
                    arity,
                    args.len()
                ))
                .into());
            }
        }
        (self.callback)(args)
    }
}

#[derive(Clone)]
pub struct HostValue {
    pub type_name: &'static str,
    inner: Rc<dyn Any>,
}

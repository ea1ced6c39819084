use std::rc::Rc;

use indexmap::IndexMap;

use crate::{diagnostics::Result, value::Value};

/// Name to value bindings an expression is evaluated against.
///
/// The evaluator only reads from it. Hosts build one per evaluation (or share
/// one across evaluations); a parent lets a prelude sit underneath host
/// bindings without copying it.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    parent: Option<Rc<Environment>>,
    bindings: IndexMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: Rc<Environment>) -> Self {
        Self {
            parent: Some(parent),
            bindings: IndexMap::new(),
        }
    }

    /// Binds `name`, replacing any earlier binding in this layer.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.bindings.insert(name.into(), value.into());
        self
    }

    pub fn define_function<F>(&mut self, name: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        let name = name.into();
        let function = Value::function(name.clone(), callback);
        self.bindings.insert(name, function);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        match self.bindings.get(name) {
            Some(value) => Some(value),
            None => self.parent.as_deref().and_then(|parent| parent.lookup(name)),
        }
    }

    /// Unbound names resolve to nil rather than failing.
    pub fn get(&self, name: &str) -> Value {
        self.lookup(name).cloned().unwrap_or_else(Value::nil)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Number of bindings in this layer, parents excluded.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Every visible name, parents first, without duplicates.
    pub fn names(&self) -> Vec<String> {
        let mut names = self
            .parent
            .as_deref()
            .map(Environment::names)
            .unwrap_or_default();
        for name in self.bindings.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

impl FromIterator<(String, Value)> for Environment {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            parent: None,
            bindings: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, Value)> for Environment {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.bindings.extend(iter);
    }
}

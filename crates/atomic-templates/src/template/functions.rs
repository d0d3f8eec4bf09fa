//! Function bindings shared by every template in a namespace.
//!
//! A [`FuncMap`] maps names to callables. It is applied to the namespace at
//! the start of every compile cycle, so templates can call the functions by
//! name:
//!
//! ```rust
//! use atomic_templates::FuncMap;
//!
//! let funcs = FuncMap::new()
//!     .add("shout", |s: String| s.to_uppercase())
//!     .add("repeat", |s: String, n: usize| s.repeat(n));
//!
//! assert_eq!(funcs.len(), 2);
//! ```

use std::collections::BTreeMap;

use minijinja::functions::Function;
use minijinja::value::{FunctionArgs, FunctionResult};
use minijinja::{Environment, Value};

/// Named callables installed into the template namespace.
///
/// Callables are type-erased into engine values, so one map can hold
/// functions of different signatures. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct FuncMap {
    functions: BTreeMap<String, Value>,
}

impl FuncMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function under `name`, replacing any previous binding.
    pub fn add<F, Rv, Args>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.insert(name, f);
        self
    }

    /// Adds a function under `name` in place.
    pub fn insert<F, Rv, Args>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.functions.insert(name.into(), Value::from_function(f));
        self
    }

    /// Removes a binding.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.functions.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Returns the bound names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(|s| s.as_str())
    }

    /// Installs every binding as a global of `env`.
    pub(crate) fn apply(&self, env: &mut Environment<'static>) {
        for (name, value) in &self.functions {
            env.add_global(name.clone(), value.clone());
        }
    }
}

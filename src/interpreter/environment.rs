use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::DeclaredType;
use crate::interpreter::value::Value;

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    declared: DeclaredType,
}

/// One lexical scope. Lookups walk outward through `enclosing`.
#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Binding>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind `name` in this scope only, replacing any existing binding here.
    pub fn define(&mut self, name: impl Into<String>, value: Value, declared: DeclaredType) {
        self.values.insert(name.into(), Binding { value, declared });
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(binding) = self.values.get(name) {
            return Some(binding.value.clone());
        }
        self.enclosing
            .as_ref()
            .and_then(|enclosing| enclosing.borrow().get(name))
    }

    pub fn get_type(&self, name: &str) -> Option<DeclaredType> {
        if let Some(binding) = self.values.get(name) {
            return Some(binding.declared);
        }
        self.enclosing
            .as_ref()
            .and_then(|enclosing| enclosing.borrow().get_type(name))
    }

    /// Whether `name` is bound in this scope or any enclosing one.
    pub fn is_defined(&self, name: &str) -> bool {
        self.values.contains_key(name)
            || self
                .enclosing
                .as_ref()
                .is_some_and(|enclosing| enclosing.borrow().is_defined(name))
    }

    /// Update the nearest existing binding. Never creates one.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(binding) = self.values.get_mut(name) {
            binding.value = value;
            return true;
        }
        if let Some(ref enclosing) = self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let mut env = Environment::new();
        env.define("x", Value::Int(42), DeclaredType::Int);
        assert_eq!(env.get("x"), Some(Value::Int(42)));
        assert_eq!(env.get_type("x"), Some(DeclaredType::Int));
    }

    #[test]
    fn get_undefined_returns_none() {
        let env = Environment::new();
        assert!(env.get("x").is_none());
        assert!(env.get_type("x").is_none());
        assert!(!env.is_defined("x"));
    }

    #[test]
    fn enclosing_scope() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer
            .borrow_mut()
            .define("s", Value::Str("out".to_string()), DeclaredType::String);
        let inner = Environment::with_enclosing(Rc::clone(&outer));
        assert_eq!(inner.get("s"), Some(Value::Str("out".to_string())));
        assert_eq!(inner.get_type("s"), Some(DeclaredType::String));
        assert!(inner.is_defined("s"));
    }

    #[test]
    fn assign_updates_nearest_binding() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer
            .borrow_mut()
            .define("x", Value::Int(1), DeclaredType::Int);
        let mut inner = Environment::with_enclosing(Rc::clone(&outer));
        assert!(inner.assign("x", Value::Int(2)));
        assert_eq!(outer.borrow().get("x"), Some(Value::Int(2)));
    }

    #[test]
    fn assign_undefined_returns_false() {
        let mut env = Environment::new();
        assert!(!env.assign("x", Value::Int(1)));
        assert!(env.get("x").is_none());
    }

    #[test]
    fn inner_bindings_are_invisible_outside() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        {
            let mut inner = Environment::with_enclosing(Rc::clone(&outer));
            inner.define("t", Value::Bool(true), DeclaredType::Bool);
            assert!(inner.is_defined("t"));
        }
        assert!(!outer.borrow().is_defined("t"));
    }
}

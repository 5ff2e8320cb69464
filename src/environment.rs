use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::value::Value;

/// Shared handle to a scope frame.  Closures hold one of these, which keeps
/// the frame alive after the block that created it has exited.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn enclosing(&self) -> Option<&EnvRef> {
        self.enclosing.as_ref()
    }

    /// Bind `name` in this frame, replacing any earlier binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up through the whole chain.  `None` means undefined,
    /// which is distinct from a binding holding `nil`.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.get(name) {
            Some(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            None
        }
    }

    /// Overwrite the nearest existing binding of `name`.  Returns `false`
    /// when no frame in the chain owns it; no binding is created then.
    #[must_use]
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            true
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            false
        }
    }

    /// The frame `distance` hops up the chain from `env` (0 = `env` itself).
    pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut current: EnvRef = Rc::clone(env);

        for _ in 0..distance {
            let next: EnvRef = Rc::clone(current.borrow().enclosing.as_ref()?);
            current = next;
        }

        Some(current)
    }

    /// Read `name` from exactly the frame `distance` hops away.
    pub fn get_at(env: &EnvRef, distance: usize, name: &str) -> Option<Value> {
        debug!("get_at '{}' distance={}", name, distance);

        let frame: EnvRef = Self::ancestor(env, distance)?;
        let value: Option<Value> = frame.borrow().values.get(name).cloned();
        value
    }

    /// Write `name` in exactly the frame `distance` hops away.
    #[must_use]
    pub fn assign_at(env: &EnvRef, distance: usize, name: &str, value: Value) -> bool {
        debug!("assign_at '{}' distance={}", name, distance);

        let Some(frame) = Self::ancestor(env, distance) else {
            return false;
        };
        let mut frame = frame.borrow_mut();

        match frame.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_distinguishes_undefined_from_nil() {
        let mut env = Environment::new();
        env.define("a", Value::Nil);

        assert_eq!(env.get("a"), Some(Value::Nil));
        assert_eq!(env.get("b"), None);
    }

    #[test]
    fn define_is_an_upsert() {
        let mut env = Environment::new();
        env.define("a", Value::Number(1.0));
        env.define("a", Value::Number(2.0));

        assert_eq!(env.get("a"), Some(Value::Number(2.0)));
    }

    #[test]
    fn assign_walks_outward_and_never_defines() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::Number(1.0));
        let mut local = Environment::with_enclosing(Rc::clone(&global));

        assert!(local.assign("a", Value::Number(5.0)));
        assert_eq!(global.borrow().get("a"), Some(Value::Number(5.0)));

        assert!(!local.assign("missing", Value::Nil));
        assert_eq!(local.get("missing"), None);
    }

    #[test]
    fn get_at_targets_one_frame() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::String("outer".into()));
        let inner = Environment::with_enclosing(Rc::clone(&global)).into_ref();
        inner.borrow_mut().define("a", Value::String("inner".into()));

        assert_eq!(
            Environment::get_at(&inner, 0, "a"),
            Some(Value::String("inner".into()))
        );
        assert_eq!(
            Environment::get_at(&inner, 1, "a"),
            Some(Value::String("outer".into()))
        );
        assert_eq!(Environment::get_at(&inner, 2, "a"), None);

        assert!(Environment::assign_at(&inner, 1, "a", Value::Bool(true)));
        assert_eq!(global.borrow().get("a"), Some(Value::Bool(true)));
    }

    #[test]
    fn shared_frame_mutation_is_visible_to_all_holders() {
        let frame = Environment::new().into_ref();
        frame.borrow_mut().define("count", Value::Number(0.0));
        let first = Environment::with_enclosing(Rc::clone(&frame));
        let mut second = Environment::with_enclosing(Rc::clone(&frame));

        assert!(second.assign("count", Value::Number(3.0)));
        assert_eq!(first.get("count"), Some(Value::Number(3.0)));
    }
}

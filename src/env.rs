use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::object::Object;

/// Shared handle to a scope frame. Closures and call frames hold these, so one
/// frame may be reachable from several places at once.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    store: FxHashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new_global() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    pub fn new_enclosed(outer: &Env) -> Env {
        Rc::new(RefCell::new(Environment {
            store: FxHashMap::default(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    /// Looks `name` up in this frame, then along the outer chain.
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(val) => Some(val.clone()),
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Binds `name` in this frame, shadowing any outer binding.
    pub fn set(&mut self, name: impl Into<String>, val: Object) {
        self.store.insert(name.into(), val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outer_chain() {
        let global = Environment::new_global();
        global.borrow_mut().set("a", Object::Integer(1));

        let inner = Environment::new_enclosed(&global);
        inner.borrow_mut().set("b", Object::Integer(2));

        assert_eq!(inner.borrow().get("a"), Some(Object::Integer(1)));
        assert_eq!(inner.borrow().get("b"), Some(Object::Integer(2)));
        assert_eq!(global.borrow().get("b"), None);
        assert_eq!(inner.borrow().get("c"), None);
    }

    #[test]
    fn test_set_shadows_without_touching_outer() {
        let global = Environment::new_global();
        global.borrow_mut().set("x", Object::Integer(1));

        let inner = Environment::new_enclosed(&global);
        inner.borrow_mut().set("x", Object::Integer(2));

        assert_eq!(inner.borrow().get("x"), Some(Object::Integer(2)));
        assert_eq!(global.borrow().get("x"), Some(Object::Integer(1)));
    }

    #[test]
    fn test_outer_updates_are_visible() {
        let global = Environment::new_global();
        let inner = Environment::new_enclosed(&global);

        global.borrow_mut().set("late", Object::Boolean(true));
        assert_eq!(inner.borrow().get("late"), Some(Object::Boolean(true)));
    }
}

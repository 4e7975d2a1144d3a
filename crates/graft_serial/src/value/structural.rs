use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;

use graft_utils::hash::HashSet;

use crate::value::{Object, Value};

/// State of one [`Value::structural_eq`] call.
///
/// `assumed` holds the handle pairs currently (or already) under
/// comparison; meeting one again means a cycle, which is taken as equal.
///
/// Field values read from objects may be fresh handles that die right
/// after use. `anchors` keeps every compared handle alive until the call
/// ends, so no address in `assumed` can be reused by another handle.
#[derive(Default)]
pub(super) struct Comparer {
    assumed: HashSet<(usize, usize)>,
    anchors: Vec<Rc<dyn Any>>,
}

impl Comparer {
    fn assume<T: Any>(&mut self, a: &Rc<T>, b: &Rc<T>) -> bool {
        let pair = (Rc::as_ptr(a).addr(), Rc::as_ptr(b).addr());
        if !self.assumed.insert(pair) {
            return false;
        }
        self.anchors.push(a.clone());
        self.anchors.push(b.clone());
        true
    }

    pub(super) fn eq(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::String(x), Value::String(y)) => x == y,
            (Value::Callback(x), Value::Callback(y)) => x == y,
            (Value::Pending(x), Value::Pending(y)) => x == y,
            (Value::Array(x), Value::Array(y)) => {
                if !self.assume(x.rc(), y.rc()) {
                    return true;
                }
                let xs = x.borrow().clone();
                let ys = y.borrow().clone();
                xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(l, r)| self.eq(l, r))
            }
            (Value::Record(x), Value::Record(y)) => {
                if !self.assume(x.rc(), y.rc()) {
                    return true;
                }
                let xs = x.borrow().clone();
                let ys = y.borrow().clone();
                xs.len() == ys.len()
                    && xs.iter().all(|(key, l)| match ys.get(key) {
                        Some(r) => self.eq(l, r),
                        None => false,
                    })
            }
            (Value::Object(x), Value::Object(y)) => {
                if !self.assume(x.rc(), y.rc()) {
                    return true;
                }
                self.eq_object(x, y)
            }
            _ => false,
        }
    }

    fn eq_object(&mut self, x: &Object, y: &Object) -> bool {
        if x.type_id() != y.type_id() {
            return false;
        }
        // Field values are collected first so that no borrow is held while
        // recursing into a graph that may contain `x` or `y` again.
        let pairs: alloc::vec::Vec<(Option<Value>, Option<Value>)> = {
            let l = x.borrow();
            let r = y.borrow();
            l.field_names()
                .iter()
                .map(|name| (l.field(name), r.field(name)))
                .collect()
        };
        pairs.iter().all(|pair| match pair {
            (Some(l), Some(r)) => self.eq(l, r),
            (None, None) => true,
            _ => false,
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::Serializable;
    use crate::value::{Array, Value};

    #[derive(Serializable, Default)]
    struct Bag {
        weights: Vec<i64>,
    }

    #[test]
    fn distinct_handles_with_same_content() {
        let a = Value::array([Value::from(1_i64), Value::from("x")]);
        let b = Value::array([Value::from(1.0), Value::from("x")]);
        assert_ne!(a, b);
        assert!(Value::structural_eq(&a, &b));
    }

    #[test]
    fn records_compare_keywise() {
        let a = Value::record([("k", Value::from(true)), ("n", Value::Null)]);
        let b = Value::record([("n", Value::Null), ("k", Value::from(true))]);
        let c = Value::record([("k", Value::from(true))]);
        assert!(Value::structural_eq(&a, &b));
        assert!(!Value::structural_eq(&a, &c));
    }

    #[test]
    fn cyclic_arrays_terminate() {
        let a = Array::new();
        a.push(Value::Array(a.clone()));
        let b = Array::new();
        b.push(Value::Array(b.clone()));
        assert!(Value::structural_eq(&Value::Array(a.clone()), &Value::Array(b.clone())));

        // Break the cycles so the test does not leak.
        a.borrow_mut().clear();
        b.borrow_mut().clear();
    }

    #[test]
    fn temporary_field_handles_are_compared() {
        let bags = |last: i64| {
            let mut items: Vec<Value> = (0..8)
                .map(|_| Value::object(Bag { weights: alloc::vec![1] }))
                .collect();
            items.push(Value::object(Bag { weights: alloc::vec![last] }));
            Value::array(items)
        };

        assert!(Value::structural_eq(&bags(1), &bags(1)));
        assert!(!Value::structural_eq(&bags(1), &bags(999)));
    }
}

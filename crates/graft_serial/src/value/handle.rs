use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;

use graft_utils::hash::HashMap;

use crate::Serializable;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Array

/// A shared, mutable list of values.
///
/// Cloning the handle shares the list. An array may be shared by value
/// fields, but the serializer rejects any array reached twice in one call.
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, Vec<Value>> {
        self.0.borrow_mut()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns a clone of the element at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    #[inline]
    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }

    /// Returns `true` if both handles point to the same list.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[inline(always)]
    pub(crate) fn rc(&self) -> &Rc<RefCell<Vec<Value>>> {
        &self.0
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(items) => write!(f, "Array({:p}, len = {})", Rc::as_ptr(&self.0), items.len()),
            Err(_) => write!(f, "Array({:p}, <borrowed>)", Rc::as_ptr(&self.0)),
        }
    }
}

// -----------------------------------------------------------------------------
// Record

/// A shared, mutable, untyped key-value object.
#[derive(Clone, Default)]
pub struct Record(Rc<RefCell<HashMap<String, Value>>>);

impl Record {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn from_map(map: HashMap<String, Value>) -> Self {
        Self(Rc::new(RefCell::new(map)))
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, HashMap<String, Value>> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, HashMap<String, Value>> {
        self.0.borrow_mut()
    }

    /// Returns a clone of the value under `key`.
    #[inline]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    #[inline]
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.borrow_mut().insert(key.into(), value.into())
    }

    #[inline]
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().remove(key)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns the keys in ascending order.
    pub fn sorted_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.0.borrow().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[inline(always)]
    pub(crate) fn rc(&self) -> &Rc<RefCell<HashMap<String, Value>>> {
        &self.0
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(map) => {
                write!(f, "Record({:p}, ", Rc::as_ptr(&self.0))?;
                f.debug_set().entries(map.keys()).finish()?;
                f.write_str(")")
            }
            Err(_) => write!(f, "Record({:p}, <borrowed>)", Rc::as_ptr(&self.0)),
        }
    }
}

// -----------------------------------------------------------------------------
// Object

/// A shared instance of a [`Serializable`] type.
///
/// # Examples
///
/// ```
/// use graft_serial::{Serializable, value::Object};
///
/// #[derive(Serializable, Default)]
/// struct Counter {
///     count: i64,
/// }
///
/// let obj = Object::new(Counter { count: 1 });
/// let alias = obj.clone();
///
/// alias.borrow_mut_as::<Counter>().unwrap().count += 1;
///
/// assert_eq!(obj.borrow_as::<Counter>().unwrap().count, 2);
/// assert!(obj.ptr_eq(&alias));
/// ```
#[derive(Clone)]
pub struct Object(Rc<RefCell<Box<dyn Serializable>>>);

impl Object {
    #[inline]
    pub fn new<T: Serializable>(value: T) -> Self {
        Self::from_boxed(Box::new(value))
    }

    #[inline]
    pub fn from_boxed(value: Box<dyn Serializable>) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Immutably borrows the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently mutably borrowed.
    #[inline]
    pub fn borrow(&self) -> Ref<'_, dyn Serializable> {
        Ref::map(self.0.borrow(), |boxed| &**boxed)
    }

    /// Mutably borrows the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently borrowed.
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, dyn Serializable> {
        RefMut::map(self.0.borrow_mut(), |boxed| &mut **boxed)
    }

    /// Borrows the instance as `T`, or returns `None` if it is another type.
    pub fn borrow_as<T: Serializable>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.0.borrow(), |boxed| {
            let any: &dyn Any = &**boxed;
            any.downcast_ref::<T>()
        })
        .ok()
    }

    /// Mutably borrows the instance as `T`, or returns `None` if it is another type.
    pub fn borrow_mut_as<T: Serializable>(&self) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.0.borrow_mut(), |boxed| {
            let any: &mut dyn Any = &mut **boxed;
            any.downcast_mut::<T>()
        })
        .ok()
    }

    /// The [`TypeId`] of the concrete instance type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        let inner = self.0.borrow();
        let any: &dyn Any = &**inner;
        any.type_id()
    }

    /// Returns `true` if the instance is a `T`.
    #[inline]
    pub fn is<T: Serializable>(&self) -> bool {
        self.type_id() == TypeId::of::<T>()
    }

    /// The Rust type name of the concrete instance type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.0.borrow().type_name()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[inline(always)]
    pub(crate) fn rc(&self) -> &Rc<RefCell<Box<dyn Serializable>>> {
        &self.0
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(inner) => write!(f, "Object({:p}, {})", Rc::as_ptr(&self.0), inner.type_name()),
            Err(_) => write!(f, "Object({:p}, <borrowed>)", Rc::as_ptr(&self.0)),
        }
    }
}

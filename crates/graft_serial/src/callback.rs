//! Named callbacks: function values that cross the wire by name.
//!
//! A function cannot be serialized structurally. Instead it is registered
//! under a name in a [`CallbackRegistry`] and written as the string
//! `"<REGISTERED FUNCTION>" + name`. Reviving the string looks the name up
//! again.

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;
use std::sync::{LazyLock, PoisonError};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use graft_utils::hash::HashMap;

use crate::value::Value;

/// Prefix of the wire string that encodes a [`Callback`].
pub const CALLBACK_PREFIX: &str = "<REGISTERED FUNCTION>";

/// Signature of every registrable callback.
pub type CallbackFn = fn(&[Value]) -> Value;

// -----------------------------------------------------------------------------
// Callback

/// A registered function together with the key it is registered under.
#[derive(Clone)]
pub struct Callback {
    name: Arc<str>,
    func: CallbackFn,
}

impl Callback {
    /// Pairs `func` with `name` without registering it.
    ///
    /// Serializing a callback fails unless `name` maps to `func` in the
    /// callback registry in use.
    #[inline]
    pub fn new(name: impl Into<Arc<str>>, func: CallbackFn) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn func(&self) -> CallbackFn {
        self.func
    }

    #[inline]
    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && core::ptr::fn_addr_eq(self.func, other.func)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback").field(&&*self.name).finish()
    }
}

// -----------------------------------------------------------------------------
// CallbackRegistry

/// A flat name -> function table.
///
/// # Examples
///
/// ```
/// use graft_serial::callback::CallbackRegistry;
/// use graft_serial::value::Value;
///
/// fn heal(_: &[Value]) -> Value { Value::Null }
/// fn harm(_: &[Value]) -> Value { Value::Null }
///
/// let mut registry = CallbackRegistry::new();
/// assert_eq!(registry.register("effect", heal).name(), "effect");
/// assert_eq!(registry.register("effect", harm).name(), "effect1");
/// assert_eq!(registry.key_of(harm), Some("effect1"));
/// ```
#[derive(Default)]
pub struct CallbackRegistry {
    entries: HashMap<Arc<str>, CallbackFn>,
}

impl CallbackRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `func` and returns its handle.
    ///
    /// If `name` is taken, the key becomes `name` followed by the smallest
    /// positive integer that gives a free key (`name1`, `name2`, ...).
    pub fn register(&mut self, name: &str, func: CallbackFn) -> Callback {
        let mut key = String::from(name);
        let mut suffix = 1_u32;
        while self.entries.contains_key(key.as_str()) {
            key = alloc::format!("{name}{suffix}");
            suffix += 1;
        }
        if key != name {
            log::debug!("callback name `{name}` is taken, registered as `{key}`");
        }

        let key: Arc<str> = key.into();
        self.entries.insert(key.clone(), func);
        Callback { name: key, func }
    }

    /// Registers `func` under exactly `name`, replacing any previous entry.
    pub fn insert(&mut self, name: &str, func: CallbackFn) -> Callback {
        let key: Arc<str> = name.into();
        self.entries.insert(key.clone(), func);
        Callback { name: key, func }
    }

    /// Returns the handle registered under `name`.
    pub fn get(&self, name: &str) -> Option<Callback> {
        self.entries
            .get_key_value(name)
            .map(|(key, func)| Callback {
                name: key.clone(),
                func: *func,
            })
    }

    /// Removes the entry under `name`.
    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<CallbackFn> {
        self.entries.remove(name)
    }

    /// Returns a key that `func` is registered under.
    pub fn key_of(&self, func: CallbackFn) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, f)| core::ptr::fn_addr_eq(**f, func))
            .map(|(key, _)| &**key)
    }

    /// Returns `true` if `callback`'s name maps to its function.
    pub fn is_registered(&self, callback: &Callback) -> bool {
        self.entries
            .get(callback.name())
            .is_some_and(|f| core::ptr::fn_addr_eq(*f, callback.func))
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The process-wide callback registry used by the free functions of
    /// this crate.
    pub fn global() -> &'static CallbackRegistryArc {
        static GLOBAL: LazyLock<CallbackRegistryArc> = LazyLock::new(CallbackRegistryArc::default);
        &GLOBAL
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Encodes a callback name as its wire string.
#[inline]
pub fn encode_name(name: &str) -> String {
    let mut out = String::with_capacity(CALLBACK_PREFIX.len() + name.len());
    out.push_str(CALLBACK_PREFIX);
    out.push_str(name);
    out
}

/// Returns the callback name if `s` is a callback wire string.
#[inline]
pub fn decode_name(s: &str) -> Option<&str> {
    s.strip_prefix(CALLBACK_PREFIX)
}

// -----------------------------------------------------------------------------
// CallbackRegistryArc

/// A shared, lockable [`CallbackRegistry`].
#[derive(Clone, Default)]
pub struct CallbackRegistryArc {
    /// The wrapped [`CallbackRegistry`].
    pub internal: Arc<RwLock<CallbackRegistry>>,
}

impl CallbackRegistryArc {
    #[inline]
    pub fn new(registry: CallbackRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`CallbackRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, CallbackRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`CallbackRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, CallbackRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CallbackRegistryArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read().fmt(f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{CallbackRegistry, decode_name, encode_name};
    use crate::value::Value;

    fn one(_: &[Value]) -> Value {
        Value::from(1_i64)
    }

    fn two(_: &[Value]) -> Value {
        Value::from(2_i64)
    }

    fn three(_: &[Value]) -> Value {
        Value::from(3_i64)
    }

    #[test]
    fn smallest_free_suffix() {
        let mut registry = CallbackRegistry::new();
        registry.register("f", one);
        registry.register("f", two);
        registry.remove("f1");
        assert_eq!(registry.register("f", three).name(), "f1");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lookup_and_call() {
        let mut registry = CallbackRegistry::new();
        let cb = registry.register("two", two);
        let found = registry.get("two").unwrap();
        assert_eq!(found, cb);
        assert_eq!(found.call(&[]).as_i64(), Some(2));
        assert!(registry.is_registered(&cb));
        assert_eq!(registry.key_of(one), None);
    }

    #[test]
    fn wire_string() {
        assert_eq!(encode_name("tick"), "<REGISTERED FUNCTION>tick");
        assert_eq!(decode_name("<REGISTERED FUNCTION>tick"), Some("tick"));
        assert_eq!(decode_name("tick"), None);
    }
}

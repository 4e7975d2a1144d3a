use alloc::borrow::Cow;
use alloc::string::ToString;
use core::any::TypeId;
use std::sync::{Arc, LazyLock, PoisonError};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use graft_utils::TypeIdMap;
use graft_utils::hash::HashMap;

use crate::error::SerialError;
use crate::node::CIRCLE_REF_TAG;
use crate::registry::{GetTypeMeta, TypeMeta};

// -----------------------------------------------------------------------------
// TypeRegistry

/// Maps type tags to [`TypeMeta`] entries, and concrete types back to
/// their tag.
///
/// A registry is filled during startup and only read afterwards. Inserting
/// a tag that already exists replaces the previous entry without error.
///
/// # Example
///
/// ```
/// use graft_serial::Serializable;
/// use graft_serial::registry::TypeRegistry;
///
/// #[derive(Serializable, Default)]
/// #[serial(tag = "Pawn")]
/// struct Pawn {
///     rank: u8,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Pawn>();
///
/// assert_eq!(registry.tag_of(core::any::TypeId::of::<Pawn>()), Some("Pawn"));
/// assert!(registry.lookup("Rook").is_err());
/// ```
pub struct TypeRegistry {
    metas: HashMap<Cow<'static, str>, TypeMeta>,
    tags: TypeIdMap<Cow<'static, str>>,
    #[cfg_attr(not(feature = "auto_register"), allow(dead_code))]
    auto_registered: bool,
}

impl Default for TypeRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            metas: HashMap::default(),
            tags: TypeIdMap::new(),
            auto_registered: false,
        }
    }

    /// Inserts `meta`, replacing any entry with the same tag.
    ///
    /// The type of `meta` is serialized under this tag from now on. If the
    /// replaced entry belonged to another type that was still serialized
    /// under this tag, that type loses its tag.
    ///
    /// # Panics
    ///
    /// Panics if the tag is the reserved reference marker tag.
    pub fn insert(&mut self, meta: TypeMeta) {
        assert!(
            meta.tag() != CIRCLE_REF_TAG,
            "`{CIRCLE_REF_TAG}` is reserved and cannot be used as type tag of `{}`",
            meta.type_name(),
        );

        if let Some(prev) = self.metas.get(meta.tag()) {
            log::debug!(
                "type tag `{}` re-registered: `{}` replaces `{}`",
                meta.tag(),
                meta.type_name(),
                prev.type_name(),
            );
            let prev_id = prev.type_id();
            if prev_id != meta.type_id()
                && self.tags.get(&prev_id).is_some_and(|tag| tag == meta.tag())
            {
                self.tags.remove(&prev_id);
            }
        }

        self.tags.insert(meta.type_id(), meta.tag_cow().clone());
        self.metas.insert(meta.tag_cow().clone(), meta);
    }

    /// Registers `T` under its default tag.
    ///
    /// See [`insert`](Self::insert) for collision behavior.
    #[inline]
    pub fn register<T: GetTypeMeta>(&mut self) {
        self.insert(T::get_type_meta());
    }

    /// Registers `T` under `tag` instead of its default tag.
    #[inline]
    pub fn register_as<T: GetTypeMeta>(&mut self, tag: impl Into<Cow<'static, str>>) {
        self.insert(T::get_type_meta().with_tag(tag));
    }

    /// Registers every type annotated with `#[serial(auto_register)]` or
    /// declared through `impl_auto_register!`.
    ///
    /// Equivalent to calling [`register`](Self::register) for each of them.
    ///
    /// ## Return Value
    ///
    /// Returns `true` if automatic registration works on the current
    /// platform. Later calls return `true` again without registering twice.
    ///
    /// ## Feature Dependency
    ///
    /// Requires the `auto_register` feature; without it this does nothing
    /// and returns `false`.
    ///
    /// ## Platform Support
    ///
    /// Collection is done by the `inventory` crate, which supports Linux,
    /// macOS, Windows, iOS, Android and Web. Elsewhere this is a no-op.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        crate::cfg::auto_register! {
            if {
                use crate::__macro_exports::auto_register;
                if self.auto_registered {
                    return true;
                }
                auto_register::__register_types(self);
                log::debug!("auto registered types, {} entries", self.metas.len());
                self.auto_registered
            } else {
                false
            }
        }
    }

    #[cfg_attr(not(feature = "auto_register"), allow(dead_code))]
    #[inline]
    pub(crate) fn mark_auto_registered(&mut self) {
        self.auto_registered = true;
    }

    /// Returns the entry for `tag`.
    #[inline]
    pub fn get(&self, tag: &str) -> Option<&TypeMeta> {
        self.metas.get(tag)
    }

    /// Returns the entry for `tag`, or [`SerialError::UnknownType`].
    pub fn lookup(&self, tag: &str) -> Result<&TypeMeta, SerialError> {
        self.metas.get(tag).ok_or_else(|| SerialError::UnknownType {
            tag: tag.to_string(),
        })
    }

    /// Returns the tag a value of the given type is serialized under.
    #[inline]
    pub fn tag_of(&self, type_id: TypeId) -> Option<&str> {
        self.tags.get(&type_id).map(|tag| &**tag)
    }

    /// Returns `true` if `tag` is registered.
    #[inline]
    pub fn contains(&self, tag: &str) -> bool {
        self.metas.contains_key(tag)
    }

    /// Returns `true` if the type has a tag.
    #[inline]
    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.tags.contains(&type_id)
    }

    /// Number of registered tags.
    #[inline]
    pub fn len(&self) -> usize {
        self.metas.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }

    /// An iterator over all entries in arbitrary order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeMeta> {
        self.metas.values()
    }

    /// The process-wide registry used by the free functions of this crate.
    ///
    /// Created on first use and filled by [`auto_register`](Self::auto_register).
    /// Register everything else before serializing or reviving through it.
    pub fn global() -> &'static TypeRegistryArc {
        static GLOBAL: LazyLock<TypeRegistryArc> = LazyLock::new(|| {
            let mut registry = TypeRegistry::new();
            registry.auto_register();
            TypeRegistryArc::new(registry)
        });
        &GLOBAL
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.metas.keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryArc

/// A shared, lockable [`TypeRegistry`].
#[derive(Clone, Default)]
pub struct TypeRegistryArc {
    /// The wrapped [`TypeRegistry`].
    pub internal: Arc<RwLock<TypeRegistry>>,
}

impl TypeRegistryArc {
    #[inline]
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`TypeRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`TypeRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for TypeRegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.read().fmt(f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use crate::Serializable;
    use crate::SerialError;
    use crate::registry::{Factory, TypeMeta, TypeRegistry};

    #[derive(Serializable, Default)]
    #[serial(tag = "Alpha")]
    struct Alpha {
        a: i64,
    }

    #[derive(Serializable, Default)]
    struct Beta {
        b: i64,
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = TypeRegistry::new();
        registry.register::<Alpha>();
        registry.register::<Beta>();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.tag_of(TypeId::of::<Beta>()), Some("Beta"));
        assert_eq!(registry.lookup("Alpha").unwrap().type_id(), TypeId::of::<Alpha>());
        assert!(matches!(
            registry.lookup("Gamma"),
            Err(SerialError::UnknownType { tag }) if tag == "Gamma",
        ));
    }

    #[test]
    fn overwrite_is_silent() {
        let mut registry = TypeRegistry::new();
        registry.register::<Alpha>();
        registry.register_as::<Beta>("Alpha");

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("Alpha").unwrap().type_id(), TypeId::of::<Beta>());
        assert_eq!(registry.tag_of(TypeId::of::<Beta>()), Some("Alpha"));
        assert_eq!(registry.tag_of(TypeId::of::<Alpha>()), None);
    }

    #[test]
    fn latest_tag_wins_for_serialize() {
        let mut registry = TypeRegistry::new();
        registry.register::<Alpha>();
        registry.register_as::<Alpha>("OldAlpha");

        // Both tags revive, the newest is written.
        assert!(registry.contains("Alpha"));
        assert!(registry.contains("OldAlpha"));
        assert_eq!(registry.tag_of(TypeId::of::<Alpha>()), Some("OldAlpha"));
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn reserved_tag() {
        let mut registry = TypeRegistry::new();
        registry.insert(TypeMeta::new::<Alpha>("__circleRef", Factory::of_default::<Alpha>()));
    }
}

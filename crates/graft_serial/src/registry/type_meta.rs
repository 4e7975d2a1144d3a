use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use crate::Serializable;
use crate::error::SerialError;
use crate::node::TypedNode;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Factory

/// Creates a default instance.
pub type DefaultFn = fn() -> Box<dyn Serializable>;

/// Builds a complete instance from the raw node.
pub type FromJsonFn = fn(&TypedNode) -> Result<Box<dyn Serializable>, SerialError>;

/// Derives constructor arguments from the raw node.
pub type ConstructArgsFn = fn(&TypedNode) -> Result<Vec<Value>, SerialError>;

/// Builds an instance from the arguments returned by a [`ConstructArgsFn`].
pub type ConstructFn = fn(Vec<Value>) -> Result<Box<dyn Serializable>, SerialError>;

/// How the reviver creates an instance of a registered type.
///
/// A type has exactly one factory. The derive picks `from_json` if given,
/// else `construct_args`, else the default constructor.
#[derive(Clone, Copy)]
pub enum Factory {
    /// Default-construct, then revive and assign every field of the node,
    /// then call [`Serializable::after_revive`].
    Default(DefaultFn),
    /// Compute constructor arguments from the raw node and construct.
    /// No field assignment and no `after_revive` follow.
    ConstructArgs {
        args: ConstructArgsFn,
        construct: ConstructFn,
    },
    /// The hook receives the raw node and owns all revival of its content.
    FromJson(FromJsonFn),
}

impl Factory {
    /// A [`Factory::Default`] using `T::default()`.
    #[inline]
    pub fn of_default<T: Serializable + Default>() -> Self {
        Factory::Default(|| -> Box<dyn Serializable> { Box::new(T::default()) })
    }

    /// Name of the variant, for diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Factory::Default(_) => "default",
            Factory::ConstructArgs { .. } => "construct_args",
            Factory::FromJson(_) => "from_json",
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

// -----------------------------------------------------------------------------
// TypeMeta

/// A registry entry: the type tag, the Rust type it names and its factory.
///
/// Usually produced by [`GetTypeMeta`], which `#[derive(Serializable)]`
/// implements.
///
/// # Examples
///
/// ```
/// use graft_serial::registry::{Factory, TypeMeta, TypeRegistry};
/// # use graft_serial::Serializable;
/// # #[derive(Serializable, Default)]
/// # #[serial(GetTypeMeta = false)]
/// # struct Foo { v: i64 }
///
/// let meta = TypeMeta::new::<Foo>("Foo", Factory::of_default::<Foo>());
///
/// let mut registry = TypeRegistry::new();
/// registry.insert(meta);
/// assert!(registry.contains("Foo"));
/// ```
#[derive(Clone)]
pub struct TypeMeta {
    tag: Cow<'static, str>,
    type_id: TypeId,
    type_name: &'static str,
    factory: Factory,
}

impl TypeMeta {
    pub fn new<T: Serializable>(tag: impl Into<Cow<'static, str>>, factory: Factory) -> Self {
        Self {
            tag: tag.into(),
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            factory,
        }
    }

    /// Replaces the type tag.
    #[inline]
    pub fn with_tag(mut self, tag: impl Into<Cow<'static, str>>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Replaces the factory.
    #[inline]
    pub fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = factory;
        self
    }

    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[inline]
    pub(crate) fn tag_cow(&self) -> &Cow<'static, str> {
        &self.tag
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn factory(&self) -> Factory {
        self.factory
    }
}

impl fmt::Debug for TypeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMeta")
            .field("tag", &self.tag)
            .field("type_name", &self.type_name)
            .field("factory", &self.factory)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// GetTypeMeta

/// Provides the default [`TypeMeta`] of a type.
///
/// Implemented by `#[derive(Serializable)]` unless `GetTypeMeta = false`.
pub trait GetTypeMeta: Serializable {
    fn get_type_meta() -> TypeMeta;
}

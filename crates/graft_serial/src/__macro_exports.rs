//! Items referenced by the code `graft_serial_derive` generates.

use alloc::boxed::Box;

use crate::Serializable;

/// Boxes a hook result for a [`Factory`](crate::registry::Factory).
#[inline(always)]
pub fn boxed<T: Serializable>(value: T) -> Box<dyn Serializable> {
    Box::new(value)
}

/// Static registration through `inventory`.
#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    use crate::registry::{GetTypeMeta, TypeRegistry};

    /// A function submitted by `#[serial(auto_register)]` or `impl_auto_register!`.
    pub struct __AutoRegisterFunc(pub fn(&mut TypeRegistry));

    inventory::collect!(__AutoRegisterFunc);

    pub trait __RegisterType {
        fn __register(registry: &mut TypeRegistry);
    }

    impl<T: GetTypeMeta> __RegisterType for T {
        #[inline]
        fn __register(registry: &mut TypeRegistry) {
            registry.register::<T>();
        }
    }

    // Runs only where `inventory` works, which is what
    // `TypeRegistry::auto_register` reports.
    fn __mark_available(registry: &mut TypeRegistry) {
        registry.mark_auto_registered();
    }

    inventory::submit! {
        __AutoRegisterFunc(__mark_available)
    }

    /// Runs every submitted registration function.
    pub fn __register_types(registry: &mut TypeRegistry) {
        for func in inventory::iter::<__AutoRegisterFunc> {
            (func.0)(registry);
        }
    }
}

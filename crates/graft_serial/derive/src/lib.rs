//! See following macros:
//!
//! - [`Serializable`]
//! - [`impl_auto_register`]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static SERIAL_ATTRIBUTE_NAME: &str = "serial";

/// Keys the wire format reserves for itself. No field may use them.
static RESERVED_KEYS: [&str; 3] = ["__registeredType", "__refId", "__toRefId"];

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;
mod utils;

// -----------------------------------------------------------------------------
// Macros

/// # Serializable Derivation
///
/// `#[derive(Serializable)]` on a struct with named fields implements:
///
/// - `Fields`: the field schema and by-name accessors.
/// - `Serializable`: with every hook left at its default.
/// - `GetTypeMeta`: the registry entry, tagged with the type's ident.
///
/// Every field type must implement `ToValue` and `FromValue`.
///
/// ## Disabling Implementations
///
/// ```rust, ignore
/// #[derive(Serializable, Default)]
/// #[serial(Serializable = false)]
/// struct Foo { /* ... */ }
///
/// impl Serializable for Foo {
///     fn after_revive(&mut self) { /* ... */ }
/// }
/// ```
///
/// `GetTypeMeta = false` works the same way.
///
/// ## Type Tag
///
/// ```rust, ignore
/// #[derive(Serializable, Default)]
/// #[serial(tag = "Pawn")]
/// struct Piece { /* ... */ }
/// ```
///
/// ## Factories
///
/// Without attributes the type is revived from `Default::default()` and
/// every field is assigned afterwards. Two alternatives:
///
/// ```rust, ignore
/// // fn(&TypedNode) -> Result<Self, SerialError>
/// #[serial(from_json = Self::from_node)]
///
/// // fn(&TypedNode) -> Result<Vec<Value>, SerialError>
/// // fn(Vec<Value>) -> Result<Self, SerialError>
/// #[serial(construct_args = Self::args, construct = Self::new_from)]
/// ```
///
/// Neither requires `Default`.
///
/// ## Fields
///
/// - `#[serial(rename = "name")]`: use another name on the wire.
/// - `#[serial(skip)]`: leave the field out of the schema. The field is
///   never written and keeps its constructed value on revive.
///
/// ## Auto Registration
///
/// `#[serial(auto_register)]` adds the type to `TypeRegistry::global()`.
/// A no-op when the `auto_register` feature is disabled.
///
/// Generic types, tuple structs, unit structs and enums are rejected.
#[proc_macro_derive(Serializable, attributes(serial))]
pub fn derive_serializable(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    impls::match_serial_impls(ast)
}

/// Add the type to the automatic registry.
///
/// If the feature is not enabled, this macro will not do anything.
///
/// ## Example
///
/// ```ignore
/// impl_auto_register!(foo::Foo);
/// ```
///
/// This does not conflict with the `serial(auto_register)` attribute.
#[proc_macro]
pub fn impl_auto_register(_input: TokenStream) -> TokenStream {
    #[cfg(not(feature = "auto_register"))]
    return utils::empty().into();

    #[cfg(feature = "auto_register")]
    {
        let type_path = parse_macro_input!(_input as syn::Type);

        let graft_serial_path = path::graft_serial();
        let auto_register_ = path::auto_register_(&graft_serial_path);

        TokenStream::from(quote::quote! {
            const _: () = {
                #auto_register_::inventory::submit!{
                    #auto_register_::__AutoRegisterFunc(
                        <#type_path as #auto_register_::__RegisterType>::__register
                    )
                }
            };
        })
    }
}

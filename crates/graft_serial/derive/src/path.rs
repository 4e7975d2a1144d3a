//! Paths into `graft_serial` used by generated code.
//!
//! Kept in one place so that moving an item in `graft_serial` only needs a
//! change here.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the access path to the `graft_serial` crate.
///
/// 1. For crates that depend on `graft_serial`, returns `::graft_serial`.
/// 2. For crates that depend on `graft`, returns `::graft::serial`.
/// 3. Otherwise returns `::graft_serial`, which may be incorrect.
///
/// Reading the manifest is not cheap, so the path is resolved once per
/// macro invocation and passed around.
pub(crate) fn graft_serial() -> syn::Path {
    graft_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("graft_serial"))
}

#[inline(always)]
pub(crate) fn fields_(graft_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #graft_serial_path::Fields
    }
}

#[inline(always)]
pub(crate) fn serializable_(graft_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #graft_serial_path::Serializable
    }
}

#[inline(always)]
pub(crate) fn serial_error_(graft_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #graft_serial_path::SerialError
    }
}

#[inline(always)]
pub(crate) fn field_error_(graft_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #graft_serial_path::FieldError
    }
}

#[inline(always)]
pub(crate) fn value_(graft_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #graft_serial_path::value
    }
}

#[inline(always)]
pub(crate) fn typed_node_(graft_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #graft_serial_path::node::TypedNode
    }
}

#[inline(always)]
pub(crate) fn registry_(graft_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #graft_serial_path::registry
    }
}

#[inline(always)]
pub(crate) fn boxed_(graft_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #graft_serial_path::__macro_exports::boxed
    }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(graft_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #graft_serial_path::__macro_exports::auto_register
    }
}

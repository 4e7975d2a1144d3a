// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod trait_fields;
mod trait_get_type_meta;
mod trait_serializable;

// -----------------------------------------------------------------------------
// Internal API

use proc_macro::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::derive_data::SerialStruct;

pub(crate) use auto_register::get_auto_register_impl;
pub(crate) use trait_fields::impl_trait_fields;
pub(crate) use trait_get_type_meta::impl_trait_get_type_meta;
pub(crate) use trait_serializable::impl_trait_serializable;

/// Provided for `#[derive(Serializable)]`.
pub(crate) fn match_serial_impls(ast: DeriveInput) -> TokenStream {
    let info = match SerialStruct::from_input(&ast) {
        Ok(val) => val,
        Err(err) => return err.into_compile_error().into(),
    };

    let fields_impl = impl_trait_fields(&info);
    let serializable_impl = impl_trait_serializable(&info);
    let get_type_meta_impl = impl_trait_get_type_meta(&info);
    let auto_register_impl = get_auto_register_impl(&info);

    TokenStream::from(quote! {
        const _: () = {
            #fields_impl
            #serializable_impl
            #get_type_meta_impl
            #auto_register_impl
        };
    })
}

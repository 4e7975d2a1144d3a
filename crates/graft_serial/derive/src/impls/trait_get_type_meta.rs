use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{FactoryAttr, SerialStruct};

/// Generate implementation code for `GetTypeMeta` trait.
///
/// Hook paths are wrapped in local functions so that a signature mismatch
/// is reported against the user's function rather than deep in a coercion.
pub(crate) fn impl_trait_get_type_meta(info: &SerialStruct) -> TokenStream {
    if !info.attrs().impl_get_type_meta {
        return crate::utils::empty();
    }

    let graft_serial_path = info.graft_serial_path();
    let registry_ = crate::path::registry_(graft_serial_path);
    let serializable_ = crate::path::serializable_(graft_serial_path);
    let serial_error_ = crate::path::serial_error_(graft_serial_path);
    let typed_node_ = crate::path::typed_node_(graft_serial_path);
    let value_ = crate::path::value_(graft_serial_path);
    let boxed_ = crate::path::boxed_(graft_serial_path);

    let real_ident = info.ident();
    let tag = info.tag();

    let factory = match info.attrs().factory() {
        FactoryAttr::Default => quote! {
            #registry_::Factory::of_default::<Self>()
        },
        FactoryAttr::FromJson(path) => quote! {{
            fn __from_json(
                node: &#typed_node_,
            ) -> ::core::result::Result<::std::boxed::Box<dyn #serializable_>, #serial_error_> {
                #path(node).map(#boxed_::<#real_ident>)
            }
            #registry_::Factory::FromJson(__from_json)
        }},
        FactoryAttr::ConstructArgs { args, construct } => quote! {{
            fn __construct_args(
                node: &#typed_node_,
            ) -> ::core::result::Result<::std::vec::Vec<#value_::Value>, #serial_error_> {
                #args(node)
            }
            fn __construct(
                args: ::std::vec::Vec<#value_::Value>,
            ) -> ::core::result::Result<::std::boxed::Box<dyn #serializable_>, #serial_error_> {
                #construct(args).map(#boxed_::<#real_ident>)
            }
            #registry_::Factory::ConstructArgs {
                args: __construct_args,
                construct: __construct,
            }
        }},
    };

    quote! {
        impl #registry_::GetTypeMeta for #real_ident {
            fn get_type_meta() -> #registry_::TypeMeta {
                #registry_::TypeMeta::new::<Self>(#tag, #factory)
            }
        }
    }
}

use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::SerialStruct;

/// Generate implementation code for `Fields` trait.
///
/// Field values go through `ToValue` / `FromValue`; a failed conversion is
/// reported with the wire name of the field.
pub(crate) fn impl_trait_fields(info: &SerialStruct) -> TokenStream {
    let graft_serial_path = info.graft_serial_path();
    let fields_ = crate::path::fields_(graft_serial_path);
    let field_error_ = crate::path::field_error_(graft_serial_path);
    let value_ = crate::path::value_(graft_serial_path);

    let real_ident = info.ident();

    let names: Vec<_> = info.active_fields().map(|field| &field.name).collect();
    let members: Vec<_> = info.active_fields().map(|field| field.member).collect();

    quote! {
        impl #fields_ for #real_ident {
            #[inline]
            fn field_names(&self) -> &'static [&'static str] {
                &[#(#names),*]
            }

            fn field(&self, name: &str) -> ::core::option::Option<#value_::Value> {
                match name {
                    #(
                        #names => ::core::option::Option::Some(
                            #value_::ToValue::to_value(&self.#members)
                        ),
                    )*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables, reason = "unused when the schema is empty")]
            fn set_field(
                &mut self,
                name: &str,
                value: #value_::Value,
            ) -> ::core::result::Result<(), #field_error_> {
                match name {
                    #(
                        #names => {
                            self.#members = #value_::FromValue::from_value(value)
                                .map_err(|source| #field_error_::Mismatch { field: #names, source })?;
                            ::core::result::Result::Ok(())
                        }
                    )*
                    _ => ::core::result::Result::Err(
                        #field_error_::Unknown(::core::convert::From::from(name))
                    ),
                }
            }
        }
    }
}

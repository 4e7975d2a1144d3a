use crate::derive_data::SerialStruct;

/// Generate `auto_register` implementation
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(info: &SerialStruct) -> proc_macro2::TokenStream {
    use quote::quote_spanned;

    if let Some(span) = info.attrs().auto_register {
        let auto_register_ = crate::path::auto_register_(info.graft_serial_path());
        let real_ident = info.ident();

        quote_spanned! { span =>
            #auto_register_::inventory::submit!{
                #auto_register_::__AutoRegisterFunc(
                    <#real_ident as #auto_register_::__RegisterType>::__register
                )
            }
        }
    } else {
        crate::utils::empty()
    }
}

/// Generate `auto_register` implementation
#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &SerialStruct) -> proc_macro2::TokenStream {
    crate::utils::empty()
}

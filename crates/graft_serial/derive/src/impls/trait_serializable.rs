use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::SerialStruct;

/// Generate an empty `Serializable` implementation, every hook at its default.
pub(crate) fn impl_trait_serializable(info: &SerialStruct) -> TokenStream {
    if !info.attrs().impl_serializable {
        return crate::utils::empty();
    }

    let serializable_ = crate::path::serializable_(info.graft_serial_path());
    let real_ident = info.ident();

    quote! {
        impl #serializable_ for #real_ident {}
    }
}

use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::parse::ParseStream;
use syn::{Attribute, Ident, LitStr, Token};

use crate::SERIAL_ATTRIBUTE_NAME;

/// Field level `#[serial(...)]` attributes.
#[derive(Default, Debug)]
pub(crate) struct FieldAttributes {
    pub rename: Option<LitStr>,
    pub skip: Option<Span>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();
        for attr in attrs {
            if attr.path().is_ident(SERIAL_ATTRIBUTE_NAME) {
                attr.parse_args_with(|input: ParseStream| result.parse_stream(input))?;
            }
        }
        if let (Some(rename), Some(_)) = (&result.rename, result.skip) {
            return Err(syn::Error::new(
                rename.span(),
                "a skipped field cannot be renamed",
            ));
        }
        Ok(result)
    }

    fn parse_stream(&mut self, input: ParseStream) -> syn::Result<()> {
        while !input.is_empty() {
            let ident = input.call(Ident::parse_any)?;

            match ident.to_string().as_str() {
                "rename" => {
                    input.parse::<Token![=]>()?;
                    self.rename = Some(input.parse()?);
                }
                "skip" => self.skip = Some(ident.span()),
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown field attribute `{ident}`"),
                    ));
                }
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(())
    }
}

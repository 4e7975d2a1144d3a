use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::parse::ParseStream;
use syn::{Attribute, Ident, LitBool, LitStr, Path, Token};

use crate::SERIAL_ATTRIBUTE_NAME;

/// How the registry entry creates an instance.
#[derive(Debug)]
pub(crate) enum FactoryAttr {
    /// `Default::default()`, then field assignment.
    Default,
    /// `#[serial(from_json = path)]`
    FromJson(Path),
    /// `#[serial(construct_args = path, construct = path)]`
    ConstructArgs { args: Path, construct: Path },
}

/// Type level `#[serial(...)]` attributes.
#[derive(Debug)]
pub(crate) struct TypeAttributes {
    pub tag: Option<LitStr>,
    pub auto_register: Option<Span>,
    /// Default is `true`, use `#[serial(Serializable = false)]` to disable it.
    pub impl_serializable: bool,
    /// Default is `true`, use `#[serial(GetTypeMeta = false)]` to disable it.
    pub impl_get_type_meta: bool,
    from_json: Option<Path>,
    construct_args: Option<Path>,
    construct: Option<Path>,
}

impl Default for TypeAttributes {
    fn default() -> Self {
        Self {
            tag: None,
            auto_register: None,
            impl_serializable: true,
            impl_get_type_meta: true,
            from_json: None,
            construct_args: None,
            construct: None,
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, ident: &Ident) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new(
            ident.span(),
            format!("`{ident}` is specified more than once"),
        ));
    }
    *slot = Some(value);
    Ok(())
}

impl TypeAttributes {
    /// Collects every `#[serial(...)]` on the type.
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();
        for attr in attrs {
            if attr.path().is_ident(SERIAL_ATTRIBUTE_NAME) {
                attr.parse_args_with(|input: ParseStream| result.parse_stream(input))?;
            }
        }
        result.validity()?;
        Ok(result)
    }

    /// Format: `key (= value)?, ...`
    pub fn parse_stream(&mut self, input: ParseStream) -> syn::Result<()> {
        while !input.is_empty() {
            let ident = input.call(Ident::parse_any)?;

            match ident.to_string().as_str() {
                "tag" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "type tag cannot be empty"));
                    }
                    set_once(&mut self.tag, lit, &ident)?;
                }
                "auto_register" => {
                    set_once(&mut self.auto_register, ident.span(), &ident)?;
                }
                "Serializable" => {
                    input.parse::<Token![=]>()?;
                    self.impl_serializable = input.parse::<LitBool>()?.value;
                }
                "GetTypeMeta" => {
                    input.parse::<Token![=]>()?;
                    self.impl_get_type_meta = input.parse::<LitBool>()?.value;
                }
                "from_json" => {
                    input.parse::<Token![=]>()?;
                    set_once(&mut self.from_json, input.parse()?, &ident)?;
                }
                "construct_args" => {
                    input.parse::<Token![=]>()?;
                    set_once(&mut self.construct_args, input.parse()?, &ident)?;
                }
                "construct" => {
                    input.parse::<Token![=]>()?;
                    set_once(&mut self.construct, input.parse()?, &ident)?;
                }
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute `{ident}`"),
                    ));
                }
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(())
    }

    fn validity(&self) -> syn::Result<()> {
        match (&self.from_json, &self.construct_args, &self.construct) {
            (Some(path), Some(_), _) | (Some(path), _, Some(_)) => Err(syn::Error::new_spanned(
                path,
                "`from_json` cannot be combined with `construct_args`",
            )),
            (None, Some(path), None) => Err(syn::Error::new_spanned(
                path,
                "`construct_args` requires `construct`",
            )),
            (None, None, Some(path)) => Err(syn::Error::new_spanned(
                path,
                "`construct` requires `construct_args`",
            )),
            _ => Ok(()),
        }
    }

    pub fn factory(&self) -> FactoryAttr {
        if let Some(path) = &self.from_json {
            return FactoryAttr::FromJson(path.clone());
        }
        match (&self.construct_args, &self.construct) {
            (Some(args), Some(construct)) => FactoryAttr::ConstructArgs {
                args: args.clone(),
                construct: construct.clone(),
            },
            _ => FactoryAttr::Default,
        }
    }
}

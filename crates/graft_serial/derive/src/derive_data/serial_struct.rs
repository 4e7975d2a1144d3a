use std::collections::BTreeMap;

use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Path};

use super::{FieldAttributes, TypeAttributes};

/// A named field and the name it uses on the wire.
pub(crate) struct StructField<'a> {
    pub member: &'a Ident,
    pub attrs: FieldAttributes,
    pub name: LitStr,
}

/// Parsed input of `#[derive(Serializable)]`.
pub(crate) struct SerialStruct<'a> {
    graft_serial_path: Path,
    ident: &'a Ident,
    attrs: TypeAttributes,
    fields: Vec<StructField<'a>>,
}

impl<'a> SerialStruct<'a> {
    pub fn from_input(ast: &'a DeriveInput) -> syn::Result<Self> {
        if !ast.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &ast.generics,
                "`Serializable` cannot be derived for generic types",
            ));
        }

        let named = match &ast.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named,
                _ => {
                    return Err(syn::Error::new(
                        ast.ident.span(),
                        "`Serializable` requires a struct with named fields",
                    ));
                }
            },
            _ => {
                return Err(syn::Error::new(
                    ast.ident.span(),
                    "`Serializable` can only be derived for structs",
                ));
            }
        };

        let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;

        let mut seen: BTreeMap<String, Span> = BTreeMap::new();
        let mut fields = Vec::with_capacity(named.named.len());
        for field in &named.named {
            // Named fields always carry an ident.
            let Some(member) = field.ident.as_ref() else {
                continue;
            };
            let field_attrs = FieldAttributes::parse_attrs(&field.attrs)?;
            let name = match &field_attrs.rename {
                Some(lit) => lit.clone(),
                None => LitStr::new(&member.unraw().to_string(), member.span()),
            };

            if field_attrs.skip.is_none() {
                let value = name.value();
                if crate::RESERVED_KEYS.contains(&value.as_str()) {
                    return Err(syn::Error::new(
                        name.span(),
                        format!("`{value}` is reserved by the wire format"),
                    ));
                }
                if seen.insert(value.clone(), name.span()).is_some() {
                    return Err(syn::Error::new(
                        name.span(),
                        format!("field name `{value}` is used more than once"),
                    ));
                }
            }

            fields.push(StructField {
                member,
                attrs: field_attrs,
                name,
            });
        }

        Ok(Self {
            graft_serial_path: crate::path::graft_serial(),
            ident: &ast.ident,
            attrs,
            fields,
        })
    }

    #[inline]
    pub fn graft_serial_path(&self) -> &Path {
        &self.graft_serial_path
    }

    #[inline]
    pub fn ident(&self) -> &Ident {
        self.ident
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    /// The type tag, defaulting to the type's ident.
    pub fn tag(&self) -> LitStr {
        match &self.attrs.tag {
            Some(lit) => lit.clone(),
            None => LitStr::new(&self.ident.unraw().to_string(), self.ident.span()),
        }
    }

    /// Fields that are part of the schema, in declaration order.
    pub fn active_fields(&self) -> impl Iterator<Item = &StructField<'a>> {
        self.fields.iter().filter(|field| field.attrs.skip.is_none())
    }
}

//! `#[tagwire(...)]` attribute parsing and schema checks

use syn::parse::Parse;
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitInt, Token, Type};

/// A struct field with its wire settings
pub struct FieldLayout<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    pub id: u16,
    pub varint: bool,
}

/// Everything the expansion needs to know about a record
pub struct RecordLayout<'a> {
    pub reserved: Vec<u16>,
    pub fields: Vec<FieldLayout<'a>>,
}

fn tagwire_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("tagwire"))
}

fn parse_reserved(attrs: &[Attribute]) -> syn::Result<Vec<u16>> {
    let mut reserved = Vec::new();
    for attr in tagwire_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("reserved") {
                return Err(meta.error("expected `reserved(...)`"));
            }
            let content;
            syn::parenthesized!(content in meta.input);
            for lit in content.parse_terminated(LitInt::parse, Token![,])? {
                let id = lit.base10_parse::<u16>()?;
                if id == 0 {
                    return Err(syn::Error::new(lit.span(), "field id 0 is not valid"));
                }
                reserved.push(id);
            }
            Ok(())
        })?;
    }
    Ok(reserved)
}

fn parse_field(field: &syn::Field) -> syn::Result<(Option<u16>, bool)> {
    let mut id = None;
    let mut varint = false;
    for attr in tagwire_attrs(&field.attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                let lit: LitInt = meta.value()?.parse()?;
                id = Some(lit.base10_parse::<u16>()?);
                Ok(())
            } else if meta.path.is_ident("varint") {
                varint = true;
                Ok(())
            } else {
                Err(meta.error("expected `id = N` or `varint`"))
            }
        })?;
    }
    Ok((id, varint))
}

impl<'a> RecordLayout<'a> {
    /// Read and check the record layout of a derive input
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named,
                Fields::Unit => {
                    return Err(syn::Error::new_spanned(
                        &input.ident,
                        "Record needs named fields; use `struct Name {}`",
                    ))
                }
                Fields::Unnamed(fields) => {
                    return Err(syn::Error::new(
                        fields.span(),
                        "Record can only be derived for structs with named fields",
                    ))
                }
            },
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Record can only be derived for structs",
                ))
            }
        };

        if let Some(param) = input.generics.type_params().next() {
            return Err(syn::Error::new_spanned(param, "Record does not support type parameters"));
        }
        if let Some(param) = input.generics.const_params().next() {
            return Err(syn::Error::new_spanned(param, "Record does not support const parameters"));
        }
        if let Some(extra) = input.generics.lifetimes().nth(1) {
            return Err(syn::Error::new_spanned(
                extra,
                "Record supports at most one lifetime parameter",
            ));
        }

        let reserved = parse_reserved(&input.attrs)?;
        let mut fields = Vec::with_capacity(named.named.len());
        let mut last_id = 0u16;

        for field in &named.named {
            let (id, varint) = parse_field(field)?;
            let Some(ident) = field.ident.as_ref() else {
                continue;
            };
            let id = id.ok_or_else(|| {
                syn::Error::new_spanned(ident, "missing `#[tagwire(id = N)]` on field")
            })?;

            if id == 0 {
                return Err(syn::Error::new_spanned(ident, "field id 0 is not valid"));
            }
            if reserved.contains(&id) {
                return Err(syn::Error::new_spanned(ident, format!("field id {id} is reserved")));
            }
            if id <= last_id {
                return Err(syn::Error::new_spanned(
                    ident,
                    format!("field id {id} must be greater than the previous id {last_id}"),
                ));
            }
            last_id = id;

            fields.push(FieldLayout {
                ident,
                ty: &field.ty,
                id,
                varint,
            });
        }

        Ok(Self { reserved, fields })
    }
}

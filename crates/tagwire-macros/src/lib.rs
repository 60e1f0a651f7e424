//! Procedural macros for tagwire

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{parse_macro_input, DeriveInput, Lifetime};

mod attrs;

use attrs::{FieldLayout, RecordLayout};

/// Derive `Wire`, `Marshal` and `Unmarshal` for a tagged record
///
/// Every field needs `#[tagwire(id = N)]`, with ids ascending in declaration
/// order. Integer fields may add `varint` to be written as varints. Retired
/// ids go in `#[tagwire(reserved(...))]` on the struct. Fields missing from
/// the data decode as `Default::default()`.
#[proc_macro_derive(Record, attributes(tagwire))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let record = RecordLayout::from_input(input)?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let de = input
        .generics
        .lifetimes()
        .next()
        .map(|param| param.lifetime.clone())
        .unwrap_or_else(|| Lifetime::new("'de", Span::call_site()));
    let de_generics = if input.generics.lifetimes().next().is_some() {
        quote!(#impl_generics)
    } else {
        quote!(<#de>)
    };

    let size_fields = record.fields.iter().map(|field| {
        let id = field.id;
        let value = field_value(field);
        quote! { size += ::tagwire::size_field(#id, #value); }
    });

    let marshal_fields = record.fields.iter().map(|field| {
        let id = field.id;
        let value = field_value(field);
        quote! {
            let n = ::tagwire::marshal_field(n, b, #id, #value)
                .map_err(|e| e.in_field(#id))?;
        }
    });

    let locals: Vec<_> = record
        .fields
        .iter()
        .map(|field| format_ident!("__{}", field.ident.unraw()))
        .collect();

    let unmarshal_fields = record.fields.iter().zip(&locals).map(|(field, local)| {
        let id = field.id;
        let ty = field.ty;
        let read = if field.varint {
            quote! {
                let (next, value) = ::tagwire::unmarshal_field::<::tagwire::Varint<#ty>>(n, b, wire_type)
                    .map_err(|e| e.in_field(#id))?;
                #local = value.0;
            }
        } else {
            quote! {
                let (next, value) = ::tagwire::unmarshal_field::<#ty>(n, b, wire_type)
                    .map_err(|e| e.in_field(#id))?;
                #local = value;
            }
        };
        quote! {
            let mut #local: #ty = ::core::default::Default::default();
            let (next, presence) = ::tagwire::handle_compatibility(n, b, RESERVED, #id)?;
            n = next;
            if let ::tagwire::Presence::Present(wire_type) = presence {
                #read
                n = next;
            }
        }
    });

    let idents = record.fields.iter().map(|field| field.ident);
    let reserved = &record.reserved;

    Ok(quote! {
        impl #impl_generics ::tagwire::Wire for #name #ty_generics #where_clause {
            const FRAMING: ::tagwire::Framing = ::tagwire::Framing::Record;
        }

        impl #impl_generics ::tagwire::Marshal for #name #ty_generics #where_clause {
            #[allow(unused_mut)]
            fn size(&self) -> usize {
                let mut size = ::tagwire::constants::TERMINATOR_SIZE;
                #(#size_fields)*
                size
            }

            fn marshal(&self, n: usize, b: &mut [u8]) -> ::tagwire::Result<usize> {
                #(#marshal_fields)*
                ::tagwire::marshal_terminator(n, b)
            }
        }

        impl #de_generics ::tagwire::Unmarshal<#de> for #name #ty_generics #where_clause {
            #[allow(unused_mut)]
            fn unmarshal(n: usize, b: &#de [u8]) -> ::tagwire::Result<(usize, Self)> {
                const RESERVED: &[u16] = &[#(#reserved),*];
                let mut n = n;
                #(#unmarshal_fields)*
                let n = ::tagwire::finish_record(n, b, RESERVED)?;
                Ok((n, Self { #(#idents: #locals),* }))
            }

            fn skip(n: usize, b: &#de [u8]) -> ::tagwire::Result<usize> {
                ::tagwire::skip_record(n, b)
            }
        }
    })
}

/// Reference to the value written for a field
fn field_value(field: &FieldLayout<'_>) -> TokenStream2 {
    let ident = field.ident;
    if field.varint {
        quote!(&::tagwire::Varint(self.#ident))
    } else {
        quote!(&self.#ident)
    }
}

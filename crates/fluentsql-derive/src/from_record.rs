//! FromRecord derive macro implementation

use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "FromRecord can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "FromRecord can only be derived for structs",
            ));
        }
    };

    let mut columns = Vec::new();
    let mut arms = Vec::new();
    for field in fields {
        let attrs = FieldAttrs::parse(field)?;
        if attrs.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let column = attrs.column.unwrap_or_else(|| ident.to_string());
        let idx = Literal::usize_unsuffixed(columns.len());
        columns.push(column);
        arms.push(quote! {
            #idx => self.#ident = fluentsql::FromValue::from_value(value)?,
        });
    }

    Ok(quote! {
        impl #impl_generics fluentsql::FromRecord for #name #ty_generics #where_clause {
            fn bindings() -> &'static [&'static str] {
                &[#(#columns),*]
            }

            fn assign(
                &mut self,
                field: usize,
                value: &fluentsql::Value,
            ) -> ::core::result::Result<(), fluentsql::ValueError> {
                match field {
                    #(#arms)*
                    _ => {}
                }
                Ok(())
            }
        }
    })
}

#[derive(Default)]
struct FieldAttrs {
    column: Option<String>,
    skip: bool,
}

impl FieldAttrs {
    fn parse(field: &Field) -> Result<Self> {
        let mut out = FieldAttrs::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("fluentsql") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("column") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.column = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `column = \"...\"` or `skip`"))
                }
            })?;
        }
        Ok(out)
    }
}

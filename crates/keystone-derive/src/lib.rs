//! Provides derive macros for `keystone::Layer`.
use std::collections::HashSet;

use quote::quote;
use syn::{Data, DataStruct, DeriveInput, Field, Fields, FieldsNamed};

struct Composite {
    function_body: proc_macro2::TokenStream,
    where_constraints: Vec<proc_macro2::TokenStream>,
}

/// Returns whether the field is marked `#[layer(ignore)]`.
fn is_ignored(field: &Field) -> syn::Result<bool> {
    let mut ignore = false;
    for att in field.attrs.iter() {
        if att.path().is_ident("layer") {
            att.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignore") {
                    ignore = true;
                    Ok(())
                } else {
                    Err(meta.error(format!(
                        "unsupported field attribute {:?} - must be 'ignore'",
                        meta.path
                            .get_ident()
                            .map(|id| id.to_string())
                            .unwrap_or("unknown".to_string())
                    )))
                }
            })?;
        }
    }
    Ok(ignore)
}

fn get_composite(input: &DeriveInput) -> syn::Result<Composite> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(FieldsNamed { named, .. }),
            ..
        }) => named,
        _ => {
            return Err(syn::Error::new(
                name.span(),
                "deriving Layer only supports structs with named fields".to_string(),
            ));
        }
    };

    let mut layered_types = HashSet::new();
    let mut composites = vec![];
    for field in fields.iter() {
        // UNWRAP: safe because we only support structs with named fields
        let ident = field.ident.clone().unwrap();
        let ty = &field.ty;
        if is_ignored(field)? {
            composites.push(quote! {
                #ident: self.#ident,
            });
        } else {
            layered_types.insert(ty);
            composites.push(quote! {
                #ident: <#ty as keystone::Layer>::layer(self.#ident, over.#ident),
            });
        }
    }
    let where_constraints: Vec<_> = layered_types
        .into_iter()
        .map(|ty| quote! { #ty: keystone::Layer })
        .collect();
    let function_body = quote! {
        #name {
            #(#composites)*
        }
    };
    Ok(Composite {
        function_body,
        where_constraints,
    })
}

/// Derives `keystone::Layer` field by field.
///
/// Every field is layered with its own `Layer` implementation, except fields
/// marked `#[layer(ignore)]` which always keep the value of the bottom layer.
#[proc_macro_derive(Layer, attributes(layer))]
pub fn derive_layer(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input: DeriveInput = syn::parse_macro_input!(input);
    let name = &input.ident;
    let Composite {
        function_body,
        where_constraints,
    } = match get_composite(&input) {
        Ok(c) => c,
        Err(e) => return e.into_compile_error().into(),
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let mut predicates = where_clause
        .map(|clause| {
            clause
                .predicates
                .iter()
                .map(|p| quote! { #p })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    predicates.extend(where_constraints);

    let output = quote! {
        impl #impl_generics keystone::Layer for #name #ty_generics
        where
            #(#predicates),*
        {
            #[allow(unused_variables)]
            fn layer(self, over: Self) -> Self {
                #function_body
            }
        }
    };
    output.into()
}

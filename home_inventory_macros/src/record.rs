use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr};

struct KeyColumn<'a> {
    field: &'a Field,
    fold_case: bool,
}

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let table = extract_table(input)?;
    let columns = extract_key_columns(input)?;

    let (key_type, key_expr) = if columns.len() == 1 {
        let column = &columns[0];
        (column_type(column), column_expr(column))
    } else {
        let types = columns.iter().map(column_type);
        let exprs = columns.iter().map(column_expr);
        (quote! { ( #(#types),* ) }, quote! { ( #(#exprs),* ) })
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics home_inventory::Record for #name #ty_generics #where_clause {
            type Key = #key_type;

            const TABLE: &'static str = #table;

            fn key(&self) -> Self::Key {
                #key_expr
            }
        }
    })
}

fn column_type(column: &KeyColumn<'_>) -> TokenStream2 {
    if column.fold_case {
        quote! { ::std::string::String }
    } else {
        let ty = &column.field.ty;
        quote! { #ty }
    }
}

fn column_expr(column: &KeyColumn<'_>) -> TokenStream2 {
    let ident = &column.field.ident;
    if column.fold_case {
        quote! { self.#ident.to_lowercase() }
    } else {
        quote! { ::std::clone::Clone::clone(&self.#ident) }
    }
}

fn extract_table(input: &DeriveInput) -> syn::Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        let mut table = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                table = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `table = \"...\"`"))
            }
        })?;

        if let Some(t) = table {
            return Ok(t);
        }
    }

    // Default: snake_case struct name + "s"
    let name = input.ident.to_string();
    Ok(format!("{}s", to_snake_case(&name)))
}

fn extract_key_columns(input: &DeriveInput) -> syn::Result<Vec<KeyColumn<'_>>> {
    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Record derive: only structs with named fields are supported",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Record derive: only structs are supported",
            ))
        }
    };

    let mut columns = Vec::new();
    for field in fields {
        for attr in &field.attrs {
            if !attr.path().is_ident("record") {
                continue;
            }

            let mut is_key = false;
            let mut fold_case = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("key") {
                    is_key = true;
                    Ok(())
                } else if meta.path.is_ident("fold_case") {
                    fold_case = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `key` or `fold_case`"))
                }
            })?;

            if fold_case && !is_key {
                return Err(syn::Error::new_spanned(
                    attr,
                    "Record derive: `fold_case` only applies to key fields",
                ));
            }
            if is_key {
                columns.push(KeyColumn { field, fold_case });
            }
        }
    }

    if !columns.is_empty() {
        return Ok(columns);
    }

    // Default: look for a field named "id"
    fields
        .iter()
        .find(|field| field.ident.as_ref().is_some_and(|ident| ident == "id"))
        .map(|field| {
            vec![KeyColumn {
                field,
                fold_case: false,
            }]
        })
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &input.ident,
                "Record derive: no field marked with #[record(key)] and no field named `id`",
            )
        })
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

use proc_macro::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{parse_macro_input, Data, DeriveInput, Expr, Fields, Lit, LitStr, Meta, Token, Type};

/// Derive macro that describes the CSV columns of an import row type.
///
/// For each field, extracts:
/// - Column name (`#[serde(rename = "...")]`, else the struct-level
///   `#[serde(rename_all = "...")]` applied to the field name)
/// - Whether a cell value is required (true if not `Option<T>`)
/// - Description (from doc comments)
///
/// Fields marked `#[csv(skip)]` are not CSV columns (e.g. generated ids).
///
/// Generates a `csv_schema() -> &'static [crate::import::CsvField]` method.
#[proc_macro_derive(CsvSchema, attributes(serde, csv))]
pub fn derive_csv_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(name, "CsvSchema only supports named fields")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "CsvSchema only supports structs")
                .to_compile_error()
                .into()
        }
    };

    let rename_all = serde_value(&input.attrs, "rename_all");

    let columns: Vec<_> = fields
        .iter()
        .filter(|field| !has_csv_skip(&field.attrs))
        .filter_map(|field| {
            let ident = field.ident.as_ref()?.to_string();
            let column = serde_value(&field.attrs, "rename")
                .unwrap_or_else(|| apply_rename_all(&ident, rename_all.as_deref()));
            let required = !cell_is_optional(&field.ty);
            let doc = doc_text(&field.attrs);
            Some((column, required, doc))
        })
        .collect();

    let entries = columns.iter().map(|(column, required, desc)| {
        quote! {
            crate::import::CsvField {
                name: #column,
                required: #required,
                description: #desc,
            }
        }
    });

    let expanded = quote! {
        impl #name {
            pub fn csv_schema() -> &'static [crate::import::CsvField] {
                static SCHEMA: &[crate::import::CsvField] = &[
                    #(#entries),*
                ];
                SCHEMA
            }
        }
    };

    TokenStream::from(expanded)
}

/// Look up `key = "..."` inside any `#[serde(...)]` attribute.
fn serde_value(attrs: &[syn::Attribute], key: &str) -> Option<String> {
    let mut found = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                let value: LitStr = meta.value()?.parse()?;
                found = Some(value.value());
                Ok(())
            } else {
                skip_meta(&meta)
            }
        });
    }
    found
}

fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}

fn has_csv_skip(attrs: &[syn::Attribute]) -> bool {
    let mut skip = false;
    for attr in attrs.iter().filter(|a| a.path().is_ident("csv")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
            }
            Ok(())
        });
    }
    skip
}

fn apply_rename_all(field: &str, rule: Option<&str>) -> String {
    match rule {
        Some("camelCase") => {
            let mut out = String::with_capacity(field.len());
            let mut upper = false;
            for c in field.chars() {
                if c == '_' {
                    upper = true;
                } else if upper {
                    out.extend(c.to_uppercase());
                    upper = false;
                } else {
                    out.push(c);
                }
            }
            out
        }
        Some("lowercase") => field.to_lowercase(),
        Some("UPPERCASE") => field.to_uppercase(),
        _ => field.to_string(),
    }
}

/// Doc comment lines of a field, joined into one column description.
fn doc_text(attrs: &[syn::Attribute]) -> String {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(syn::MetaNameValue {
                value: Expr::Lit(syn::ExprLit { lit: Lit::Str(text), .. }),
                ..
            }) => Some(text.value().trim().to_string()),
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect();
    lines.join(" ")
}

/// An `Option<_>` field is a column whose cells may be left empty.
fn cell_is_optional(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Option"),
        _ => false,
    }
}

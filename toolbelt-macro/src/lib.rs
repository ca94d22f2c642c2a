//! Procedural macros for the toolbelt tool server.
//!
//! This crate provides `#[derive(Schema)]`, which turns a plain struct with
//! named fields into a declarative `toolbelt::schema::ObjectSchema`.
//!
//! # Example
//!
//! ```ignore
//! use toolbelt::prelude::*;
//!
//! #[derive(Deserialize, Schema)]
//! struct HashInput {
//!     #[schema(description = "Text to hash")]
//!     text: String,
//!     #[schema(
//!         description = "Hash algorithm",
//!         one_of = "md5,sha256",
//!         error = "unsupported algorithm"
//!     )]
//!     algorithm: Option<String>,
//! }
//! ```
//!
//! Field names follow `#[serde(rename = "...")]` so the validated key is the
//! one serde decodes.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    ext::IdentExt, parse_macro_input, punctuated::Punctuated, Attribute, Data, DeriveInput, Expr,
    ExprLit, Field, Fields, GenericArgument, Lit, Meta, PathArguments, Token, Type,
};

/// Attributes accepted by `#[schema(...)]` on a field.
#[derive(Default, Debug)]
struct FieldAttrs {
    /// Human-readable description.
    description: Option<String>,
    /// Comma separated list of allowed values.
    one_of: Vec<String>,
    /// Label for values outside `one_of`.
    error: Option<String>,
}

impl FieldAttrs {
    fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = FieldAttrs::default();

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("schema")) {
            let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
            attrs.merge(metas)?;
        }

        Ok(attrs)
    }

    fn merge(&mut self, metas: Punctuated<Meta, Token![,]>) -> syn::Result<()> {
        for meta in metas {
            let nv = match meta {
                Meta::NameValue(nv) => nv,
                other => return Err(syn::Error::new_spanned(other, "expected name = value")),
            };

            let ident = nv
                .path
                .get_ident()
                .ok_or_else(|| syn::Error::new_spanned(&nv.path, "expected identifier"))?
                .to_string();

            let value = string_literal(&nv.value)?;

            match ident.as_str() {
                "description" => self.description = Some(value),
                "error" => self.error = Some(value),
                "one_of" => {
                    self.one_of = value
                        .split(',')
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(String::from)
                        .collect();
                }
                _ => {
                    return Err(syn::Error::new_spanned(
                        nv.path,
                        format!("unknown schema attribute: {}", ident),
                    ));
                }
            }
        }

        Ok(())
    }
}

fn string_literal(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit_str),
            ..
        }) => Ok(lit_str.value()),
        _ => Err(syn::Error::new_spanned(expr, "expected string literal")),
    }
}

/// The `rename = "..."` value from `#[serde(...)]` attributes, if any.
///
/// Renames that differ between directions, and container-level
/// `rename_all`, are rejected rather than guessed.
fn serde_rename(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut rename = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        for meta in metas {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    rename = Some(string_literal(&nv.value)?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    return Err(syn::Error::new_spanned(
                        nv,
                        "Schema does not support serde(rename_all); rename fields individually",
                    ));
                }
                Meta::List(list) if list.path.is_ident("rename") => {
                    return Err(syn::Error::new_spanned(
                        list,
                        "Schema only supports serde(rename = \"...\")",
                    ));
                }
                _ => {}
            }
        }
    }

    Ok(rename)
}

/// Derive `toolbelt::schema::Schema` for a struct with named fields.
///
/// Field types map onto schema kinds:
///
/// - `String` / `&str` -> `FieldKind::String`
/// - `bool` -> `FieldKind::Boolean`
/// - integer primitives -> `FieldKind::Integer`
/// - `f32` / `f64` -> `FieldKind::Number`
/// - `Option<T>` -> the kind of `T`, marked optional
///
/// Every other field is required. `#[schema(...)]` takes `description`,
/// `one_of` (comma separated) and `error` (label for rejected values).
#[proc_macro_derive(Schema, attributes(schema))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_schema(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_schema(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Schema can only be derived for structs with named fields (use `struct X {}` for no fields)",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Schema can only be derived for structs",
            ));
        }
    };

    serde_rename(&input.attrs)?;

    let mut field_exprs = Vec::with_capacity(fields.len());
    for field in fields {
        field_exprs.push(field_spec(field)?);
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::toolbelt::schema::Schema for #ident #ty_generics #where_clause {
            fn schema() -> ::toolbelt::schema::ObjectSchema {
                ::toolbelt::schema::ObjectSchema::new()
                    #( .field(#field_exprs) )*
            }
        }
    })
}

fn field_spec(field: &Field) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = FieldAttrs::from_field(field)?;

    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let name = match serde_rename(&field.attrs)? {
        Some(rename) => rename,
        None => ident.unraw().to_string(),
    };

    let (inner, required) = match option_inner(&field.ty) {
        Some(inner) => (inner, false),
        None => (&field.ty, true),
    };

    let kind = field_kind(inner).ok_or_else(|| {
        syn::Error::new_spanned(
            &field.ty,
            "unsupported field type: expected String, bool, an integer, a float, or Option of those",
        )
    })?;
    let kind = proc_macro2::Ident::new(kind, proc_macro2::Span::call_site());

    let description = attrs.description.map(|d| quote! { .description(#d) });
    let one_of = if attrs.one_of.is_empty() {
        None
    } else {
        let values = &attrs.one_of;
        Some(quote! { .one_of(&[#(#values),*]) })
    };
    let error = attrs.error.map(|e| quote! { .error(#e) });

    Ok(quote! {
        ::toolbelt::schema::FieldSpec::new(#name, ::toolbelt::schema::FieldKind::#kind)
            .required(#required)
            #description
            #one_of
            #error
    })
}

/// Return `T` when `ty` is `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// Map a Rust type onto the name of a `FieldKind` variant.
fn field_kind(ty: &Type) -> Option<&'static str> {
    match ty {
        Type::Reference(reference) => field_kind(&reference.elem),
        Type::Path(type_path) => {
            let ident = type_path.path.segments.last()?.ident.to_string();
            match ident.as_str() {
                "String" | "str" => Some("String"),
                "bool" => Some("Boolean"),
                "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32"
                | "u64" | "u128" | "usize" => Some("Integer"),
                "f32" | "f64" => Some("Number"),
                _ => None,
            }
        }
        _ => None,
    }
}

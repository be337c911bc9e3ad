//! Derives `OperatorFromStr` for fieldless enums whose variants are tagged
//! with `#[op("...")]`, generating a `from_str` that maps the token back to
//! the variant and an `as_str` that goes the other way.
//!
//! This plays the same role as a hand-written `match` over the operator
//! strings that the AST carries at its boundary, but keeps the mapping next
//! to the enum definition instead of scattered across the lowering pass.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

fn op_literal(attrs: &[syn::Attribute]) -> LitStr {
    for attr in attrs {
        if attr.path().is_ident("op") {
            let lit: LitStr = attr
                .parse_args()
                .expect("#[op(\"...\")] must contain a single string literal");
            return lit;
        }
    }
    panic!("every variant of an OperatorFromStr enum needs an #[op(\"...\")] attribute");
}

#[proc_macro_derive(OperatorFromStr, attributes(op))]
pub fn operator_from_str_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => panic!("OperatorFromStr can only be derived for enums"),
    };

    let mut idents = Vec::new();
    let mut tokens = Vec::new();
    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            panic!("OperatorFromStr variants must not carry fields");
        }
        idents.push(&variant.ident);
        tokens.push(op_literal(&variant.attrs));
    }

    let expanded = quote! {
        impl #name {
            /// Parses a VSL operator token, returning `None` for anything
            /// outside the documented set.
            pub fn from_str(token: &str) -> ::core::option::Option<#name> {
                match token {
                    #( #tokens => ::core::option::Option::Some(#name::#idents), )*
                    _ => ::core::option::Option::None,
                }
            }

            /// Renders the operator back to its source token.
            pub fn as_str(&self) -> &'static str {
                match self {
                    #( #name::#idents => #tokens, )*
                }
            }
        }
    };
    expanded.into()
}

//! Implementation of the `#[derive(Component)]` macro.
//!
//! Generates an implementation of `tessera::Component` that points at the
//! struct's `ComponentBase` field, serializes the struct as the template
//! context, and renders every `#[component(child)]` field before the parent.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Data, DeriveInput, Error, Field, Fields, Ident, Result, Type};

use super::attrs::{has_serde_rename_all, parse_container_attrs, parse_field_attrs, serde_rename};

/// Main implementation of the Component derive macro.
pub fn component_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let container = parse_container_attrs(&input.attrs)?;
    let renames_all = has_serde_rename_all(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Component can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Component can only be derived for structs",
            ))
        }
    };

    let mut explicit_base: Option<&Ident> = None;
    let mut implicit_base: Option<&Ident> = None;
    // (field, key its rendered markup is stored under)
    let mut children: Vec<(&Ident, String)> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;
        let attrs = parse_field_attrs(&field.attrs)?;

        if attrs.base {
            if explicit_base.is_some() {
                return Err(Error::new(
                    field.span(),
                    "only one field can be marked #[component(base)]",
                ));
            }
            explicit_base = Some(field_name);
        } else if attrs.child {
            let key = match serde_rename(&field.attrs)? {
                Some(key) => key,
                None if renames_all => {
                    return Err(Error::new(
                        field.span(),
                        "#[component(child)] fields need #[serde(rename = \"...\")] when the struct uses #[serde(rename_all)]",
                    ))
                }
                None => unraw(field_name),
            };
            children.push((field_name, key));
        } else if implicit_base.is_none() && looks_like_base(field) {
            implicit_base = Some(field_name);
        }
    }

    let base_field = explicit_base.or(implicit_base).ok_or_else(|| {
        Error::new(
            input.span(),
            "Component requires a ComponentBase field: name it `base` or mark it #[component(base)]",
        )
    })?;

    let type_name = container
        .name
        .unwrap_or_else(|| struct_name.to_string());

    let source_dir = match container.dir {
        Some(dir) => quote! {
            ::std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(#dir)
        },
        None => quote! {
            ::std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        },
    };

    // Only emitted when there is something to render.
    let render_children = if children.is_empty() {
        quote! {}
    } else {
        let slots = children.iter().map(|(child, key)| {
            quote! {
                let slot = ::tessera::Children::render_children(&self.#child, scope, context)?;
                context.insert(#key.to_string(), slot);
            }
        });
        quote! {
            fn render_children(
                &self,
                scope: &::tessera::Scope,
                context: &mut ::tessera::Context,
            ) -> ::tessera::Result<()> {
                #(#slots)*
                Ok(())
            }
        }
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::tessera::Component for #struct_name #ty_generics #where_clause {
            fn base(&self) -> &::tessera::ComponentBase {
                &self.#base_field
            }

            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn source_dir(&self) -> ::std::path::PathBuf {
                #source_dir
            }

            fn fields(&self) -> ::tessera::Result<::tessera::Context> {
                ::tessera::fields_of(self)
            }

            #render_children
        }
    };

    Ok(expanded)
}

/// A field named `base`, or typed `ComponentBase` (any path ending in it).
fn looks_like_base(field: &Field) -> bool {
    if field.ident.as_ref().is_some_and(|ident| ident == "base") {
        return true;
    }
    match &field.ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "ComponentBase"),
        _ => false,
    }
}

/// Field name as it appears in serialized output (`r#type` -> `type`).
fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
}

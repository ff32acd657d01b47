//! Attribute parsing for the Component derive macro.
//!
//! Struct level: `#[component(dir = "...", name = "...")]`.
//! Field level: `#[component(base)]`, `#[component(child)]`.
//!
//! Child slots are keyed the way serde names the field, so the `rename`
//! forms of `#[serde(...)]` are read here too.

use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Lit, Meta, MetaList, Result, Token,
};

/// Struct-level attributes.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    /// Template directory relative to the crate manifest.
    pub dir: Option<String>,
    /// Override for the name file names are derived from.
    pub name: Option<String>,
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("dir") => {
                    attr.dir = Some(string_value(&nv.value, "dir")?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    let name = string_value(&nv.value, "name")?;
                    if name.is_empty() {
                        return Err(Error::new(nv.value.span(), "name must not be empty"));
                    }
                    attr.name = Some(name);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown component attribute. Expected: dir = \"...\" or name = \"...\"",
                    ))
                }
            }
        }

        Ok(attr)
    }
}

/// Field-level attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldAttr {
    /// This field is the `ComponentBase`.
    pub base: bool,
    /// This field holds nested components.
    pub child: bool,
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("base") => attr.base = true,
                Meta::Path(p) if p.is_ident("child") => attr.child = true,
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown component field attribute. Expected: base or child",
                    ))
                }
            }
        }

        if attr.base && attr.child {
            return Err(Error::new(
                input.span(),
                "a field cannot be both the component base and a child",
            ));
        }

        Ok(attr)
    }
}

fn string_value(expr: &Expr, key: &str) -> Result<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        _ => Err(Error::new(
            expr.span(),
            format!("{} must be a string literal", key),
        )),
    }
}

/// Serialized name from `#[serde(rename = "...")]` or
/// `#[serde(rename(serialize = "..."))]`, if present.
pub fn serde_rename(attrs: &[Attribute]) -> Result<Option<String>> {
    let mut rename = None;
    for meta in serde_metas(attrs)? {
        match &meta {
            Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                rename = Some(string_value(&nv.value, "rename")?);
            }
            Meta::List(list) if list.path.is_ident("rename") => {
                if let Some(value) = serialize_value(list)? {
                    rename = Some(value);
                }
            }
            _ => {}
        }
    }
    Ok(rename)
}

/// True if `#[serde(rename_all ...)]` changes serialized field names.
pub fn has_serde_rename_all(attrs: &[Attribute]) -> Result<bool> {
    for meta in serde_metas(attrs)? {
        match &meta {
            Meta::NameValue(nv) if nv.path.is_ident("rename_all") => return Ok(true),
            Meta::List(list) if list.path.is_ident("rename_all") => {
                if serialize_value(list)?.is_some() {
                    return Ok(true);
                }
            }
            _ => {}
        }
    }
    Ok(false)
}

fn serde_metas(attrs: &[Attribute]) -> Result<Vec<Meta>> {
    let mut metas = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("serde") {
            let content = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
            metas.extend(content);
        }
    }
    Ok(metas)
}

/// The `serialize = "..."` entry of `rename(...)` or `rename_all(...)`.
fn serialize_value(list: &MetaList) -> Result<Option<String>> {
    let nested = list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
    for meta in nested {
        if let Meta::NameValue(nv) = &meta {
            if nv.path.is_ident("serialize") {
                return string_value(&nv.value, "serialize").map(Some);
            }
        }
    }
    Ok(None)
}

/// Extract `#[component(...)]` from struct attributes.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    for attr in attrs {
        if attr.path().is_ident("component") {
            return attr.parse_args::<ContainerAttr>();
        }
    }
    Ok(ContainerAttr::default())
}

/// Extract `#[component(...)]` from field attributes.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("component") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}

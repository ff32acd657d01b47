//! Proc macros for Tessera.
//!
//! # Available Macros
//!
//! - [`Component`] - Implement `tessera::Component` from struct annotations
//!
//! # Examples
//!
//! For working examples, see `tessera/tests/derive_component.rs`.

mod component;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `tessera::Component` for a struct with named fields.
///
/// The struct must also implement `serde::Serialize`; its serialized fields
/// become the template context.
///
/// # Struct Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `dir = "path"` | Directory holding the template and script, relative to the crate's `CARGO_MANIFEST_DIR` (default: the manifest directory) |
/// | `name = "TypeName"` | Name used to derive file names (default: the struct name) |
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `base` | Marks the `ComponentBase` field (default: a field named `base` or typed `ComponentBase`) |
/// | `child` | Field holds nested components (`Rc<T>`, `Vec<_>`, `Option<_>`, maps) rendered before the parent |
///
/// A child's rendered form replaces the field under its serialized name, so
/// `#[serde(rename = "...")]` is honored. With `#[serde(rename_all)]` on the
/// struct, child fields must carry an explicit `rename`.
///
/// # Example
///
/// ```ignore
/// use std::rc::Rc;
/// use serde::Serialize;
/// use tessera::{Component, ComponentBase};
///
/// #[derive(Serialize, Component)]
/// #[component(dir = "templates/cards")]
/// struct Card {
///     #[serde(flatten)]
///     base: ComponentBase,
///     title: String,
///     #[component(child)]
///     actions: Vec<Rc<Button>>,
/// }
/// ```
///
/// This renders `templates/cards/card.html` and inlines
/// `templates/cards/card.js` when that file exists.
#[proc_macro_derive(Component, attributes(component))]
pub fn component_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::component_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

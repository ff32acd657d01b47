//! # Tessera - Declarative Server-Rendered Components
//!
//! `tessera` turns plain Rust structs into HTML components. A component is a
//! typed record bound to a Jinja template file next to its declaration. It is
//! registered in the current [`Scope`] when created, renders its nested child
//! components first, and returns HTML with an optional companion script
//! inlined.
//!
//! ## Core Concepts
//!
//! - [`Component`]: A struct bound to a template, usually via `#[derive(Component)]`
//! - [`ComponentBase`]: The `id`, `js` and `html` fields every component carries
//! - [`Scope`]: Request-scoped engine binding and component [`Registry`]
//! - [`TemplateEngine`]: Template backend seam; [`MiniJinjaEngine`] is the default
//! - [`Markup`]: Rendered HTML, never escaped again
//!
//! ## File Layout
//!
//! For a component type `NavBar` declared with `#[component(dir = "ui")]`:
//!
//! ```text
//! ui/nav_bar.html   template (required)
//! ui/nav-bar.js     companion script (optional, inlined in a <script> tag)
//! ```
//!
//! The template name is the component directory relative to the engine's
//! search root, so `ui` must live under that root.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use std::sync::Arc;
//! use serde::Serialize;
//! use tessera::{Component, ComponentBase, MiniJinjaEngine, Scope};
//!
//! #[derive(Serialize, Component)]
//! #[component(dir = "ui")]
//! struct Button {
//!     #[serde(flatten)]
//!     base: ComponentBase,
//!     text: String,
//! }
//!
//! // ui/button.html: <button id="{{ id }}">{{ text }}</button>
//! let engine = Arc::new(MiniJinjaEngine::with_search_root(env!("CARGO_MANIFEST_DIR")));
//! let scope = Scope::with_engine(engine);
//!
//! let button = scope.create(Button {
//!     base: ComponentBase::new("save")?,
//!     text: "Save".into(),
//! })?;
//! assert_eq!(button.render(&scope)?, r#"<button id="save">Save</button>"#);
//! ```
//!
//! ## Nested Components
//!
//! Mark fields holding components with `#[component(child)]`. Before the
//! parent renders, each child is rendered and its markup stored in the
//! parent's context twice: under the child's id, and in place of the field
//! itself. Lists and maps of children become lists and maps of markup.
//!
//! Any component registered in the scope can also be embedded by id, whether
//! or not it is a field of the component being rendered.
//!
//! ## Trust Model
//!
//! Output is assembled without escaping. Rendered children are passed to
//! templates as safe strings, and [`MiniJinjaEngine`] disables auto-escaping,
//! so untrusted data must be sanitized before it is stored in a component.

// Lets `#[derive(Component)]` expand to `::tessera::...` paths inside this crate.
extern crate self as tessera;

pub mod component;
pub mod context;
pub mod engine;
mod error;
mod markup;
pub mod naming;
pub mod registry;
pub mod resolver;
mod scope;
pub mod script;

pub use component::{Children, Component, ComponentBase};
pub use context::{fields_of, Context, ContextValue};
pub use engine::{CompiledTemplate, MiniJinjaEngine, TemplateEngine};
pub use error::{ComponentError, Result};
pub use markup::Markup;
pub use registry::Registry;
pub use scope::Scope;

/// Derives [`Component`] for a struct; see the `tessera-macros` crate.
pub use tessera_macros::Component;

//! The component model.
//!
//! A component is a plain struct that embeds a [`ComponentBase`] (its `id`,
//! optional companion script override, and extra HTML files) alongside any
//! number of template variables. Implementing [`Component`] binds the struct
//! to a template file; in practice the implementation comes from
//! `#[derive(Component)]`:
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use serde::Serialize;
//! use tessera::{Component, ComponentBase};
//!
//! #[derive(Serialize, Component)]
//! #[component(dir = "src/ui")]
//! struct Button {
//!     #[serde(flatten)]
//!     base: ComponentBase,
//!     text: String,
//! }
//!
//! #[derive(Serialize, Component)]
//! #[component(dir = "src/ui")]
//! struct Toolbar {
//!     #[serde(flatten)]
//!     base: ComponentBase,
//!     #[component(child)]
//!     buttons: Vec<Rc<Button>>,
//! }
//! ```
//!
//! # Nested Components
//!
//! Fields holding other components are rendered before their parent and
//! substituted into the parent's context as markup. Which field shapes can
//! hold components is decided by the [`Children`] trait, implemented for
//! `Rc<T>` handles and for `Vec`, `Option`, `HashMap` and `BTreeMap` of
//! anything that is itself [`Children`].

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::context::{Context, ContextValue};
use crate::error::{ComponentError, Result};
use crate::markup::Markup;
use crate::scope::Scope;

/// Fields shared by every component.
///
/// Flatten this into the component struct (`#[serde(flatten)]`) so that
/// `id`, `js` and `html` are available to the template like any other field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentBase {
    /// Unique id within a scope. Also the context key other templates use to
    /// embed this component's markup.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    /// Explicit companion script file name, overriding the derived name.
    #[serde(default)]
    pub js: Option<String>,

    /// Extra HTML files rendered with this component's context and exposed
    /// to its template under their path.
    #[serde(default)]
    pub html: Vec<String>,
}

impl ComponentBase {
    /// Creates a base with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Validation`] if the id is empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let base = Self {
            id: id.into(),
            js: None,
            html: Vec::new(),
        };
        base.validate()?;
        Ok(base)
    }

    /// Sets an explicit companion script file name.
    pub fn with_js(mut self, js: impl Into<String>) -> Self {
        self.js = Some(js.into());
        self
    }

    /// Adds an extra HTML file.
    pub fn with_html(mut self, path: impl Into<String>) -> Self {
        self.html.push(path.into());
        self
    }

    /// Checks the invariants a component must hold before registration.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(ComponentError::Validation("ID is required".to_string()));
        }
        Ok(())
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let id = String::deserialize(deserializer)?;
    if id.is_empty() {
        return Err(serde::de::Error::custom("ID is required"));
    }
    Ok(id)
}

/// A declarative UI unit bound to a template file.
///
/// Implementations are normally generated by `#[derive(Component)]`. A
/// manual implementation needs the base fields, a type name (which drives
/// the template and script file names), the directory holding the template,
/// and the serialized fields.
pub trait Component: 'static {
    /// The embedded id/js/html fields.
    fn base(&self) -> &ComponentBase;

    /// Name used to derive file names (`MyButton` -> `my_button.html`).
    fn type_name(&self) -> &'static str;

    /// Absolute directory containing the template and companion script.
    fn source_dir(&self) -> PathBuf;

    /// All declared fields serialized into plain context values.
    ///
    /// See [`fields_of`](crate::context::fields_of) for the usual implementation.
    fn fields(&self) -> Result<Context>;

    /// Renders nested child components into `context`.
    ///
    /// For every child field, each contained component's markup is stored
    /// under its id and the field's own slot is replaced by its rendered form.
    /// Components without child fields keep the default.
    fn render_children(&self, scope: &Scope, context: &mut Context) -> Result<()> {
        let _ = (scope, context);
        Ok(())
    }

    /// The component id.
    fn id(&self) -> &str {
        &self.base().id
    }

    /// Renders this component within `scope`.
    fn render(&self, scope: &Scope) -> Result<Markup>
    where
        Self: Sized,
    {
        scope.render(self)
    }
}

/// Field values that may hold nested components.
///
/// This is the capability the context builder dispatches on when a field is
/// marked `#[component(child)]`. Each implementation renders the components
/// it holds, records `id -> markup` for each into `rendered`, and returns
/// the value that replaces the field in the parent's context.
pub trait Children {
    /// Renders contained components and returns the field's rendered form.
    fn render_children(&self, scope: &Scope, rendered: &mut Context) -> Result<ContextValue>;
}

impl<T: Component> Children for Rc<T> {
    fn render_children(&self, scope: &Scope, rendered: &mut Context) -> Result<ContextValue> {
        let markup = scope.render(&**self)?;
        rendered.insert(self.id().to_string(), ContextValue::Markup(markup.clone()));
        Ok(ContextValue::Markup(markup))
    }
}

impl Children for Rc<dyn Component> {
    fn render_children(&self, scope: &Scope, rendered: &mut Context) -> Result<ContextValue> {
        let markup = scope.render(&**self)?;
        rendered.insert(self.id().to_string(), ContextValue::Markup(markup.clone()));
        Ok(ContextValue::Markup(markup))
    }
}

impl<C: Children> Children for Option<C> {
    fn render_children(&self, scope: &Scope, rendered: &mut Context) -> Result<ContextValue> {
        match self {
            Some(inner) => inner.render_children(scope, rendered),
            None => Ok(ContextValue::Data(serde_json::Value::Null)),
        }
    }
}

impl<C: Children> Children for Vec<C> {
    fn render_children(&self, scope: &Scope, rendered: &mut Context) -> Result<ContextValue> {
        let items = self
            .iter()
            .map(|item| item.render_children(scope, rendered))
            .collect::<Result<Vec<_>>>()?;
        Ok(ContextValue::List(items))
    }
}

impl<C: Children, S> Children for HashMap<String, C, S> {
    fn render_children(&self, scope: &Scope, rendered: &mut Context) -> Result<ContextValue> {
        let mut entries = BTreeMap::new();
        for (key, value) in self {
            entries.insert(key.clone(), value.render_children(scope, rendered)?);
        }
        Ok(ContextValue::Map(entries))
    }
}

impl<C: Children> Children for BTreeMap<String, C> {
    fn render_children(&self, scope: &Scope, rendered: &mut Context) -> Result<ContextValue> {
        let mut entries = BTreeMap::new();
        for (key, value) in self {
            entries.insert(key.clone(), value.render_children(scope, rendered)?);
        }
        Ok(ContextValue::Map(entries))
    }
}

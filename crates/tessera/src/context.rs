//! Template context values.
//!
//! A [`Context`] is the name-to-value mapping a component's template is
//! rendered against. It is assembled from three sources, later sources
//! overriding earlier ones:
//!
//! 1. The component's own fields (or an explicit override context)
//! 2. Rendered nested children, keyed by child id
//! 3. Components registered in the current [`Scope`](crate::Scope), keyed by id
//!
//! Extra HTML files listed on the component are then rendered against that
//! context and added under their path.
//!
//! Values are either plain data, already-rendered [`Markup`], or containers of
//! those. Keeping markup distinct from data lets the engine pass rendered HTML
//! through as a safe string while plain data goes through the engine's normal
//! formatting.

use std::collections::BTreeMap;
use std::fs;

use minijinja::Value;
use serde::Serialize;
use tracing::trace;

use crate::component::Component;
use crate::engine::TemplateEngine;
use crate::error::{ComponentError, Result};
use crate::markup::Markup;
use crate::resolver::html_path;
use crate::scope::Scope;

/// Name-to-value mapping handed to a template.
pub type Context = BTreeMap<String, ContextValue>;

/// A single value in a template [`Context`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    /// Plain serialized data (strings, numbers, nested objects).
    Data(serde_json::Value),

    /// Rendered component output, never escaped again.
    Markup(Markup),

    /// Rendered form of a list-valued child field.
    List(Vec<ContextValue>),

    /// Rendered form of a map-valued child field.
    Map(BTreeMap<String, ContextValue>),
}

impl ContextValue {
    /// Returns the markup if this value is rendered output.
    pub fn as_markup(&self) -> Option<&Markup> {
        match self {
            ContextValue::Markup(markup) => Some(markup),
            _ => None,
        }
    }

    /// Returns the plain data if this value is serialized data.
    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            ContextValue::Data(value) => Some(value),
            _ => None,
        }
    }

    /// Converts into a MiniJinja value; markup becomes a safe string.
    pub fn to_template_value(&self) -> Value {
        match self {
            ContextValue::Data(value) => Value::from_serialize(value),
            ContextValue::Markup(markup) => Value::from_safe_string(markup.as_str().to_string()),
            ContextValue::List(items) => {
                Value::from(items.iter().map(Self::to_template_value).collect::<Vec<_>>())
            }
            ContextValue::Map(entries) => Value::from_iter(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_template_value())),
            ),
        }
    }
}

impl From<Markup> for ContextValue {
    fn from(markup: Markup) -> Self {
        ContextValue::Markup(markup)
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(value: serde_json::Value) -> Self {
        ContextValue::Data(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Data(serde_json::Value::String(value.to_string()))
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Data(serde_json::Value::String(value))
    }
}

/// Serializes a component's declared fields into a base [`Context`].
///
/// The value must serialize to a map (a struct with named fields); each
/// top-level field becomes one entry holding plain data.
///
/// # Errors
///
/// Returns [`ComponentError::Serialization`] if serialization fails or the
/// value is not a map.
pub fn fields_of<T: Serialize + ?Sized>(value: &T) -> Result<Context> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, ContextValue::Data(value)))
            .collect()),
        other => Err(ComponentError::Serialization(format!(
            "component fields must serialize to a map, got {}",
            json_kind(&other)
        ))),
    }
}

/// Converts a context into the MiniJinja value a template renders against.
pub fn to_template_context(context: &Context) -> Value {
    Value::from_iter(
        context
            .iter()
            .map(|(key, value)| (key.clone(), value.to_template_value())),
    )
}

/// Assembles the context for one render of one component.
///
/// The steps are run by the render pipeline in order: [`base`](Self::base),
/// [`nested`](Self::nested) (skipped in override mode),
/// [`registered`](Self::registered), then [`extra_html`](Self::extra_html).
pub(crate) struct ContextBuilder<'a> {
    scope: &'a Scope,
    engine: &'a dyn TemplateEngine,
    component: &'a dyn Component,
}

impl<'a> ContextBuilder<'a> {
    pub(crate) fn new(
        scope: &'a Scope,
        engine: &'a dyn TemplateEngine,
        component: &'a dyn Component,
    ) -> Self {
        Self {
            scope,
            engine,
            component,
        }
    }

    /// Step 1: the override context if given, otherwise the component's fields.
    pub(crate) fn base(&self, override_context: Option<Context>) -> Result<Context> {
        match override_context {
            Some(context) => Ok(context),
            None => self.component.fields(),
        }
    }

    /// Step 2: replaces child fields with their rendered markup.
    pub(crate) fn nested(&self, context: &mut Context) -> Result<()> {
        self.component.render_children(self.scope, context)
    }

    /// Step 3: adds every registered component, keyed by id.
    ///
    /// Registered components overwrite same-named entries. Components
    /// already rendering further up the call chain are left out, so a
    /// template never embeds itself or an ancestor. Included and extended
    /// templates share this context, so every entry is merged.
    pub(crate) fn registered(&self, context: &mut Context) -> Result<()> {
        let components: Vec<_> = self
            .scope
            .registry()
            .entries()
            .values()
            .filter(|registered| !self.scope.is_rendering(&***registered))
            .cloned()
            .collect();

        for registered in components {
            trace!(
                id = self.component.id(),
                embedded = registered.id(),
                "merging registered component"
            );
            let markup = self.scope.render(&*registered)?;
            context.insert(registered.id().to_string(), ContextValue::Markup(markup));
        }
        Ok(())
    }

    /// Step 4: renders each extra HTML file with the context so far and
    /// stores it under its path.
    pub(crate) fn extra_html(&self, context: &mut Context) -> Result<()> {
        for path in &self.component.base().html {
            let full_path = html_path(path, self.engine);
            let source =
                fs::read_to_string(&full_path).map_err(|err| ComponentError::io(&full_path, err))?;
            trace!(id = self.component.id(), html = %path, "rendering extra html");
            let markup =
                self.scope
                    .render_with(self.component, Some(&source), Some(context.clone()))?;
            context.insert(path.clone(), ContextValue::Markup(markup));
        }
        Ok(())
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "a map",
    }
}

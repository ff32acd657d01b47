//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait, the seam between the
//! component pipeline and the template backend. The pipeline asks an engine
//! for its single filesystem root, loads templates by name beneath that root
//! or compiles inline source strings, and renders them against a [`Context`].
//! Templates may include or extend others through the engine's loader; they
//! all see the same context.
//!
//! The default implementation is [`MiniJinjaEngine`], which provides the full
//! Jinja dialect through MiniJinja.

use std::path::{Path, PathBuf};

use minijinja::{path_loader, AutoEscape, Environment};

use crate::context::{to_template_context, Context};
use crate::error::{ComponentError, Result};

/// A template ready to render.
///
/// Holds either the name of a template loaded through the engine's search
/// root, or the source of an inline template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    name: Option<String>,
    source: String,
}

impl CompiledTemplate {
    /// A template loaded by name from the search root.
    pub fn named(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            source: source.into(),
        }
    }

    /// A template compiled from an inline string.
    pub fn inline(source: impl Into<String>) -> Self {
        Self {
            name: None,
            source: source.into(),
        }
    }

    /// The template name, if it was loaded from the search root.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The template source text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A template engine components render through.
///
/// Engines are shared between scopes (typically behind an `Arc`), so they
/// must be `Send + Sync`.
pub trait TemplateEngine: Send + Sync {
    /// The single filesystem directory templates are resolved under.
    ///
    /// `None` means the engine cannot load templates by path.
    fn search_root(&self) -> Option<&Path>;

    /// Loads and compiles the template at `name`, relative to the search root.
    fn load(&self, name: &str) -> Result<CompiledTemplate>;

    /// Compiles an inline template source.
    fn compile_str(&self, source: &str) -> Result<CompiledTemplate>;

    /// Renders a compiled template against a context.
    fn render(&self, template: &CompiledTemplate, context: &Context) -> Result<String>;
}

/// MiniJinja-based template engine with a single-root filesystem loader.
///
/// Auto-escaping is disabled: rendered components are trusted markup and any
/// untrusted value must be sanitized before it is placed in a component
/// field. Use [`environment_mut`](Self::environment_mut) to change the escape
/// policy or register filters.
///
/// # Example
///
/// ```rust
/// use tessera::{Context, ContextValue, MiniJinjaEngine, TemplateEngine};
///
/// let engine = MiniJinjaEngine::new();
/// let template = engine.compile_str("Hello, {{ name }}!").unwrap();
///
/// let mut context = Context::new();
/// context.insert("name".into(), ContextValue::from("World"));
///
/// assert_eq!(engine.render(&template, &context).unwrap(), "Hello, World!");
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    search_root: Option<PathBuf>,
}

impl MiniJinjaEngine {
    /// Creates an engine without a search root.
    ///
    /// Such an engine can only render inline sources; resolving a component's
    /// template file fails with a configuration error.
    pub fn new() -> Self {
        Self {
            env: base_environment(),
            search_root: None,
        }
    }

    /// Creates an engine that loads templates from `root`.
    pub fn with_search_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut env = base_environment();
        env.set_loader(path_loader(&root));
        Self {
            env,
            search_root: Some(root),
        }
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// This allows registering custom filters and functions, or switching
    /// the auto-escape policy.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn base_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env
}

impl TemplateEngine for MiniJinjaEngine {
    fn search_root(&self) -> Option<&Path> {
        self.search_root.as_deref()
    }

    fn load(&self, name: &str) -> Result<CompiledTemplate> {
        if self.search_root.is_none() {
            return Err(ComponentError::Configuration(
                "MiniJinjaEngine has no search root; use MiniJinjaEngine::with_search_root".into(),
            ));
        }
        let template = self.env.get_template(name).map_err(|err| {
            if err.kind() == minijinja::ErrorKind::TemplateNotFound {
                ComponentError::Resolution {
                    name: name.to_string(),
                    message: err.to_string(),
                }
            } else {
                err.into()
            }
        })?;
        Ok(CompiledTemplate::named(name, template.source()))
    }

    fn compile_str(&self, source: &str) -> Result<CompiledTemplate> {
        // Compile once so syntax errors surface here rather than at render time.
        self.env.template_from_str(source)?;
        Ok(CompiledTemplate::inline(source))
    }

    fn render(&self, template: &CompiledTemplate, context: &Context) -> Result<String> {
        let ctx = to_template_context(context);
        let rendered = match template.name() {
            Some(name) => self.env.get_template(name)?.render(ctx)?,
            None => self.env.render_str(template.source(), ctx)?,
        };
        Ok(rendered)
    }
}

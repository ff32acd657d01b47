//! Request-scoped component container and the render pipeline.
//!
//! A [`Scope`] owns everything a single unit of work (typically one HTTP
//! request) needs to render components: the template engine binding and the
//! [`Registry`] of components created during that unit of work.
//!
//! # Lifecycle
//!
//! ```rust,ignore
//! let engine: Arc<dyn TemplateEngine> = Arc::new(MiniJinjaEngine::with_search_root("templates"));
//!
//! // Once per request
//! let scope = Scope::with_engine(engine.clone());
//! let button = scope.create(Button { base: ComponentBase::new("save")?, text: "Save".into() })?;
//! let html = button.render(&scope)?;
//! ```
//!
//! The engine is shared across scopes; registry state never is. `Scope` is
//! not `Send`, so each thread or task builds its own.
//!
//! # Render Pipeline
//!
//! [`Scope::render_with`] runs these steps in order, aborting on the first
//! error:
//!
//! 1. Pick the base context: the override if given, else the component fields
//! 2. Load the template from its resolved path, or compile the inline source
//! 3. Build the context: nested children (skipped in override mode), then
//!    every registered component, then extra HTML files
//! 4. Render the template
//! 5. Append the companion script
//! 6. Return the result as [`Markup`]
//!
//! Override mode disables automatic nesting: when an explicit context is
//! passed, child fields are not rendered, because that context is expected to
//! already hold whatever the template needs.
//!
//! Components are tracked by identity, not id, while they render. Within one
//! top-level render each component's markup is computed once and reused
//! wherever it is embedded again.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::component::Component;
use crate::context::{Context, ContextBuilder};
use crate::engine::TemplateEngine;
use crate::error::{ComponentError, Result};
use crate::markup::Markup;
use crate::registry::Registry;
use crate::resolver::template_name;
use crate::script::attach_script;

/// Engine binding and component registry for one unit of work.
#[derive(Default)]
pub struct Scope {
    engine: Option<Arc<dyn TemplateEngine>>,
    registry: RefCell<Registry>,
    /// Components currently rendering, outermost first.
    rendering: RefCell<Vec<*const ()>>,
    /// Markup finished during the current top-level render.
    rendered: RefCell<HashMap<*const (), Markup>>,
}

impl Scope {
    /// Creates a scope with no engine bound.
    ///
    /// Rendering fails with a configuration error until
    /// [`set_engine`](Self::set_engine) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope rendering through `engine`.
    pub fn with_engine(engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            engine: Some(engine),
            ..Self::default()
        }
    }

    /// Binds the template engine used by every render in this scope.
    pub fn set_engine(&mut self, engine: Arc<dyn TemplateEngine>) {
        self.engine = Some(engine);
    }

    /// The bound template engine.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Configuration`] if no engine is bound.
    pub fn engine(&self) -> Result<&dyn TemplateEngine> {
        self.engine.as_deref().ok_or_else(|| {
            ComponentError::Configuration(
                "no template engine bound to scope; call Scope::set_engine first".to_string(),
            )
        })
    }

    /// Validates a component and registers it in this scope.
    ///
    /// Returns a shared handle suitable for embedding in parent components.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Validation`] if the component id is empty.
    pub fn create<T: Component>(&self, component: T) -> Result<Rc<T>> {
        component.base().validate()?;
        let component = Rc::new(component);
        self.register(component.clone());
        Ok(component)
    }

    /// Registers an existing component handle, replacing any same-id entry.
    pub fn register(&self, component: Rc<dyn Component>) {
        self.registry.borrow_mut().register(component);
    }

    /// Read access to the registry.
    pub fn registry(&self) -> Ref<'_, Registry> {
        self.registry.borrow()
    }

    /// Looks up a registered component by id.
    pub fn get(&self, id: &str) -> Option<Rc<dyn Component>> {
        self.registry.borrow().get(id)
    }

    /// Returns true if `component` is rendering further up the current call
    /// chain. Other components sharing its id do not count.
    pub fn is_rendering(&self, component: &dyn Component) -> bool {
        let key = identity(component);
        self.rendering.borrow().iter().any(|active| *active == key)
    }

    /// Removes every registered component.
    ///
    /// Call at the end of a unit of work when the scope itself is reused.
    pub fn clear(&self) {
        self.registry.borrow_mut().clear();
    }

    /// Renders a component from its template file.
    pub fn render(&self, component: &dyn Component) -> Result<Markup> {
        self.render_with(component, None, None)
    }

    /// Renders a component, optionally overriding the template source and
    /// the base context.
    ///
    /// With `source`, the string is compiled as the template instead of the
    /// component's file; the `html` list is not processed and no companion
    /// script is appended. With `context`, that mapping replaces the
    /// component's fields and child fields are not rendered.
    pub fn render_with(
        &self,
        component: &dyn Component,
        source: Option<&str>,
        context: Option<Context>,
    ) -> Result<Markup> {
        let engine = self.engine()?;
        let inline = source.is_some();
        let override_mode = context.is_some();
        let reusable = !inline && !override_mode;

        if reusable {
            let cached = self.rendered.borrow().get(&identity(component)).cloned();
            if let Some(markup) = cached {
                trace!(id = component.id(), "reusing rendered markup");
                return Ok(markup);
            }
        }

        // Extra HTML renders run inside their component's own render.
        let _guard = if inline && self.is_rendering(component) {
            None
        } else {
            Some(RenderGuard::enter(self, component)?)
        };

        debug!(
            id = component.id(),
            component = component.type_name(),
            inline,
            override_mode,
            "rendering component"
        );

        let builder = ContextBuilder::new(self, engine, component);

        // 1. Base context
        let mut ctx = builder.base(context)?;

        // 2. Template
        let template = match source {
            Some(source) => engine.compile_str(source)?,
            None => engine.load(&template_name(component, engine)?)?,
        };

        // 3. Nested children, registered components, extra HTML
        if !override_mode {
            builder.nested(&mut ctx)?;
        }
        builder.registered(&mut ctx)?;
        if !inline {
            builder.extra_html(&mut ctx)?;
        }

        // 4. Render
        let markup = Markup::from(engine.render(&template, &ctx)?);

        // 5. Companion script
        if inline {
            return Ok(markup);
        }
        let markup = attach_script(component, markup)?;
        if reusable {
            self.rendered
                .borrow_mut()
                .insert(identity(component), markup.clone());
        }
        Ok(markup)
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("engine", &self.engine.is_some())
            .field("registry", &*self.registry.borrow())
            .finish()
    }
}

fn identity(component: &dyn Component) -> *const () {
    component as *const dyn Component as *const ()
}

/// Marks a component as rendering for the lifetime of the guard.
///
/// Dropping the outermost guard forgets the markup reused during that render.
struct RenderGuard<'a> {
    scope: &'a Scope,
}

impl<'a> RenderGuard<'a> {
    fn enter(scope: &'a Scope, component: &dyn Component) -> Result<Self> {
        let key = identity(component);
        let mut rendering = scope.rendering.borrow_mut();
        if rendering.contains(&key) {
            return Err(ComponentError::Cycle {
                id: component.id().to_string(),
            });
        }
        rendering.push(key);
        Ok(Self { scope })
    }
}

impl Drop for RenderGuard<'_> {
    fn drop(&mut self) {
        let mut rendering = self.scope.rendering.borrow_mut();
        rendering.pop();
        if rendering.is_empty() {
            self.scope.rendered.borrow_mut().clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Children, ComponentBase};
    use crate::context::{fields_of, ContextValue};
    use crate::engine::MiniJinjaEngine;
    use serde::Serialize;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Badge {
        #[serde(flatten)]
        base: ComponentBase,
        label: String,
        #[serde(skip)]
        dir: PathBuf,
    }

    impl Component for Badge {
        fn base(&self) -> &ComponentBase {
            &self.base
        }

        fn type_name(&self) -> &'static str {
            "Badge"
        }

        fn source_dir(&self) -> PathBuf {
            self.dir.clone()
        }

        fn fields(&self) -> Result<Context> {
            fields_of(self)
        }
    }

    #[derive(Serialize)]
    struct Panel {
        #[serde(flatten)]
        base: ComponentBase,
        badge: Rc<Badge>,
        #[serde(skip)]
        dir: PathBuf,
    }

    impl Component for Panel {
        fn base(&self) -> &ComponentBase {
            &self.base
        }

        fn type_name(&self) -> &'static str {
            "Panel"
        }

        fn source_dir(&self) -> PathBuf {
            self.dir.clone()
        }

        fn fields(&self) -> Result<Context> {
            fields_of(self)
        }

        fn render_children(&self, scope: &Scope, context: &mut Context) -> Result<()> {
            let slot = Children::render_children(&self.badge, scope, context)?;
            context.insert("badge".to_string(), slot);
            Ok(())
        }
    }

    fn setup(files: &[(&str, &str)]) -> (TempDir, Scope) {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        let engine = Arc::new(MiniJinjaEngine::with_search_root(dir.path()));
        (dir, Scope::with_engine(engine))
    }

    fn badge(scope: &Scope, dir: &Path, id: &str, label: &str) -> Rc<Badge> {
        scope
            .create(Badge {
                base: ComponentBase::new(id).unwrap(),
                label: label.to_string(),
                dir: dir.to_path_buf(),
            })
            .unwrap()
    }

    #[test]
    fn render_without_engine_is_configuration_error() {
        let scope = Scope::new();
        let badge = badge(&scope, Path::new("/tmp"), "b", "x");
        let err = scope.render(&*badge).unwrap_err();
        assert!(matches!(err, ComponentError::Configuration(_)));
    }

    #[test]
    fn create_rejects_empty_id() {
        let scope = Scope::new();
        let result = scope.create(Badge {
            base: ComponentBase {
                id: String::new(),
                js: None,
                html: Vec::new(),
            },
            label: "x".into(),
            dir: PathBuf::new(),
        });
        assert!(matches!(result, Err(ComponentError::Validation(_))));
        assert!(scope.registry().is_empty());
    }

    #[test]
    fn create_registers() {
        let (dir, scope) = setup(&[]);
        let created = badge(&scope, dir.path(), "new", "New");
        let registered = scope.get("new").unwrap();
        assert_eq!(registered.id(), created.id());
    }

    #[test]
    fn render_plain_component() {
        let (dir, scope) = setup(&[("badge.html", "<span>{{ label }}</span>")]);
        let b = badge(&scope, dir.path(), "b1", "New");
        assert_eq!(b.render(&scope).unwrap(), "<span>New</span>");
    }

    #[test]
    fn nested_child_rendered_into_slot_and_id() {
        let (dir, scope) = setup(&[
            ("badge.html", "<span>{{ label }}</span>"),
            ("panel.html", "<div>{{ badge }}|{{ b1 }}</div>"),
        ]);
        let child = badge(&scope, dir.path(), "b1", "New");
        let panel = scope
            .create(Panel {
                base: ComponentBase::new("p").unwrap(),
                badge: child,
                dir: dir.path().to_path_buf(),
            })
            .unwrap();

        assert_eq!(
            panel.render(&scope).unwrap(),
            "<div><span>New</span>|<span>New</span></div>"
        );
    }

    #[test]
    fn override_context_skips_nesting() {
        let (dir, scope) = setup(&[
            ("badge.html", "<span>{{ label }}</span>"),
            ("panel.html", "<div>{{ badge }}</div>"),
        ]);
        let child = badge(&scope, dir.path(), "b1", "New");
        let panel = scope
            .create(Panel {
                base: ComponentBase::new("p").unwrap(),
                badge: child,
                dir: dir.path().to_path_buf(),
            })
            .unwrap();

        let mut context = Context::new();
        context.insert("badge".into(), ContextValue::from("plain"));
        let out = scope.render_with(&*panel, None, Some(context)).unwrap();
        assert_eq!(out, "<div>plain</div>");
    }

    #[test]
    fn registered_component_by_id() {
        let (dir, scope) = setup(&[
            ("badge.html", "{% if label == 'Top' %}<nav>{{ sidebar }}</nav>{% else %}<i>{{ label }}</i>{% endif %}"),
        ]);
        badge(&scope, dir.path(), "sidebar", "Side");
        let top = badge(&scope, dir.path(), "top", "Top");
        assert_eq!(top.render(&scope).unwrap(), "<nav><i>Side</i></nav>");
    }

    #[test]
    fn registry_overrides_field_of_same_name() {
        let (dir, scope) = setup(&[("badge.html", "{{ label }}")]);
        let b = badge(&scope, dir.path(), "b", "mine");
        badge(&scope, dir.path(), "label", "from-registry");
        // `label` resolves to the registered component, which renders its own
        // label field.
        assert_eq!(b.render(&scope).unwrap(), "from-registry");
    }

    #[test]
    fn registered_self_reference_is_skipped() {
        let (dir, scope) = setup(&[("badge.html", "[{{ loop_me }}]")]);
        let b = badge(&scope, dir.path(), "loop_me", "x");
        assert_eq!(b.render(&scope).unwrap(), "[]");
        assert!(!scope.is_rendering(&*b));
    }

    struct Echo {
        base: ComponentBase,
        dir: PathBuf,
    }

    impl Component for Echo {
        fn base(&self) -> &ComponentBase {
            &self.base
        }

        fn type_name(&self) -> &'static str {
            "Echo"
        }

        fn source_dir(&self) -> PathBuf {
            self.dir.clone()
        }

        fn fields(&self) -> Result<Context> {
            Ok(Context::new())
        }

        fn render_children(&self, scope: &Scope, _context: &mut Context) -> Result<()> {
            scope.render(self).map(|_| ())
        }
    }

    #[test]
    fn direct_recursion_is_a_cycle() {
        let (dir, scope) = setup(&[("echo.html", "echo")]);
        let echo = scope
            .create(Echo {
                base: ComponentBase::new("echo").unwrap(),
                dir: dir.path().to_path_buf(),
            })
            .unwrap();

        match echo.render(&scope) {
            Err(ComponentError::Cycle { id }) => assert_eq!(id, "echo"),
            other => panic!("expected cycle, got {:?}", other),
        }
        assert!(!scope.is_rendering(&*echo));
    }

    #[test]
    fn same_id_parent_and_child_both_render() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let (dir, scope) = setup(&[
            ("badge.html", "<span>{{ label }}</span>"),
            ("panel.html", "<div>{{ badge }}|{{ x }}</div>"),
        ]);
        let child = Rc::new(Badge {
            base: ComponentBase::new("x").unwrap(),
            label: "Hi".into(),
            dir: dir.path().to_path_buf(),
        });
        let panel = scope
            .create(Panel {
                base: ComponentBase::new("x").unwrap(),
                badge: child.clone(),
                dir: dir.path().to_path_buf(),
            })
            .unwrap();

        // The parent owns the id: its own registry entry is skipped and the
        // child's markup stays under `x`.
        assert_eq!(
            panel.render(&scope).unwrap(),
            "<div><span>Hi</span>|<span>Hi</span></div>"
        );

        // A later registration under the same id is merged even while the
        // parent with that id renders.
        scope.register(Rc::new(Badge {
            base: ComponentBase::new("x").unwrap(),
            label: "Other".into(),
            dir: dir.path().to_path_buf(),
        }));
        assert_eq!(
            panel.render(&scope).unwrap(),
            "<div><span>Hi</span>|<span>Other</span></div>"
        );
    }

    #[test]
    fn registered_component_reaches_extended_layout() {
        let (dir, scope) = setup(&[
            ("badge.html", "<i>{{ label }}</i>"),
            ("layout.html", "<body>{{ top_banner }}{% block main %}{% endblock %}</body>"),
            (
                "panel.html",
                "{% extends 'layout.html' %}{% block main %}{{ badge }}{% endblock %}",
            ),
        ]);
        badge(&scope, dir.path(), "top_banner", "Hi");
        let child = badge(&scope, dir.path(), "b1", "x");
        let panel = scope
            .create(Panel {
                base: ComponentBase::new("p").unwrap(),
                badge: child,
                dir: dir.path().to_path_buf(),
            })
            .unwrap();

        assert_eq!(
            panel.render(&scope).unwrap(),
            "<body><i>Hi</i><i>x</i></body>"
        );
    }

    #[test]
    fn markup_is_forgotten_after_top_level_render() {
        let (dir, scope) = setup(&[("badge.html", "{{ label }}:{{ other }}")]);
        let first = badge(&scope, dir.path(), "first", "one");
        let other = badge(&scope, dir.path(), "other", "two");

        assert_eq!(first.render(&scope).unwrap(), "one:two:");
        scope.clear();
        assert_eq!(first.render(&scope).unwrap(), "one:");
        assert_eq!(other.render(&scope).unwrap(), "two:");
        assert!(scope.rendered.borrow().is_empty());
    }

    #[test]
    fn inline_source_skips_script() {
        let (dir, scope) = setup(&[("badge.js", "alert(1);")]);
        let b = badge(&scope, dir.path(), "b", "Inline");
        let out = scope.render_with(&*b, Some("<b>{{ label }}</b>"), None).unwrap();
        assert_eq!(out, "<b>Inline</b>");
    }

    #[test]
    fn debug_output() {
        let scope = Scope::new();
        assert_eq!(
            format!("{:?}", scope),
            "Scope { engine: false, registry: Registry { components: [] } }"
        );
    }
}

//! Template path resolution.
//!
//! A component's template lives beside its declaration: the template name is
//! the component's directory relative to the engine's search root, joined
//! with the snake-cased type name.
//!
//! ```text
//! search root:      /app/templates
//! component dir:    /app/templates/ui/forms
//! type name:        SubmitButton
//! template name:    ui/forms/submit_button.html
//! ```

use std::path::{Component as PathComponent, Path, PathBuf};

use tracing::debug;

use crate::component::Component;
use crate::engine::TemplateEngine;
use crate::error::{ComponentError, Result};
use crate::naming::{script_file_name, template_file_name};

/// Computes the template name for `component` under the engine's search root.
///
/// # Errors
///
/// - [`ComponentError::Configuration`] if the engine has no search root.
/// - [`ComponentError::Resolution`] if the component directory is not inside
///   the search root.
pub fn template_name(component: &dyn Component, engine: &dyn TemplateEngine) -> Result<String> {
    let root = engine.search_root().ok_or_else(|| {
        ComponentError::Configuration(
            "template engine has no filesystem search root to resolve component templates against"
                .to_string(),
        )
    })?;

    let file_name = template_file_name(component.type_name());
    let source_dir = component.source_dir();
    let relative = relative_dir(&source_dir, root).ok_or_else(|| ComponentError::Resolution {
        name: file_name.clone(),
        message: format!(
            "component directory {} is not inside the template search root {}",
            source_dir.display(),
            root.display()
        ),
    })?;

    let name = if relative.is_empty() {
        file_name
    } else {
        format!("{}/{}", relative, file_name)
    };
    debug!(component = component.type_name(), id = component.id(), template = %name, "resolved template");
    Ok(name)
}

/// Full path of the companion script the component would use.
///
/// The file may not exist; callers decide whether absence matters.
pub fn script_path(component: &dyn Component) -> PathBuf {
    let file_name = script_file_name(component.type_name(), component.base().js.as_deref());
    component.source_dir().join(file_name)
}

/// Resolves an extra HTML path listed on a component.
///
/// Absolute paths are used as given; relative paths are taken from the
/// engine's search root when it has one.
pub fn html_path(path: &str, engine: &dyn TemplateEngine) -> PathBuf {
    let path = Path::new(path);
    match engine.search_root() {
        Some(root) if path.is_relative() => root.join(path),
        _ => path.to_path_buf(),
    }
}

/// `dir` relative to `root` as a `/`-separated string, or `None` if `dir`
/// is outside `root`.
fn relative_dir(dir: &Path, root: &Path) -> Option<String> {
    let dir = normalize(dir);
    let root = normalize(root);
    let rest = dir.strip_prefix(&root).ok()?;

    let segments: Vec<String> = rest
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(segments.join("/"))
}

/// Lexically removes `.` and `..` segments.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            PathComponent::CurDir => {}
            PathComponent::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentBase;
    use crate::context::{fields_of, Context};
    use crate::engine::MiniJinjaEngine;
    use serde::Serialize;

    #[derive(Serialize)]
    struct SubmitButton {
        #[serde(flatten)]
        base: ComponentBase,
        #[serde(skip)]
        dir: PathBuf,
    }

    impl Component for SubmitButton {
        fn base(&self) -> &ComponentBase {
            &self.base
        }

        fn type_name(&self) -> &'static str {
            "SubmitButton"
        }

        fn source_dir(&self) -> PathBuf {
            self.dir.clone()
        }

        fn fields(&self) -> Result<Context> {
            fields_of(self)
        }
    }

    fn button(dir: impl Into<PathBuf>, js: Option<&str>) -> SubmitButton {
        let mut base = ComponentBase::new("submit").unwrap();
        base.js = js.map(str::to_string);
        SubmitButton {
            base,
            dir: dir.into(),
        }
    }

    #[test]
    fn test_template_name_nested_dir() {
        let engine = MiniJinjaEngine::with_search_root("/app/templates");
        let component = button("/app/templates/ui/forms", None);
        assert_eq!(
            template_name(&component, &engine).unwrap(),
            "ui/forms/submit_button.html"
        );
    }

    #[test]
    fn test_template_name_at_root() {
        let engine = MiniJinjaEngine::with_search_root("/app/templates");
        let component = button("/app/templates", None);
        assert_eq!(template_name(&component, &engine).unwrap(), "submit_button.html");
    }

    #[test]
    fn test_template_name_normalizes_dots() {
        let engine = MiniJinjaEngine::with_search_root("/app/./templates");
        let component = button("/app/templates/ui/../widgets", None);
        assert_eq!(
            template_name(&component, &engine).unwrap(),
            "widgets/submit_button.html"
        );
    }

    #[test]
    fn test_template_name_without_root() {
        let engine = MiniJinjaEngine::new();
        let component = button("/app/templates", None);
        assert!(matches!(
            template_name(&component, &engine),
            Err(ComponentError::Configuration(_))
        ));
    }

    #[test]
    fn test_template_name_outside_root() {
        let engine = MiniJinjaEngine::with_search_root("/app/templates");
        let component = button("/elsewhere/ui", None);
        assert!(matches!(
            template_name(&component, &engine),
            Err(ComponentError::Resolution { .. })
        ));
    }

    #[test]
    fn test_script_path_default_and_override() {
        let component = button("/app/ui", None);
        assert_eq!(script_path(&component), PathBuf::from("/app/ui/submit-button.js"));

        let component = button("/app/ui", Some("form_helpers.js"));
        assert_eq!(script_path(&component), PathBuf::from("/app/ui/form-helpers.js"));
    }

    #[test]
    fn test_html_path() {
        let engine = MiniJinjaEngine::with_search_root("/app/templates");
        assert_eq!(
            html_path("partials/footer.html", &engine),
            PathBuf::from("/app/templates/partials/footer.html")
        );
        assert_eq!(
            html_path("/srv/footer.html", &engine),
            PathBuf::from("/srv/footer.html")
        );
        assert_eq!(
            html_path("footer.html", &MiniJinjaEngine::new()),
            PathBuf::from("footer.html")
        );
    }
}

//! Companion script inlining.
//!
//! A component may ship a script file next to its template. When present, its
//! contents are appended verbatim to the rendered HTML inside a `<script>` tag.

use std::fs;
use std::io::ErrorKind;

use tracing::debug;

use crate::component::Component;
use crate::error::{ComponentError, Result};
use crate::markup::Markup;
use crate::resolver::script_path;

/// Reads the component's companion script, if it exists.
///
/// A missing file yields `Ok(None)`. Any other read failure is an error.
pub fn companion_script(component: &dyn Component) -> Result<Option<String>> {
    let path = script_path(component);
    match fs::read_to_string(&path) {
        Ok(contents) => {
            debug!(id = component.id(), script = %path.display(), "found companion script");
            Ok(Some(contents))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(ComponentError::io(path, err)),
    }
}

/// Appends the companion script, if any, to rendered markup.
pub fn attach_script(component: &dyn Component, mut markup: Markup) -> Result<Markup> {
    if let Some(script) = companion_script(component)? {
        markup.push_str("<script>");
        markup.push_str(&script);
        markup.push_str("</script>");
    }
    Ok(markup)
}

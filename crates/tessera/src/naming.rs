//! File-name conventions derived from component type names.
//!
//! A component type `MyButton` maps to:
//!
//! | Artifact | Name |
//! |----------|------|
//! | Template | `my_button.html` |
//! | Companion script | `my-button.js` |

/// Extension of component template files.
pub const TEMPLATE_EXTENSION: &str = ".html";

/// Extension appended to derived companion script names.
pub const SCRIPT_EXTENSION: &str = ".js";

/// Converts a type name to snake case.
///
/// An underscore is inserted before every uppercase letter that is not the
/// first character, then the whole string is lowercased. Runs of capitals are
/// split letter by letter (`HTMLButton` becomes `h_t_m_l_button`).
pub fn snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);

    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            result.push('_');
        }
        result.extend(c.to_lowercase());
    }

    result
}

/// Template file name for a component type: `<snake_case>.html`.
pub fn template_file_name(type_name: &str) -> String {
    format!("{}{}", snake_case(type_name), TEMPLATE_EXTENSION)
}

/// Companion script file name for a component.
///
/// An explicit `js` override is used as given, with underscores turned into
/// hyphens and no extension appended. Otherwise the name is derived from the
/// snake-cased type name with hyphens and a `.js` extension.
pub fn script_file_name(type_name: &str, js_override: Option<&str>) -> String {
    match js_override {
        Some(explicit) => explicit.replace('_', "-"),
        None => format!("{}{}", snake_case(type_name).replace('_', "-"), SCRIPT_EXTENSION),
    }
}

//! Rendered, HTML-safe output.

use std::fmt;

use serde::{Serialize, Serializer};

/// A string of rendered HTML that is never escaped again.
///
/// `Markup` is the terminal artifact of rendering a component. When it is
/// placed into another component's context it is handed to the template
/// engine as a safe string, so nested output survives any auto-escaping
/// policy unchanged.
///
/// Constructing `Markup` from arbitrary text is a trust decision: untrusted
/// data must be sanitized before it gets here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Markup(String);

impl Markup {
    /// Wraps already-rendered HTML.
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Returns the markup as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the markup, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Appends raw HTML to the end of the markup.
    pub(crate) fn push_str(&mut self, html: &str) {
        self.0.push_str(html);
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Markup {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Markup {
    fn from(html: String) -> Self {
        Self(html)
    }
}

impl From<Markup> for String {
    fn from(markup: Markup) -> Self {
        markup.0
    }
}

impl PartialEq<str> for Markup {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Markup {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for Markup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_verbatim() {
        let markup = Markup::new("<b>&amp;</b>");
        assert_eq!(markup.to_string(), "<b>&amp;</b>");
        assert_eq!(markup, "<b>&amp;</b>");
    }

    #[test]
    fn push_str_appends() {
        let mut markup = Markup::new("<p>hi</p>");
        markup.push_str("<script>x()</script>");
        assert_eq!(markup.as_str(), "<p>hi</p><script>x()</script>");
    }

    #[test]
    fn serializes_as_plain_string() {
        let value = serde_json::to_value(Markup::new("<i>x</i>")).unwrap();
        assert_eq!(value, serde_json::json!("<i>x</i>"));
    }
}

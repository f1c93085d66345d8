//! Message templates: literal text interleaved with values.

use inspectlog_core::{IntoValue, Value};

/// One piece of a template.
#[derive(Debug, Clone)]
pub enum Part {
    Text(String),
    Value(Value),
}

/// Literal text interleaved with values to describe.
///
/// Build one with [`template!`](crate::template), with [`Template::parse`], or
/// piece by piece:
///
/// ```
/// use inspectlog_console::Template;
///
/// let t = Template::new().text("user ").value(42).text(" joined");
/// assert_eq!(t.parts().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `literal` on `{}` and fills each placeholder with the next
    /// value.
    ///
    /// Values without a placeholder are appended, each after a space.
    /// Placeholders without a value stay in the text as `{}`.
    #[must_use]
    pub fn parse(literal: &str, values: Vec<Value>) -> Self {
        let mut pieces = literal.split("{}");
        let mut values = values.into_iter();
        let mut template = Self::new().text(pieces.next().unwrap_or_default());

        for piece in pieces {
            match values.next() {
                Some(value) => template = template.value(value).text(piece),
                None => template.append_literal(&format!("{{}}{piece}")),
            }
        }
        for value in values {
            template.append_literal(" ");
            template = template.value(value).text("");
        }
        template
    }

    /// Append literal text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text(text.into()));
        self
    }

    /// Append a value to describe.
    #[must_use]
    pub fn value(mut self, value: impl IntoValue) -> Self {
        self.parts.push(Part::Value(value.into_value()));
        self
    }

    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    #[must_use]
    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }

    fn append_literal(&mut self, text: &str) {
        match self.parts.last_mut() {
            Some(Part::Text(last)) => last.push_str(text),
            _ => self.parts.push(Part::Text(text.to_string())),
        }
    }
}

impl From<&str> for Template {
    fn from(text: &str) -> Self {
        Self::new().text(text)
    }
}

impl From<String> for Template {
    fn from(text: String) -> Self {
        Self::new().text(text)
    }
}

/// Builds a [`Template`] from a literal with `{}` placeholders.
///
/// Each argument is converted with [`IntoValue`].
///
/// ```
/// use inspectlog_console::template;
///
/// let t = template!("loaded {} items from {}", 3, "cache");
/// assert_eq!(t.parts().len(), 5);
/// ```
#[macro_export]
macro_rules! template {
    ($literal:literal $(, $value:expr)* $(,)?) => {
        $crate::Template::parse(
            $literal,
            ::std::vec![$($crate::IntoValue::into_value($value)),*],
        )
    };
}

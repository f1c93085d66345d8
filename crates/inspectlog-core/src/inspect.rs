//! One-call describe and format.

use crate::color::{AnsiColor, Colorize, HtmlColor, PlainColor};
use crate::describe::{DescribeOptions, describe_with};
use crate::formatter::{ColorMap, FormatOptions, format};
use crate::value::Value;

/// Output styling for [`inspect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// No styling.
    #[default]
    Plain,
    /// ANSI terminal escapes.
    Ansi,
    /// HTML spans for a light background.
    HtmlLight,
    /// HTML spans for a dark background.
    HtmlDark,
}

impl ColorMode {
    fn backend(self) -> Box<dyn Colorize> {
        match self {
            Self::Plain => Box::new(PlainColor),
            Self::Ansi => Box::new(AnsiColor),
            Self::HtmlLight => Box::new(HtmlColor::light()),
            Self::HtmlDark => Box::new(HtmlColor::dark()),
        }
    }
}

/// Options for [`inspect`].
#[derive(Debug, Clone)]
pub struct InspectOptions {
    /// Output styling.
    pub colors: ColorMode,
    /// Width below which collections pack onto one line.
    pub line_limit: usize,
    /// Truncation thresholds.
    pub describe: DescribeOptions,
    /// Colors per token class.
    pub color_map: ColorMap,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            colors: ColorMode::Plain,
            line_limit: 50,
            describe: DescribeOptions::default(),
            color_map: ColorMap::default(),
        }
    }
}

impl InspectOptions {
    /// Plain output with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output styling.
    #[must_use]
    pub fn with_colors(mut self, colors: ColorMode) -> Self {
        self.colors = colors;
        self
    }

    /// Set the packing width.
    #[must_use]
    pub fn with_line_limit(mut self, line_limit: usize) -> Self {
        self.line_limit = line_limit;
        self
    }

    /// Set the truncation thresholds.
    #[must_use]
    pub fn with_describe(mut self, describe: DescribeOptions) -> Self {
        self.describe = describe;
        self
    }
}

/// Describes `value` and renders the description as text.
#[must_use]
pub fn inspect(value: &Value, options: &InspectOptions) -> String {
    let description = describe_with(value, &options.describe);
    let backend = options.colors.backend();
    let format_options = FormatOptions::new(backend.as_ref())
        .with_line_limit(options.line_limit)
        .with_color_map(options.color_map.clone());
    format(&description, &format_options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::IntoValue;

    #[test]
    fn plain_by_default() {
        let value = vec![1, 2, 3].into_value();
        assert_eq!(inspect(&value, &InspectOptions::default()), "[ 1, 2, 3 ]");
    }

    #[test]
    fn ansi_mode_emits_escapes() {
        let out = inspect(
            &"hi".into_value(),
            &InspectOptions::new().with_colors(ColorMode::Ansi),
        );
        assert_eq!(out, "\u{1b}[92m\"hi\"\u{1b}[0m");
    }

    #[test]
    fn html_mode_emits_spans() {
        let out = inspect(
            &true.into_value(),
            &InspectOptions::new().with_colors(ColorMode::HtmlDark),
        );
        assert_eq!(out, r#"<span style="color: #e5e510">true</span>"#);
    }

    #[test]
    fn line_limit_controls_wrapping() {
        let value = vec![10, 20, 30].into_value();
        let wrapped = inspect(&value, &InspectOptions::new().with_line_limit(4));
        assert_eq!(wrapped, "[\n  10\n  20\n  30\n]");
    }
}

//! Color backends.
//!
//! The formatter never emits escape codes itself; it hands every token to a
//! [`Colorize`] implementation chosen by the sink. Closures implement the
//! trait too, so a sink can supply any `Fn(&str, &ColorSpec) -> String`.

use crate::description::{ColorName, ColorSpec};

/// Paints a run of text in a color.
pub trait Colorize {
    /// Returns `text` wrapped in whatever styling `color` maps to.
    fn paint(&self, text: &str, color: &ColorSpec) -> String;
}

impl<F> Colorize for F
where
    F: Fn(&str, &ColorSpec) -> String,
{
    fn paint(&self, text: &str, color: &ColorSpec) -> String {
        self(text, color)
    }
}

/// Hex codes of the dark terminal palette, keyed by color name.
pub const DEFAULT_COLOR_CODES: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("blue", "#2472c8"),
    ("brightBlack", "#666666"),
    ("brightBlue", "#3b8eea"),
    ("brightCyan", "#29b8db"),
    ("brightGreen", "#23d18b"),
    ("brightMagenta", "#d670d6"),
    ("brightRed", "#f14c4c"),
    ("brightWhite", "#ffffff"),
    ("brightYellow", "#f5f543"),
    ("cyan", "#11a8cd"),
    ("green", "#0dbc79"),
    ("magenta", "#bc3fbc"),
    ("red", "#cd3131"),
    ("white", "#e5e5e5"),
    ("yellow", "#e5e510"),
    ("grey", "#aaaaaa"),
    ("gray", "#aaaaaa"),
];

/// Hex codes tuned for light backgrounds.
pub const LIGHT_COLOR_CODES: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("blue", "#1568c4"),
    ("brightBlack", "#000000"),
    ("brightBlue", "#1568c4"),
    ("brightCyan", "#24b2d6"),
    ("brightGreen", "#1f8236"),
    ("brightMagenta", "#8f288f"),
    ("brightRed", "#b30e0e"),
    ("brightWhite", "#000000"),
    ("brightYellow", "#cf4600"),
    ("cyan", "#24b2d6"),
    ("green", "#1f8236"),
    ("magenta", "#8f288f"),
    ("red", "#b30e0e"),
    ("white", "#191919"),
    ("yellow", "#cf4600"),
    ("grey", "#555555"),
    ("gray", "#555555"),
];

/// Looks up a color name in a code table.
#[must_use]
pub fn lookup_code(table: &'static [(&'static str, &'static str)], name: &str) -> Option<&'static str> {
    table.iter().find(|(n, _)| *n == name).map(|(_, code)| *code)
}

/// SGR parameter used for a palette entry.
#[must_use]
pub fn ansi_code(name: ColorName) -> &'static str {
    match name {
        ColorName::Black => "30",
        ColorName::Blue => "94",
        ColorName::Bold => "1",
        ColorName::Cyan => "96",
        ColorName::Gray => "90",
        ColorName::Green => "92",
        ColorName::Magenta => "95",
        ColorName::Red => "91",
        ColorName::White => "0",
        ColorName::Yellow => "93",
    }
}

/// ANSI escape sequences for terminals.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiColor;

impl Colorize for AnsiColor {
    fn paint(&self, text: &str, color: &ColorSpec) -> String {
        match color {
            ColorSpec::Named(name) => format!("\u{1b}[{}m{text}\u{1b}[0m", ansi_code(*name)),
            ColorSpec::Custom {
                ansi_code: Some(code),
                ..
            } => format!("\u{1b}[{code}m{text}\u{1b}[0m"),
            ColorSpec::Custom { ansi_code: None, .. } => text.to_string(),
        }
    }
}

/// HTML `<span>` wrapping with inline styles.
#[derive(Debug, Clone, Copy)]
pub struct HtmlColor {
    palette: &'static [(&'static str, &'static str)],
}

impl Default for HtmlColor {
    fn default() -> Self {
        Self::light()
    }
}

impl HtmlColor {
    /// Colors for a light background.
    #[must_use]
    pub fn light() -> Self {
        Self {
            palette: LIGHT_COLOR_CODES,
        }
    }

    /// Colors for a dark background.
    #[must_use]
    pub fn dark() -> Self {
        Self {
            palette: DEFAULT_COLOR_CODES,
        }
    }
}

impl Colorize for HtmlColor {
    fn paint(&self, text: &str, color: &ColorSpec) -> String {
        let style = match color {
            ColorSpec::Named(ColorName::Bold) => "font-weight: bold".to_string(),
            ColorSpec::Named(name) => format!(
                "color: {}",
                lookup_code(self.palette, name.as_str()).unwrap_or("inherit")
            ),
            ColorSpec::Custom { code, .. } => format!("color: {code}"),
        };
        format!(r#"<span style="{style}">{}</span>"#, escape_html(text))
    }
}

/// Leaves text unstyled.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainColor;

impl Colorize for PlainColor {
    fn paint(&self, text: &str, _color: &ColorSpec) -> String {
        text.to_string()
    }
}

fn escape_html(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for c in source.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi_wraps_named_colors() {
        let out = AnsiColor.paint("hi", &ColorSpec::Named(ColorName::Cyan));
        assert_eq!(out, "\u{1b}[96mhi\u{1b}[0m");
        let bold = AnsiColor.paint("T", &ColorSpec::Named(ColorName::Bold));
        assert_eq!(bold, "\u{1b}[1mT\u{1b}[0m");
    }

    #[test]
    fn ansi_uses_custom_code_when_present() {
        let with_code = ColorSpec::Custom {
            code: "#cd3131".into(),
            ansi_code: Some(31),
        };
        assert_eq!(AnsiColor.paint("x", &with_code), "\u{1b}[31mx\u{1b}[0m");

        let without_code = ColorSpec::Custom {
            code: "#cd3131".into(),
            ansi_code: None,
        };
        assert_eq!(AnsiColor.paint("x", &without_code), "x");
    }

    #[test]
    fn html_escapes_and_styles() {
        let out = HtmlColor::light().paint("<a & 'b'>", &ColorSpec::Named(ColorName::Green));
        assert_eq!(
            out,
            r#"<span style="color: #1f8236">&lt;a &amp; &#039;b&#039;&gt;</span>"#
        );
        let bold = HtmlColor::dark().paint("B", &ColorSpec::Named(ColorName::Bold));
        assert_eq!(bold, r#"<span style="font-weight: bold">B</span>"#);
    }

    #[test]
    fn closures_are_color_backends() {
        let brackets = |text: &str, color: &ColorSpec| match color {
            ColorSpec::Named(name) => format!("<{name}>{text}</{name}>"),
            ColorSpec::Custom { code, .. } => format!("<{code}>{text}"),
        };
        assert_eq!(
            brackets.paint("1", &ColorSpec::Named(ColorName::Yellow)),
            "<yellow>1</yellow>"
        );
    }

    #[test]
    fn code_tables_cover_every_palette_color() {
        for name in ColorName::ALL {
            if name == ColorName::Bold {
                continue;
            }
            assert!(lookup_code(DEFAULT_COLOR_CODES, name.as_str()).is_some());
            assert!(lookup_code(LIGHT_COLOR_CODES, name.as_str()).is_some());
        }
    }
}

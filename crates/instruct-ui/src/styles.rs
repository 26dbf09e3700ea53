//! Ayu color theme and styling functions for CLI output.
//!
//! Color source: <https://github.com/ayu-theme/ayu-colors>

use instruct_table::ErrorKind;
use owo_colors::OwoColorize;

use crate::terminal::{supports_color, terminal_width};

const PASS: (u8, u8, u8) = (0xc2, 0xd9, 0x4c); // #c2d94c - bright green
const WARN: (u8, u8, u8) = (0xff, 0xb4, 0x54); // #ffb454 - bright yellow
const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78); // #f07178 - bright red
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80); // #6c7680 - muted gray
const ACCENT: (u8, u8, u8) = (0x59, 0xc2, 0xff); // #59c2ff - bright blue
const EXPRESSION: (u8, u8, u8) = (0xd2, 0xa6, 0xff); // #d2a6ff - purple

pub const ICON_PASS: &str = "\u{2713}"; // ✓
pub const ICON_FAIL: &str = "\u{2716}"; // ✖
pub const ICON_ARROW: &str = "\u{2192}"; // →

const SEPARATOR_CHAR: char = '\u{2500}'; // ─
const SEPARATOR_MAX: usize = 60;

fn color_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        s.to_string()
    }
}

fn color_bold_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).bold().to_string()
    } else {
        s.to_string()
    }
}

pub fn render_pass(s: &str) -> String {
    color_str(s, PASS)
}

pub fn render_warn(s: &str) -> String {
    color_str(s, WARN)
}

pub fn render_fail(s: &str) -> String {
    color_str(s, FAIL)
}

pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

pub fn render_bold(s: &str) -> String {
    if supports_color() {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

/// Renders a rule name as a bold accent heading.
pub fn render_rule_name(name: &str) -> String {
    color_bold_str(name, ACCENT)
}

/// Renders condition or consequence source text.
pub fn render_expression(source: &str) -> String {
    color_str(source, EXPRESSION)
}

/// Renders a compile error classification. Layout and binding errors are
/// bold red.
pub fn render_error_kind(kind: ErrorKind) -> String {
    match kind {
        ErrorKind::Layout | ErrorKind::Binding => color_bold_str(kind.as_str(), FAIL),
        ErrorKind::Expression => color_str(kind.as_str(), WARN),
        ErrorKind::Sheet => color_str(kind.as_str(), MUTED),
    }
}

/// A muted horizontal rule sized to the terminal, capped for readability.
pub fn render_separator() -> String {
    let width = terminal_width().min(SEPARATOR_MAX);
    render_muted(&SEPARATOR_CHAR.to_string().repeat(width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_keep_the_text() {
        assert!(render_rule_name("domestic").contains("domestic"));
        assert!(render_error_kind(ErrorKind::Binding).contains("binding"));
        assert!(render_expression("this.a > 1").contains("this.a > 1"));
    }

    #[test]
    fn separator_is_bounded() {
        let sep = render_separator();
        assert!(sep.chars().filter(|c| *c == SEPARATOR_CHAR).count() <= SEPARATOR_MAX);
    }
}

//! Console colors for branch-sweep.
//!
//! Color is decided once per run from the environment and the terminal, then
//! applied through [`styled`] so plain output stays byte-for-byte stable.

use colored::{ColoredString, Colorize};
use std::io::IsTerminal;

/// Level of color support detected for the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    /// No color (NO_COLOR set, TERM=dumb, piped output)
    None,
    Basic,
}

impl ColorSupport {
    /// Detect color support from environment and terminal capabilities
    #[must_use]
    pub fn detect() -> Self {
        // https://no-color.org/
        if std::env::var("NO_COLOR").is_ok() {
            return Self::None;
        }

        if std::env::var("FORCE_COLOR").is_ok() {
            return Self::Basic;
        }

        if !std::io::stdout().is_terminal() {
            return Self::None;
        }

        if std::env::var("TERM").is_ok_and(|term| term == "dumb") {
            return Self::None;
        }

        Self::Basic
    }

    #[must_use]
    pub const fn has_color(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl Default for ColorSupport {
    fn default() -> Self {
        Self::detect()
    }
}

/// Pre-built styles for sweep output
pub struct SweepStyles;

impl SweepStyles {
    /// Deleted branches and the final tally (green, bold)
    pub fn success(text: &str) -> ColoredString {
        text.green().bold()
    }

    /// Failures (red, bold)
    pub fn error(text: &str) -> ColoredString {
        text.red().bold()
    }

    /// Dry-run markers
    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    /// Invocation parameters in the banner
    pub fn param(text: &str) -> ColoredString {
        text.red()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.dimmed()
    }

    pub fn bold(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn branch(text: &str) -> ColoredString {
        text.cyan()
    }
}

/// Apply a style conditionally based on color support
///
/// If colors are not supported, returns the plain text.
pub fn styled<S, F>(text: S, style_fn: F, support: ColorSupport) -> String
where
    S: AsRef<str>,
    F: FnOnce(&str) -> ColoredString,
{
    if support.has_color() {
        style_fn(text.as_ref()).to_string()
    } else {
        text.as_ref().to_string()
    }
}

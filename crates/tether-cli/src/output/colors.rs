//! Terminal color support detection and formatting.
//!
//! Provides automatic color detection that respects the NO_COLOR environment
//! variable and TTY detection for consistent output across environments.

use std::env;
use std::io::{self, IsTerminal};

/// Color support detection and formatting
#[derive(Debug, Clone, Copy)]
pub struct ColorSupport {
    enabled: bool,
}

impl ColorSupport {
    /// Detect color support automatically
    pub fn detect() -> Self {
        let enabled = Self::should_use_colors();
        Self { enabled }
    }

    /// Force enable colors
    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Force disable colors
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Check if colors should be used
    fn should_use_colors() -> bool {
        // Respect NO_COLOR environment variable
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        // Check if we're in a TTY
        io::stderr().is_terminal() && io::stdout().is_terminal()
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }
}

impl ColorSupport {
    /// Format text in green
    pub fn green(&self, text: &str) -> String {
        self.paint("32", text)
    }

    /// Format text in yellow
    pub fn yellow(&self, text: &str) -> String {
        self.paint("33", text)
    }

    /// Format text in red
    pub fn red(&self, text: &str) -> String {
        self.paint("31", text)
    }

    /// Format text in bold
    pub fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }

    /// Format text as dim/gray
    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_plain() {
        let colors = ColorSupport::disabled();
        assert_eq!(colors.red("x"), "x");
        assert_eq!(colors.bold("x"), "x");
    }

    #[test]
    fn test_enabled_wraps_in_escape_codes() {
        let colors = ColorSupport::enabled();
        assert_eq!(colors.green("ok"), "\x1b[32mok\x1b[0m");
        assert_eq!(colors.dim("-"), "\x1b[2m-\x1b[0m");
    }
}

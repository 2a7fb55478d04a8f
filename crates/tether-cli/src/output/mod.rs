//! Terminal output formatting and utilities.
//!
//! This module provides consistent output formatting across all commands,
//! including colors and error messages.

pub mod colors;
pub mod errors;

use colors::ColorSupport;

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: ColorSupport,
}

impl OutputHandler {
    /// Create an output handler with the given color support
    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &ColorSupport {
        &self.colors
    }

    /// Print rendered command output as is
    pub fn print(&self, text: &str) {
        print!("{}", text);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", self.colors.dim(message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("⚠"), message);
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.colors.red("✗"), message);
    }
}

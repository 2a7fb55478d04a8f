//! Error message formatting with actionable suggestions.
//!
//! Prints the outermost context first, then a `help:` line when any error
//! in the chain is a [`TetherError`] with a suggestion, then every cause.

use super::colors::ColorSupport;
use tether_core::TetherError;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format an error with context and suggestions
    pub fn format_error(&self, error: &anyhow::Error) -> String {
        let mut output = String::new();

        // Main error message
        output.push_str(&self.colors.red("error"));
        output.push_str(": ");
        output.push_str(&error.to_string());
        output.push('\n');

        // Add suggestion if available
        let suggestion = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<TetherError>())
            .and_then(TetherError::suggestion);
        if let Some(suggestion) = suggestion {
            output.push('\n');
            output.push_str(&self.colors.dim("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        // Add source chain if available
        for cause in error.chain().skip(1) {
            output.push('\n');
            output.push_str(&self.colors.dim("caused by"));
            output.push_str(": ");
            output.push_str(&cause.to_string());
        }

        output
    }
}

//! tether.toml parsing

use camino::Utf8Path;
use tether_core::TetherError;

use crate::manifest::Manifest;
use crate::ConfigResult;

const INLINE: &str = "<inline>";

/// Parse a TOML manifest and validate it against its own mode
pub fn parse_manifest(content: &str) -> ConfigResult<Manifest> {
    // First try with toml_edit for better error reporting
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| parse_error(INLINE, format!("TOML syntax error: {}", e)))?;

    // Then parse with serde for type safety
    let manifest: Manifest = toml::from_str(content)
        .map_err(|e| parse_error(INLINE, format!("TOML parsing error: {}", e)))?;

    manifest.validate(manifest.mode_or(Default::default()))?;

    Ok(manifest)
}

/// Load and parse a TOML manifest from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<Manifest> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TetherError::io(format!("Failed to read {}", path), e))?;

    parse_manifest(&content).map_err(|e| match e {
        TetherError::ManifestParse { message, .. } => parse_error(path.as_str(), message),
        TetherError::ConfigValidation { field, reason } => TetherError::ConfigValidation {
            field: format!("{}: {}", path, field),
            reason,
        },
        other => other,
    })
}

fn parse_error(path: &str, message: String) -> TetherError {
    TetherError::ManifestParse {
        path: path.to_string(),
        message,
    }
}

//! tether.json parsing
//!
//! Same shape as the TOML manifest: `{"mode": "graph", "node": [...]}`.

use camino::Utf8Path;
use tether_core::TetherError;

use crate::manifest::Manifest;
use crate::ConfigResult;

/// Parse a JSON manifest and validate it against its own mode
pub fn parse_manifest(content: &str) -> ConfigResult<Manifest> {
    let manifest: Manifest = serde_json::from_str(content).map_err(|e| TetherError::ManifestParse {
        path: "<inline>".to_string(),
        message: format!("JSON parsing error: {}", e),
    })?;

    manifest.validate(manifest.mode_or(Default::default()))?;

    Ok(manifest)
}

/// Serialize a manifest to pretty-printed JSON
pub fn serialize_manifest(manifest: &Manifest) -> ConfigResult<String> {
    serde_json::to_string_pretty(manifest).map_err(|e| TetherError::Serialization {
        message: format!("JSON serialization error: {}", e),
    })
}

/// Load and parse a JSON manifest from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<Manifest> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TetherError::io(format!("Failed to read {}", path), e))?;

    parse_manifest(&content).map_err(|e| match e {
        TetherError::ManifestParse { message, .. } => TetherError::ManifestParse {
            path: path.to_string(),
            message,
        },
        TetherError::ConfigValidation { field, reason } => TetherError::ConfigValidation {
            field: format!("{}: {}", path, field),
            reason,
        },
        other => other,
    })
}

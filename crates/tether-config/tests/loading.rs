//! Manifest discovery and settings loading against real files

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use tether_config::{
    ManifestLoader, ManifestSource, Mode, OutputFormat, Overrides, SettingsLoader,
};
use tether_core::TetherError;

fn temp_dir() -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

const GRAPH_TOML: &str = r#"
mode = "graph"

[[node]]
name = "a"

[[node]]
name = "b"
parents = "a"
"#;

#[tokio::test]
async fn test_load_toml_by_path() {
    let (_dir, root) = temp_dir();
    tokio::fs::write(root.join("deps.toml"), GRAPH_TOML).await.unwrap();

    let loader = ManifestLoader::new(root.clone());
    let (manifest, source) = loader.load(Utf8Path::new("deps.toml")).await.unwrap();

    assert_eq!(manifest.nodes.len(), 2);
    assert_eq!(source, ManifestSource::Toml(root.join("deps.toml")));
}

#[tokio::test]
async fn test_load_json_by_extension() {
    let (_dir, root) = temp_dir();
    let path = root.join("deps.json");
    tokio::fs::write(&path, r#"{ "mode": "tree", "node": [ { "name": "a" } ] }"#)
        .await
        .unwrap();

    let loader = ManifestLoader::new(root);
    let (manifest, source) = loader.load(&path).await.unwrap();

    assert_eq!(manifest.mode, Some(Mode::Tree));
    assert!(matches!(source, ManifestSource::Json(_)));
}

#[tokio::test]
async fn test_discover_walks_up() {
    let (_dir, root) = temp_dir();
    tokio::fs::write(root.join("tether.toml"), GRAPH_TOML).await.unwrap();
    let nested = root.join("services").join("api");
    tokio::fs::create_dir_all(&nested).await.unwrap();

    let loader = ManifestLoader::new(nested);
    let (manifest, source) = loader.discover().await.unwrap();

    assert_eq!(manifest.nodes[1].name, "b");
    assert_eq!(source.path(), root.join("tether.toml").as_path());
}

#[tokio::test]
async fn test_discover_prefers_toml() {
    let (_dir, root) = temp_dir();
    tokio::fs::write(root.join("tether.toml"), GRAPH_TOML).await.unwrap();
    tokio::fs::write(root.join("tether.json"), r#"{ "node": [] }"#).await.unwrap();

    let loader = ManifestLoader::new(root);
    let (_, source) = loader.discover().await.unwrap();
    assert!(matches!(source, ManifestSource::Toml(_)));
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let (_dir, root) = temp_dir();
    let loader = ManifestLoader::new(root);

    let err = loader.load(Utf8Path::new("absent.toml")).await.unwrap_err();
    assert!(matches!(err, TetherError::Io { .. }));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_parse_error_carries_path() {
    let (_dir, root) = temp_dir();
    let path = root.join("broken.toml");
    tokio::fs::write(&path, "[[node]\n").await.unwrap();

    let err = ManifestLoader::new(root).load(&path).await.unwrap_err();
    match err {
        TetherError::ManifestParse { path: reported, .. } => assert_eq!(reported, path.as_str()),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_settings_layers_user_file_env_and_cli() {
    let (_dir, root) = temp_dir();
    let config = root.join("config.toml");
    tokio::fs::write(&config, "mode = \"tree\"\nformat = \"json\"\nstrict = true\n")
        .await
        .unwrap();

    let env = HashMap::from([("TETHER_STRICT".to_string(), "false".to_string())]);
    let cli = Overrides {
        format: Some(OutputFormat::Text),
        ..Default::default()
    };

    let settings = SettingsLoader::new()
        .with_config_path(config)
        .with_env(env)
        .load(cli)
        .await
        .unwrap();

    assert_eq!(settings.mode, Mode::Tree);
    assert_eq!(settings.mode_override, None);
    assert_eq!(settings.format, OutputFormat::Text);
    assert!(!settings.strict);
}

#[tokio::test]
async fn test_missing_user_file_is_skipped() {
    let (_dir, root) = temp_dir();

    let settings = SettingsLoader::new()
        .with_config_path(root.join("nope.toml"))
        .with_env(HashMap::new())
        .load(Overrides::default())
        .await
        .unwrap();

    assert!(settings.sources.is_empty());
    assert_eq!(settings.mode, Mode::Graph);
}

#[tokio::test]
async fn test_unknown_user_setting_rejected() {
    let (_dir, root) = temp_dir();
    let config = root.join("config.toml");
    tokio::fs::write(&config, "colour = true\n").await.unwrap();

    let loader = SettingsLoader::new()
        .with_config_path(config)
        .with_env(HashMap::new());
    assert!(loader.load_user_config().await.is_err());
}

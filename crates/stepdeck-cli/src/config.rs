//! Project-local CLI configuration: `.stepdeck/config.toml`.
//!
//! Missing file and missing keys both fall back to defaults, so a bare
//! `sd init` needs no config at all.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the store and config, relative to the project root.
pub const STEPDECK_DIR: &str = ".stepdeck";

/// Default store filename inside [`STEPDECK_DIR`].
pub const STORE_FILE: &str = "stepdeck.sqlite3";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub actor: ActorConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Override for the store path, relative to the project root.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Fallback actor identity for mutating commands.
    #[serde(default)]
    pub default: Option<String>,
}

/// Load `.stepdeck/config.toml` from the project root, defaulting when
/// the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(project_root: &Path) -> Result<CliConfig> {
    let path = project_root.join(STEPDECK_DIR).join("config.toml");
    if !path.exists() {
        return Ok(CliConfig::default());
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
}

/// Resolve the store path: `--store` flag, then config override, then
/// the default location under [`STEPDECK_DIR`].
#[must_use]
pub fn resolve_store_path(
    project_root: &Path,
    store_flag: Option<&Path>,
    config: &CliConfig,
) -> PathBuf {
    if let Some(path) = store_flag {
        return path.to_path_buf();
    }
    if let Some(path) = &config.store.path {
        return project_root.join(path);
    }
    project_root.join(STEPDECK_DIR).join(STORE_FILE)
}

#[cfg(test)]
mod tests {
    use super::{CliConfig, load, resolve_store_path};
    use std::path::Path;

    #[test]
    fn missing_config_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = load(dir.path()).expect("load");
        assert!(config.store.path.is_none());
        assert!(config.actor.default.is_none());
    }

    #[test]
    fn config_parses_overrides() {
        let dir = tempfile::tempdir().expect("temp dir");
        let stepdeck_dir = dir.path().join(".stepdeck");
        std::fs::create_dir_all(&stepdeck_dir).expect("mkdir");
        std::fs::write(
            stepdeck_dir.join("config.toml"),
            "[store]\npath = \"data/cases.db\"\n\n[actor]\ndefault = \"qa-team\"\n",
        )
        .expect("write config");

        let config = load(dir.path()).expect("load");
        assert_eq!(
            config.store.path.as_deref(),
            Some(Path::new("data/cases.db"))
        );
        assert_eq!(config.actor.default.as_deref(), Some("qa-team"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let stepdeck_dir = dir.path().join(".stepdeck");
        std::fs::create_dir_all(&stepdeck_dir).expect("mkdir");
        std::fs::write(stepdeck_dir.join("config.toml"), "store = \"not a table\"")
            .expect("write config");

        assert!(load(dir.path()).is_err());
    }

    #[test]
    fn store_flag_wins_over_config() {
        let config = CliConfig {
            store: super::StoreConfig {
                path: Some("override.db".into()),
            },
            actor: super::ActorConfig::default(),
        };

        let resolved = resolve_store_path(
            Path::new("/repo"),
            Some(Path::new("/tmp/explicit.db")),
            &config,
        );
        assert_eq!(resolved, Path::new("/tmp/explicit.db"));

        let resolved = resolve_store_path(Path::new("/repo"), None, &config);
        assert_eq!(resolved, Path::new("/repo/override.db"));

        let resolved =
            resolve_store_path(Path::new("/repo"), None, &CliConfig::default());
        assert_eq!(resolved, Path::new("/repo/.stepdeck/stepdeck.sqlite3"));
    }
}

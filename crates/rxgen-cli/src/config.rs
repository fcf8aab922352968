//! Configuration file loading.

use std::path::Path;

use anyhow::{Context, Result};
use rxgen_core::GeneratorConfig;

/// Name of the configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rxgen.toml";

/// Load the generator configuration.
///
/// An explicit path must exist. Without one, `rxgen.toml` in the working
/// directory is used when present, and the defaults otherwise.
pub fn load(path: Option<&Path>) -> Result<GeneratorConfig> {
    let config = match path {
        Some(path) => from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => from_file(Path::new(DEFAULT_CONFIG_FILE))?,
        None => GeneratorConfig::default(),
    };

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Parse a configuration file.
pub fn from_file(path: &Path) -> Result<GeneratorConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rxgen.toml");
        fs::write(
            &path,
            "extensions_namespace = \"MyApp.Events\"\n\n[reactive]\nunit = \"global::MyRx.Unit\"\n",
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();

        assert_eq!(config.extensions_namespace, "MyApp.Events");
        assert_eq!(config.reactive.unit, "global::MyRx.Unit");
        assert_eq!(config.factory_method, "Events");
        assert!(config.collapse_plain_event_args);
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rxgen.toml");
        fs::write(&path, "factory_method = \"not valid\"\n").unwrap();

        assert!(load(Some(&path)).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }
}

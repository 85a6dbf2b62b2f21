//! Configuration file loading for cnbind.
//!
//! Loads `cnbind.toml` from the working directory and merges it with CLI
//! arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use cnbind_api::{ApiVersion, SupportedRange};
use cnbind_platform::BindingLayout;
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "cnbind.toml";

/// Top-level configuration from cnbind.toml.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CnbindConfig {
    pub api: ApiConfig,
    pub bindings: BindingsConfig,
}

/// `[api]`: supported range override.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub min: Option<ApiVersion>,
    pub max: Option<ApiVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BindingsConfig {
    /// Fold `metadata/` and `secret/` subdirectories into bindings.
    pub legacy_subdirs: bool,
}

pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<CnbindConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<CnbindConfig> {
    let config: CnbindConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

pub fn load_or_default(dir: &Utf8Path) -> anyhow::Result<CnbindConfig> {
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(CnbindConfig::default()),
    }
}

/// Settings after merging file and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    pub range: SupportedRange,
    pub binding_layout: BindingLayout,
}

pub struct ConfigMerger {
    file: CnbindConfig,
}

impl ConfigMerger {
    pub fn new(file: CnbindConfig) -> Self {
        Self { file }
    }

    /// Flags win over the file; the file wins over built-in defaults.
    pub fn merge(
        self,
        min: Option<ApiVersion>,
        max: Option<ApiVersion>,
        legacy_subdirs: bool,
    ) -> anyhow::Result<MergedConfig> {
        let min = min
            .or(self.file.api.min)
            .unwrap_or(SupportedRange::DEFAULT_MIN);
        let max = max
            .or(self.file.api.max)
            .unwrap_or(SupportedRange::DEFAULT_MAX);
        let range = SupportedRange::new(min, max).context("supported API range")?;
        let binding_layout = if legacy_subdirs || self.file.bindings.legacy_subdirs {
            BindingLayout::AllowLegacySubdirs
        } else {
            BindingLayout::Flat
        };
        Ok(MergedConfig {
            range,
            binding_layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn parse_full_config() {
        let config = parse_config(
            r#"
[api]
min = "0.8"
max = "0.9"

[bindings]
legacy-subdirs = true
"#,
        )
        .unwrap();
        assert_eq!(config.api.min, Some(ApiVersion::new(0, 8)));
        assert_eq!(config.api.max, Some(ApiVersion::new(0, 9)));
        assert!(config.bindings.legacy_subdirs);
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), CnbindConfig::default());
    }

    #[test]
    fn invalid_version_is_rejected() {
        assert!(parse_config("[api]\nmin = \"banana\"\n").is_err());
    }

    #[test]
    fn missing_file_yields_default() {
        let tmp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(tmp.path()).unwrap();
        assert_eq!(load_or_default(dir).unwrap(), CnbindConfig::default());
    }

    #[test]
    fn flags_override_file() {
        let file = parse_config("[api]\nmin = \"0.6\"\nmax = \"0.9\"\n").unwrap();
        let merged = ConfigMerger::new(file)
            .merge(Some(ApiVersion::new(0, 7)), None, false)
            .unwrap();
        assert_eq!(merged.range.min(), &ApiVersion::new(0, 7));
        assert_eq!(merged.range.max(), &ApiVersion::new(0, 9));
        assert_eq!(merged.binding_layout, BindingLayout::Flat);
    }

    #[test]
    fn inverted_range_is_an_error() {
        let err = ConfigMerger::new(CnbindConfig::default())
            .merge(Some(ApiVersion::new(0, 10)), Some(ApiVersion::new(0, 6)), false)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("greater than"));
    }
}

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use cnbind_types::Metadata;
use cnbind_types::layer::{LayerContentMetadata, LayerTypes};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Environment, LayerError, Sbom};

/// A layer as the build callback sees it.
///
/// Obtained from [`crate::Layers::get`]; everything here is written back by
/// [`crate::Layers::reconcile`] once the callback returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    name: String,
    path: Utf8PathBuf,

    pub types: LayerTypes,
    pub metadata: Metadata,

    /// `env/`: applied at build and launch time.
    pub shared_env: Environment,
    /// `env.build/`
    pub build_env: Environment,
    /// `env.launch/`
    pub launch_env: Environment,
    /// `env.launch/<process-type>/`
    pub process_launch_env: BTreeMap<String, Environment>,

    /// `profile.d/<file>` script contents, keyed by file name.
    pub profile_d: BTreeMap<String, String>,
    /// Executables copied into `exec.d/<name>`, keyed by target name.
    pub exec_d: BTreeMap<String, Utf8PathBuf>,

    pub sboms: Vec<Sbom>,
}

impl Layer {
    pub(crate) fn new(name: String, path: Utf8PathBuf, content: LayerContentMetadata) -> Self {
        Self {
            name,
            path,
            types: content.types,
            metadata: content.metadata,
            shared_env: Environment::default(),
            build_env: Environment::default(),
            launch_env: Environment::default(),
            process_launch_env: BTreeMap::new(),
            profile_d: BTreeMap::new(),
            exec_d: BTreeMap::new(),
            sboms: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The layer's content directory.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn content_metadata(&self) -> LayerContentMetadata {
        LayerContentMetadata {
            types: self.types,
            metadata: self.metadata.clone(),
        }
    }

    /// Launch-time environment scoped to one process type.
    pub fn process_env(&mut self, process_type: &str) -> &mut Environment {
        self.process_launch_env
            .entry(process_type.to_string())
            .or_default()
    }

    /// Empty the layer directory and drop metadata, flags and pending writes.
    pub fn reset(&mut self) -> Result<(), LayerError> {
        if self.path.exists() {
            fs_err::remove_dir_all(&self.path).map_err(|source| LayerError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        fs_err::create_dir_all(&self.path).map_err(|source| LayerError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(layer = %self.name, "reset layer");

        *self = Layer::new(
            std::mem::take(&mut self.name),
            std::mem::take(&mut self.path),
            LayerContentMetadata::default(),
        );
        Ok(())
    }

    /// Decode the metadata table into `T`.
    pub fn metadata_as<T: DeserializeOwned>(&self) -> Result<T, toml::de::Error> {
        let table: toml::Table = self
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        toml::Value::Table(table).try_into()
    }

    /// Replace the metadata table with `value`, which must serialize to a table.
    pub fn set_metadata<T: Serialize>(&mut self, value: &T) -> Result<(), LayerError> {
        let encoded = toml::Value::try_from(value).map_err(|source| LayerError::Encode {
            path: self.path.clone(),
            source,
        })?;
        match encoded {
            toml::Value::Table(table) => {
                self.metadata = table.into_iter().collect();
                Ok(())
            }
            _ => Err(LayerError::MetadataNotTable {
                layer: self.name.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct NodeMeta {
        version: String,
        checksum: String,
    }

    fn layer_in(tmp: &TempDir) -> Layer {
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("node")).unwrap();
        Layer::new("node".to_string(), path, LayerContentMetadata::default())
    }

    #[test]
    fn typed_metadata_round_trips() {
        let tmp = TempDir::new().unwrap();
        let mut layer = layer_in(&tmp);
        let meta = NodeMeta {
            version: "20.1.0".to_string(),
            checksum: "abc".to_string(),
        };
        layer.set_metadata(&meta).unwrap();
        assert_eq!(layer.metadata_as::<NodeMeta>().unwrap(), meta);
    }

    #[test]
    fn non_table_metadata_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut layer = layer_in(&tmp);
        let err = layer.set_metadata(&"just a string").unwrap_err();
        assert!(matches!(err, LayerError::MetadataNotTable { .. }));
    }

    #[test]
    fn reset_clears_contents_and_state() {
        let tmp = TempDir::new().unwrap();
        let mut layer = layer_in(&tmp);
        std::fs::create_dir_all(layer.path().join("bin")).unwrap();
        std::fs::write(layer.path().join("bin/node"), "#!/bin/sh").unwrap();
        layer.types.launch = true;
        layer.launch_env.override_value("NODE_HOME", "/layers/node");

        layer.reset().unwrap();

        assert!(layer.path().exists());
        assert!(!layer.path().join("bin").exists());
        assert!(layer.types.is_empty());
        assert!(layer.launch_env.is_empty());
        assert_eq!(layer.name(), "node");
    }
}

use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};
use cnbind_api::{Contract, LayerShape};
use cnbind_types::layer::LayerContentMetadata;
use cnbind_types::wire::{FlatLayer, TypedLayer};
use tracing::{debug, warn};

use crate::ports::{EnvWritePort, TomlWritePort};
use crate::name::validate_entry;
use crate::{Environment, Layer, LayerError, RESERVED_TOML, Sbom, validate_layer_name};

/// The layers directory for one build, bound to the negotiated contract.
#[derive(Debug, Clone)]
pub struct Layers {
    dir: Utf8PathBuf,
    contract: Contract,
}

/// What [`Layers::reconcile`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Layer names whose metadata was written, in declaration order.
    pub written: Vec<String>,
    /// Stale metadata files that were deleted, sorted.
    pub removed: Vec<Utf8PathBuf>,
}

/// Encode layer metadata in the shape `contract` expects.
pub fn encode_layer_metadata(
    contract: Contract,
    content: &LayerContentMetadata,
) -> Result<toml::Table, toml::ser::Error> {
    let value = match contract.layer_shape() {
        LayerShape::Flat => toml::Value::try_from(FlatLayer::from(content))?,
        LayerShape::Typed => toml::Value::try_from(TypedLayer::from(content))?,
    };
    match value {
        toml::Value::Table(table) => Ok(table),
        _ => Ok(toml::Table::new()),
    }
}

fn decode_layer_metadata(
    contract: Contract,
    raw: &str,
) -> Result<LayerContentMetadata, toml::de::Error> {
    match contract.layer_shape() {
        LayerShape::Flat => FlatLayer::decode(raw),
        LayerShape::Typed => TypedLayer::decode(raw),
    }
}

fn io_err(path: &Utf8Path) -> impl FnOnce(std::io::Error) -> LayerError + '_ {
    move |source| LayerError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl Layers {
    pub fn new(dir: impl Into<Utf8PathBuf>, contract: Contract) -> Self {
        Self {
            dir: dir.into(),
            contract,
        }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn contract(&self) -> Contract {
        self.contract
    }

    pub fn metadata_path(&self, name: &str) -> Utf8PathBuf {
        self.dir.join(format!("{}.toml", name))
    }

    /// Decode `<layers>/<name>.toml` without touching the layer directory.
    pub fn read_metadata(&self, name: &str) -> Result<Option<LayerContentMetadata>, LayerError> {
        validate_layer_name(name)?;
        let meta_path = self.metadata_path(name);
        if !meta_path.is_file() {
            return Ok(None);
        }
        let raw = fs_err::read_to_string(&meta_path).map_err(io_err(&meta_path))?;
        decode_layer_metadata(self.contract, &raw)
            .map(Some)
            .map_err(|source| LayerError::Decode {
                path: meta_path,
                source,
            })
    }

    /// Open layer `name`, creating its directory and reloading any metadata
    /// a previous build left in `<layers>/<name>.toml`.
    pub fn get(&self, name: &str) -> Result<Layer, LayerError> {
        let content = self.read_metadata(name)?;
        let path = self.dir.join(name);
        fs_err::create_dir_all(&path).map_err(io_err(&path))?;
        debug!(layer = name, restored = content.is_some(), "opened layer");
        Ok(Layer::new(name.to_string(), path, content.unwrap_or_default()))
    }

    /// Names of layers that have a metadata file on disk, sorted.
    pub fn existing(&self) -> Result<Vec<String>, LayerError> {
        let mut names: Vec<String> = self
            .metadata_files()?
            .into_iter()
            .filter_map(|path| {
                let file_name = path.file_name()?;
                if RESERVED_TOML.contains(&file_name) {
                    return None;
                }
                path.file_stem().map(str::to_string)
            })
            .collect();
        names.sort();
        Ok(names)
    }

    /// Write every declared layer in order, then delete metadata for layers
    /// that are no longer declared.
    ///
    /// Everything is validated before the first write, and nothing is
    /// deleted unless all writes succeeded.
    pub fn reconcile(
        &self,
        layers: &[Layer],
        toml_writer: &dyn TomlWritePort,
        env_writer: &dyn EnvWritePort,
    ) -> Result<ReconcileReport, LayerError> {
        let mut declared = BTreeSet::new();
        for layer in layers {
            validate_layer_name(layer.name())?;
            if !declared.insert(layer.name()) {
                return Err(LayerError::InvalidName {
                    name: layer.name().to_string(),
                    reason: "declared more than once",
                });
            }
            self.check_supported(layer)?;
        }

        let mut report = ReconcileReport::default();
        for layer in layers {
            self.write_layer(layer, toml_writer, env_writer)?;
            report.written.push(layer.name().to_string());
        }

        for path in self.metadata_files()? {
            let Some(file_name) = path.file_name() else {
                continue;
            };
            if RESERVED_TOML.contains(&file_name) {
                continue;
            }
            let stem = path.file_stem().unwrap_or_default();
            if declared.contains(stem) {
                continue;
            }
            fs_err::remove_file(&path).map_err(io_err(&path))?;
            debug!(path = %path, "removed stale layer metadata");
            report.removed.push(path);
        }
        report.removed.sort();
        Ok(report)
    }

    /// Write a single layer's directory contents and metadata file.
    pub fn write_layer(
        &self,
        layer: &Layer,
        toml_writer: &dyn TomlWritePort,
        env_writer: &dyn EnvWritePort,
    ) -> Result<(), LayerError> {
        self.check_supported(layer)?;
        let root = layer.path();
        fs_err::create_dir_all(root).map_err(io_err(root))?;

        self.write_env(env_writer, &root.join("env"), &layer.shared_env)?;
        self.write_env(env_writer, &root.join("env.build"), &layer.build_env)?;
        self.write_env(env_writer, &root.join("env.launch"), &layer.launch_env)?;
        for (process_type, scoped) in &layer.process_launch_env {
            self.write_env(env_writer, &root.join("env.launch").join(process_type), scoped)?;
        }

        if !layer.profile_d.is_empty() {
            let dir = root.join("profile.d");
            fs_err::create_dir_all(&dir).map_err(io_err(&dir))?;
            for (file_name, script) in &layer.profile_d {
                let path = dir.join(file_name);
                fs_err::write(&path, script).map_err(io_err(&path))?;
            }
        }

        if !layer.exec_d.is_empty() {
            let dir = root.join("exec.d");
            fs_err::create_dir_all(&dir).map_err(io_err(&dir))?;
            for (name, source) in &layer.exec_d {
                let target = dir.join(name);
                fs_err::copy(source, &target).map_err(io_err(source))?;
                make_executable(&target)?;
            }
        }

        self.write_sboms(layer.name(), &layer.sboms)?;

        let meta_path = self.metadata_path(layer.name());
        let doc = encode_layer_metadata(self.contract, &layer.content_metadata()).map_err(
            |source| LayerError::Encode {
                path: meta_path.clone(),
                source,
            },
        )?;
        toml_writer
            .write_toml(&meta_path, &doc)
            .map_err(|source| LayerError::Write {
                path: meta_path.clone(),
                source,
            })?;
        debug!(layer = layer.name(), path = %meta_path, "wrote layer");
        Ok(())
    }

    /// Write SBOM files for `owner`: a layer name, `launch` or `build`.
    pub fn write_sboms(&self, owner: &str, sboms: &[Sbom]) -> Result<(), LayerError> {
        if sboms.is_empty() {
            return Ok(());
        }
        if !self.contract.supports_sbom() {
            return Err(LayerError::Unsupported {
                layer: owner.to_string(),
                feature: "SBOM files",
                contract: self.contract,
            });
        }
        fs_err::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        for sbom in sboms {
            let path = self.dir.join(sbom.format.file_name(owner));
            fs_err::write(&path, &sbom.content).map_err(io_err(&path))?;
            debug!(path = %path, media_type = sbom.format.media_type(), "wrote SBOM");
        }
        Ok(())
    }

    fn write_env(
        &self,
        port: &dyn EnvWritePort,
        dir: &Utf8Path,
        env: &Environment,
    ) -> Result<(), LayerError> {
        if env.is_empty() {
            return Ok(());
        }
        port.write_env(dir, env).map_err(|source| LayerError::Write {
            path: dir.to_path_buf(),
            source,
        })
    }

    fn check_supported(&self, layer: &Layer) -> Result<(), LayerError> {
        let name = layer.name();
        for env in [&layer.shared_env, &layer.build_env, &layer.launch_env] {
            for (file, _) in env.files() {
                validate_entry(name, file)?;
            }
        }
        for (process_type, env) in &layer.process_launch_env {
            validate_entry(name, process_type)?;
            for (file, _) in env.files() {
                validate_entry(name, file)?;
            }
        }
        for file in layer.profile_d.keys().chain(layer.exec_d.keys()) {
            validate_entry(name, file)?;
        }

        if !layer.profile_d.is_empty() && !self.contract.supports_profile_d() {
            return Err(LayerError::Unsupported {
                layer: layer.name().to_string(),
                feature: "profile.d scripts",
                contract: self.contract,
            });
        }
        if !layer.sboms.is_empty() && !self.contract.supports_sbom() {
            return Err(LayerError::Unsupported {
                layer: layer.name().to_string(),
                feature: "SBOM files",
                contract: self.contract,
            });
        }
        Ok(())
    }

    fn metadata_files(&self) -> Result<Vec<Utf8PathBuf>, LayerError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let pattern = Utf8PathBuf::from(glob::Pattern::escape(self.dir.as_str())).join("*.toml");
        let entries = glob::glob(pattern.as_str()).map_err(|e| LayerError::Io {
            path: pattern.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| LayerError::Io {
                path: Utf8PathBuf::from(e.path().to_string_lossy().into_owned()),
                source: e.into_error(),
            })?;
            match Utf8PathBuf::from_path_buf(path) {
                Ok(p) if p.is_file() => files.push(p),
                Ok(_) => {}
                Err(p) => warn!(path = %p.display(), "skipping non-UTF-8 path in layers dir"),
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(unix)]
fn make_executable(path: &Utf8Path) -> Result<(), LayerError> {
    use std::os::unix::fs::PermissionsExt;
    fs_err::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(io_err(path))
}

#[cfg(not(unix))]
fn make_executable(_path: &Utf8Path) -> Result<(), LayerError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FsEnvWriter, FsTomlWriter};
    use crate::SbomFormat;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn layers_in(tmp: &TempDir, contract: Contract) -> Layers {
        Layers::new(
            Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap(),
            contract,
        )
    }

    #[test]
    fn flat_contract_writes_top_level_flags() {
        let tmp = TempDir::new().unwrap();
        let layers = layers_in(&tmp, Contract::Flat);
        let mut layer = layers.get("jdk").unwrap();
        layer.types.launch = true;
        layers.write_layer(&layer, &FsTomlWriter, &FsEnvWriter).unwrap();

        let raw = std::fs::read_to_string(layers.metadata_path("jdk")).unwrap();
        assert!(raw.contains("launch = true"));
        assert!(!raw.contains("[types]"));
    }

    #[test]
    fn typed_contract_reads_flat_metadata() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("jdk.toml"), "cache = true\n").unwrap();
        let layers = layers_in(&tmp, Contract::Typed);
        let layer = layers.get("jdk").unwrap();
        assert!(layer.types.cache);
    }

    #[test]
    fn profile_d_rejected_for_exec_array() {
        let tmp = TempDir::new().unwrap();
        let layers = layers_in(&tmp, Contract::ExecArray);
        let mut layer = layers.get("tools").unwrap();
        layer.profile_d.insert("init.sh".to_string(), "export A=1".to_string());

        let err = layers
            .reconcile(&[layer], &FsTomlWriter, &FsEnvWriter)
            .unwrap_err();
        assert!(matches!(err, LayerError::Unsupported { feature: "profile.d scripts", .. }));
        assert!(!layers.metadata_path("tools").exists());
    }

    #[test]
    fn sbom_rejected_before_sbom_contract() {
        let tmp = TempDir::new().unwrap();
        let layers = layers_in(&tmp, Contract::Typed);
        let err = layers
            .write_sboms(
                "launch",
                &[Sbom {
                    format: SbomFormat::CycloneDxJson,
                    content: b"{}".to_vec(),
                }],
            )
            .unwrap_err();
        assert!(matches!(err, LayerError::Unsupported { .. }));
    }

    #[test]
    fn duplicate_layer_names_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let layers = layers_in(&tmp, Contract::ExecArray);
        let a = layers.get("node").unwrap();
        let b = layers.get("node").unwrap();
        let err = layers.reconcile(&[a, b], &FsTomlWriter, &FsEnvWriter).unwrap_err();
        assert!(matches!(err, LayerError::InvalidName { reason: "declared more than once", .. }));
    }

    #[test]
    fn existing_skips_reserved_files() {
        let tmp = TempDir::new().unwrap();
        for f in ["node.toml", "store.toml", "launch.toml", "build.toml", "jdk.toml"] {
            std::fs::write(tmp.path().join(f), "").unwrap();
        }
        let layers = layers_in(&tmp, Contract::ExecArray);
        assert_eq!(layers.existing().unwrap(), vec!["jdk".to_string(), "node".to_string()]);
    }
}

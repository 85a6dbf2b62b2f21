//! Locating and decoding `buildpack.toml` / `extension.toml`.

use camino::{Utf8Path, Utf8PathBuf};
use cnbind_platform::vars;
use cnbind_types::descriptor::{BuildpackDescriptor, ExtensionDescriptor};
use cnbind_types::files;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::PhaseError;
use crate::ports::EnvPort;

/// A module descriptor: what a buildpack or extension declares about itself.
pub trait Descriptor: DeserializeOwned + Default {
    /// File name inside the module directory.
    const FILE: &'static str;
    /// Variable naming the module directory under the env layout.
    const DIR_VAR: &'static str;
    /// Extensions only exist from the env-layout contract onwards.
    const REQUIRES_ENV_LAYOUT: bool;

    fn api(&self) -> Option<&str>;
}

impl Descriptor for BuildpackDescriptor {
    const FILE: &'static str = files::BUILDPACK_TOML;
    const DIR_VAR: &'static str = vars::BUILDPACK_DIR;
    const REQUIRES_ENV_LAYOUT: bool = false;

    fn api(&self) -> Option<&str> {
        self.api.as_deref()
    }
}

impl Descriptor for ExtensionDescriptor {
    const FILE: &'static str = files::EXTENSION_TOML;
    const DIR_VAR: &'static str = vars::EXTENSION_DIR;
    const REQUIRES_ENV_LAYOUT: bool = true;

    fn api(&self) -> Option<&str> {
        self.api.as_deref()
    }
}

/// Where the module directory came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ModuleDir {
    pub path: Utf8PathBuf,
    pub from_env: bool,
}

/// `/cnb/buildpacks/node/bin/detect` -> `/cnb/buildpacks/node`.
pub(crate) fn dir_from_argv0(argv0: &str) -> Option<Utf8PathBuf> {
    let bin = Utf8Path::new(argv0).parent()?;
    if bin.file_name() != Some("bin") {
        return None;
    }
    let root = bin.parent()?;
    if root.as_str().is_empty() {
        Some(Utf8PathBuf::from("."))
    } else {
        Some(root.to_path_buf())
    }
}

pub(crate) fn resolve_module_dir<D: Descriptor>(
    env: &dyn EnvPort,
    args: &[String],
) -> Result<ModuleDir, PhaseError> {
    if let Some(dir) = env.var(D::DIR_VAR).filter(|v| !v.is_empty()) {
        return Ok(ModuleDir {
            path: Utf8PathBuf::from(dir),
            from_env: true,
        });
    }
    args.first()
        .and_then(|argv0| dir_from_argv0(argv0))
        .map(|path| ModuleDir {
            path,
            from_env: false,
        })
        .ok_or_else(|| PhaseError::missing_var(D::DIR_VAR))
}

/// Decode the descriptor in `dir`. A missing file decodes as the default.
pub(crate) fn load_descriptor<D: Descriptor>(dir: &Utf8Path) -> Result<D, PhaseError> {
    let path = dir.join(D::FILE);
    let raw = match fs_err::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path, "descriptor not found, using defaults");
            return Ok(D::default());
        }
        Err(e) => {
            return Err(PhaseError::Io {
                path,
                source: e.into(),
            });
        }
    };
    let descriptor = toml::from_str(&raw).map_err(|source| PhaseError::Decode {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path, "decoded descriptor");
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryEnv;
    use tempfile::TempDir;

    #[test]
    fn argv0_strips_bin_suffix() {
        assert_eq!(
            dir_from_argv0("/cnb/buildpacks/node/bin/detect"),
            Some(Utf8PathBuf::from("/cnb/buildpacks/node"))
        );
        assert_eq!(dir_from_argv0("bin/build"), Some(Utf8PathBuf::from(".")));
        assert_eq!(dir_from_argv0("/usr/local/detect"), None);
        assert_eq!(dir_from_argv0("detect"), None);
    }

    #[test]
    fn env_var_wins_over_argv0() {
        let env = InMemoryEnv::new().with_var(vars::BUILDPACK_DIR, "/bp");
        let args = vec!["/elsewhere/bin/detect".to_string()];
        let dir = resolve_module_dir::<BuildpackDescriptor>(&env, &args).unwrap();
        assert_eq!(dir.path, Utf8PathBuf::from("/bp"));
        assert!(dir.from_env);
    }

    #[test]
    fn unresolvable_dir_names_the_variable() {
        let env = InMemoryEnv::new();
        let err = resolve_module_dir::<ExtensionDescriptor>(&env, &["gen".to_string()]).unwrap_err();
        assert!(matches!(err, PhaseError::Environment { ref var, .. } if var == vars::EXTENSION_DIR));
    }

    #[test]
    fn missing_descriptor_is_default() {
        let tmp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(tmp.path()).unwrap();
        let d: BuildpackDescriptor = load_descriptor(dir).unwrap();
        assert_eq!(d, BuildpackDescriptor::default());
    }

    #[test]
    fn malformed_descriptor_reports_path() {
        let tmp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(tmp.path()).unwrap();
        std::fs::write(dir.join("buildpack.toml"), "api = [").unwrap();
        let err = load_descriptor::<BuildpackDescriptor>(dir).unwrap_err();
        assert!(err.to_string().contains("buildpack.toml"));
    }
}

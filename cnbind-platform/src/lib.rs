//! Platform projection for buildpack phases.
//!
//! The lifecycle hands a buildpack a platform directory containing `env/`
//! (one file per variable) and `bindings/` (one directory per service
//! binding), plus a handful of well-known process variables. This crate reads
//! those into immutable values; it never writes.

mod binding;
mod env_dir;
mod error;
mod target;
pub mod vars;

pub use binding::{Binding, BindingLayout, binding_root, read_bindings};
pub use env_dir::read_env_dir;
pub use error::PlatformError;
pub use target::TargetInfo;

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use tracing::debug;

/// Name of the env directory under the platform directory.
pub const ENV_DIR: &str = "env";

/// Name of the default bindings directory under the platform directory.
pub const BINDINGS_DIR: &str = "bindings";

/// Read-only view of the platform directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformView {
    dir: Utf8PathBuf,
    env: BTreeMap<String, String>,
    bindings: Vec<Binding>,
}

impl PlatformView {
    /// Project `dir/env` and the bindings found under `bindings_root`.
    pub fn load(
        dir: &Utf8Path,
        bindings_root: &Utf8Path,
        layout: BindingLayout,
    ) -> Result<Self, PlatformError> {
        let env = read_env_dir(&dir.join(ENV_DIR))?;
        let bindings = read_bindings(bindings_root, layout)?;
        debug!(
            platform = %dir,
            env_vars = env.len(),
            bindings = bindings.len(),
            "loaded platform view"
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            env,
            bindings,
        })
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Bindings whose `type` matches, in directory order.
    pub fn bindings_of_type<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Binding> {
        self.bindings
            .iter()
            .filter(move |b| b.binding_type() == Some(kind))
    }
}

//! What the user callback receives. Built once, handed over by value.

use camino::{Utf8Path, Utf8PathBuf};
use cnbind_api::{Contract, Negotiated};
use cnbind_layers::{Layer, LayerError, Layers};
use cnbind_platform::{PlatformView, TargetInfo};
use cnbind_types::descriptor::{BuildpackDescriptor, ExtensionDescriptor};
use cnbind_types::plan::BuildpackPlan;
use cnbind_types::store::Store;

/// Detect context, for buildpacks (the default) and extensions.
#[derive(Debug, Clone)]
pub struct DetectContext<D = BuildpackDescriptor> {
    pub app_dir: Utf8PathBuf,
    /// Directory holding the descriptor.
    pub module_dir: Utf8PathBuf,
    pub descriptor: D,
    pub platform: PlatformView,
    pub api: Negotiated,
    pub stack_id: Option<String>,
    pub target: TargetInfo,
}

#[derive(Debug, Clone)]
pub struct BuildContext {
    pub app_dir: Utf8PathBuf,
    pub buildpack_dir: Utf8PathBuf,
    pub descriptor: BuildpackDescriptor,
    pub platform: PlatformView,
    pub plan: BuildpackPlan,
    /// Contents of `<layers>/store.toml` from the previous build.
    pub store: Store,
    pub api: Negotiated,
    pub stack_id: Option<String>,
    pub target: TargetInfo,
    pub(crate) layers: Layers,
}

impl BuildContext {
    pub fn layers_dir(&self) -> &Utf8Path {
        self.layers.dir()
    }

    pub fn contract(&self) -> Contract {
        self.api.contract
    }

    /// Open a layer, restoring metadata from a previous build.
    pub fn layer(&self, name: &str) -> Result<Layer, LayerError> {
        self.layers.get(name)
    }

    /// Names of layers with metadata on disk from a previous build.
    pub fn existing_layers(&self) -> Result<Vec<String>, LayerError> {
        self.layers.existing()
    }
}

#[derive(Debug, Clone)]
pub struct GenerateContext {
    pub app_dir: Utf8PathBuf,
    pub extension_dir: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub descriptor: ExtensionDescriptor,
    pub platform: PlatformView,
    pub plan: BuildpackPlan,
    pub api: Negotiated,
    pub stack_id: Option<String>,
    pub target: TargetInfo,
}

//! What the user callback returns.

use cnbind_layers::{Layer, Sbom};
use cnbind_types::build::Build;
use cnbind_types::build_plan::BuildPlanAlternative;
use cnbind_types::extend::ExtendConfig;
use cnbind_types::launch::Launch;
use cnbind_types::store::Store;

/// Detect verdict plus the build plan to write when it passed.
///
/// Declining is not an error: a failed detect exits with its own status
/// and writes nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectResult {
    passed: bool,
    alternatives: Vec<BuildPlanAlternative>,
}

impl DetectResult {
    pub fn pass() -> Self {
        Self {
            passed: true,
            alternatives: Vec::new(),
        }
    }

    pub fn fail() -> Self {
        Self::default()
    }

    /// Add a plan alternative. The first one becomes the primary plan, the
    /// rest are written under `[[or]]`.
    pub fn plan(mut self, alternative: BuildPlanAlternative) -> Self {
        self.alternatives.push(alternative);
        self
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn alternatives(&self) -> &[BuildPlanAlternative] {
        &self.alternatives
    }

    pub(crate) fn into_alternatives(self) -> Vec<BuildPlanAlternative> {
        self.alternatives
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildResult {
    /// Written to `launch.toml` unless empty.
    pub launch: Launch,
    /// Written to `build.toml` unless empty.
    pub build: Build,
    /// Written to `store.toml` unless empty.
    pub store: Store,
    /// Every layer to keep. Metadata for layers missing here is deleted.
    pub layers: Vec<Layer>,
    pub launch_sboms: Vec<Sbom>,
    pub build_sboms: Vec<Sbom>,
}

impl BuildResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn launch(mut self, launch: Launch) -> Self {
        self.launch = launch;
        self
    }

    pub fn store(mut self, store: Store) -> Self {
        self.store = store;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResult {
    pub build_dockerfile: Option<String>,
    pub run_dockerfile: Option<String>,
    pub extend_config: ExtendConfig,
}

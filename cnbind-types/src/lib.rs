//! Shared DTOs (schemas-as-code) for the Cloud Native Buildpacks contract.
//!
//! # Design constraints
//! - Every type here is read from or written to disk by the lifecycle.
//! - Field names follow the TOML keys the lifecycle expects (kebab-case).
//! - Version-specific shapes live in [`wire`]; the types at the crate root are
//!   the version-neutral model the rest of the workspace works with.

use std::collections::BTreeMap;

pub mod build;
pub mod build_plan;
pub mod descriptor;
pub mod extend;
pub mod launch;
pub mod layer;
pub mod plan;
pub mod store;
pub mod wire;

/// Arbitrary `metadata` table.
///
/// The value type defaults to a TOML value so unknown shapes pass through
/// untouched; callers that know the shape can use their own `V`.
pub type Metadata<V = toml::Value> = BTreeMap<String, V>;

/// Well-known file names in the buildpack contract.
pub mod files {
    pub const BUILDPACK_TOML: &str = "buildpack.toml";
    pub const EXTENSION_TOML: &str = "extension.toml";
    pub const LAUNCH_TOML: &str = "launch.toml";
    pub const BUILD_TOML: &str = "build.toml";
    pub const STORE_TOML: &str = "store.toml";
    pub const EXTEND_CONFIG_TOML: &str = "extend-config.toml";
    pub const BUILD_DOCKERFILE: &str = "build.Dockerfile";
    pub const RUN_DOCKERFILE: &str = "run.Dockerfile";
}

//! Well-known environment variable names.

pub const PLATFORM_DIR: &str = "CNB_PLATFORM_DIR";
pub const BUILD_PLAN_PATH: &str = "CNB_BUILD_PLAN_PATH";
pub const BUILDPACK_DIR: &str = "CNB_BUILDPACK_DIR";
pub const LAYERS_DIR: &str = "CNB_LAYERS_DIR";
pub const BP_PLAN_PATH: &str = "CNB_BP_PLAN_PATH";
pub const STACK_ID: &str = "CNB_STACK_ID";
pub const OUTPUT_DIR: &str = "CNB_OUTPUT_DIR";
pub const EXTENSION_DIR: &str = "CNB_EXTENSION_DIR";

pub const TARGET_OS: &str = "CNB_TARGET_OS";
pub const TARGET_ARCH: &str = "CNB_TARGET_ARCH";
pub const TARGET_ARCH_VARIANT: &str = "CNB_TARGET_ARCH_VARIANT";
pub const TARGET_DISTRO_NAME: &str = "CNB_TARGET_DISTRO_NAME";
pub const TARGET_DISTRO_VERSION: &str = "CNB_TARGET_DISTRO_VERSION";

pub const SERVICE_BINDING_ROOT: &str = "SERVICE_BINDING_ROOT";
/// Binding root used by platforms predating `SERVICE_BINDING_ROOT`.
pub const LEGACY_BINDINGS: &str = "CNB_BINDINGS";

pub const BP_LOG_LEVEL: &str = "BP_LOG_LEVEL";

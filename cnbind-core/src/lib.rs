//! Phase runner for Cloud Native Buildpacks.
//!
//! Drives one detect, build or generate invocation from process start to
//! exit status: descriptor, API gate, context, user callback, results.
//!
//! # Port traits
//!
//! All I/O a test would fake is behind traits in [`ports`]:
//! - [`EnvPort`](ports::EnvPort): variables, arguments, working directory
//! - [`TomlWritePort`](ports::TomlWritePort): TOML documents
//! - [`EnvWritePort`](ports::EnvWritePort): layer environment directories
//! - [`ExitPort`](ports::ExitPort): process exit
//!
//! [`adapters`] has the process-backed implementations and in-memory fakes.
//!
//! # Entry points
//!
//! - [`run_buildpack`] / [`run_extension`]: `main` for a single binary
//!   dispatched on argv[0]
//! - [`pipeline::run_detect`], [`pipeline::run_build`],
//!   [`pipeline::run_generate`]: one phase with explicit settings and ports

pub mod adapters;
pub mod context;
mod descriptor;
mod dispatch;
mod error;
pub mod exit;
pub mod logging;
pub mod pipeline;
pub mod ports;
pub mod result;
pub mod settings;
pub mod state;

pub use descriptor::Descriptor;
pub use dispatch::{
    Buildpack, Extension, run_buildpack, run_buildpack_with, run_extension, run_extension_with,
};
pub use error::PhaseError;
pub use pipeline::{PhaseOutcome, PhaseRun};

// Re-exported so buildpack authors can depend on this crate alone.
pub use cnbind_api::{ApiVersion, Contract, Negotiated, SupportedRange};
pub use cnbind_layers::{Environment, Layer, LayerError, ModificationMode, Sbom, SbomFormat};
pub use cnbind_platform::{Binding, BindingLayout, PlatformView, TargetInfo};
pub use cnbind_types as types;

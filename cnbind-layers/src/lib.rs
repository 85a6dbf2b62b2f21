//! Layers: model, writers and reconciliation.
//!
//! A build callback receives layers through [`Layers::get`], which reloads
//! whatever metadata an earlier build left behind. After the callback
//! returns, [`Layers::reconcile`] writes the declared layers and removes
//! metadata for layers that were dropped.
//!
//! # Port traits
//!
//! File output goes through [`ports::TomlWritePort`] and
//! [`ports::EnvWritePort`] so callers can substitute fakes;
//! [`ports::FsTomlWriter`] and [`ports::FsEnvWriter`] are the real ones.

mod env;
mod error;
mod layer;
mod layers;
mod name;
pub mod ports;
mod sbom;

pub use env::{Environment, ModificationMode};
pub use error::LayerError;
pub use layer::Layer;
pub use layers::{Layers, ReconcileReport, encode_layer_metadata};
pub use name::validate_layer_name;
pub use sbom::{Sbom, SbomFormat};

/// Files in the layers directory that are never layer metadata.
pub const RESERVED_TOML: [&str; 3] = [
    cnbind_types::files::STORE_TOML,
    cnbind_types::files::LAUNCH_TOML,
    cnbind_types::files::BUILD_TOML,
];

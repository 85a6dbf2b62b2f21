use camino::Utf8PathBuf;
use cnbind_api::ApiError;
use cnbind_layers::LayerError;
use cnbind_platform::PlatformError;
use cnbind_types::wire::WireError;
use thiserror::Error;

use crate::exit;

/// Every way a phase can end in the error state.
#[derive(Debug, Error)]
pub enum PhaseError {
    /// Wrong number of positional arguments, or an unknown entry point.
    #[error("usage: {0}")]
    Usage(String),

    /// A required environment variable or process property is missing.
    #[error("{var}: {reason}")]
    Environment { var: String, reason: String },

    /// The descriptor's API version or the callback's result does not fit
    /// the supported contract.
    #[error("{0}")]
    Configuration(String),

    #[error("decode {path}: {source}")]
    Decode {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{path}: {source:#}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The user callback failed; rendered with its full context chain.
    #[error("{0:#}")]
    Callback(anyhow::Error),
}

impl PhaseError {
    pub fn missing_var(var: &str) -> Self {
        PhaseError::Environment {
            var: var.to_string(),
            reason: "required environment variable is not set".to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        exit::ERROR
    }
}

impl From<ApiError> for PhaseError {
    fn from(err: ApiError) -> Self {
        PhaseError::Configuration(err.to_string())
    }
}

impl From<WireError> for PhaseError {
    fn from(err: WireError) -> Self {
        PhaseError::Configuration(err.to_string())
    }
}

impl From<PlatformError> for PhaseError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Io { path, source } => PhaseError::Io {
                path,
                source: source.into(),
            },
            PlatformError::NotUtf8 { path } => PhaseError::Io {
                path,
                source: anyhow::anyhow!("contents are not valid UTF-8"),
            },
        }
    }
}

impl From<LayerError> for PhaseError {
    fn from(err: LayerError) -> Self {
        match err {
            LayerError::Io { path, source } => PhaseError::Io {
                path,
                source: source.into(),
            },
            LayerError::Decode { path, source } => PhaseError::Decode { path, source },
            LayerError::Encode { path, source } => PhaseError::Io {
                path,
                source: source.into(),
            },
            LayerError::Write { path, source } => PhaseError::Io { path, source },
            other @ (LayerError::InvalidName { .. }
            | LayerError::InvalidEntry { .. }
            | LayerError::Unsupported { .. }
            | LayerError::MetadataNotTable { .. }) => PhaseError::Configuration(other.to_string()),
        }
    }
}

use camino::Utf8PathBuf;
use cnbind_api::Contract;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayerError {
    #[error("invalid layer name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("layer '{layer}': invalid entry '{entry}': {reason}")]
    InvalidEntry {
        layer: String,
        entry: String,
        reason: &'static str,
    },

    #[error("{path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("decode {path}: {source}")]
    Decode {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("encode {path}: {source}")]
    Encode {
        path: Utf8PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("write {path}: {source:#}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("layer '{layer}': {feature} is not supported by the negotiated buildpack API ({contract:?})")]
    Unsupported {
        layer: String,
        feature: &'static str,
        contract: Contract,
    },

    #[error("layer '{layer}': metadata must serialize to a TOML table")]
    MetadataNotTable { layer: String },
}

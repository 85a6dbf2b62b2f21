use serde::{Deserialize, Serialize};

use crate::Metadata;
use crate::layer::{LayerContentMetadata, LayerTypes};

/// Pre-0.6 layer metadata: usage flags at the top level.
///
/// ```toml
/// build = true
/// cache = false
/// launch = true
/// [metadata]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatLayer {
    #[serde(default)]
    pub build: bool,

    #[serde(default)]
    pub cache: bool,

    #[serde(default)]
    pub launch: bool,

    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

/// 0.6+ layer metadata: usage flags nested under `[types]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypedLayer {
    #[serde(default)]
    pub types: TypesTable,

    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypesTable {
    #[serde(default)]
    pub build: bool,

    #[serde(default)]
    pub cache: bool,

    #[serde(default)]
    pub launch: bool,
}

/// Reader that accepts both shapes. A `[types]` table wins over top-level
/// flags when both are present.
#[derive(Debug, Deserialize)]
struct EitherLayer {
    #[serde(default)]
    types: Option<TypesTable>,

    #[serde(default)]
    build: bool,

    #[serde(default)]
    cache: bool,

    #[serde(default)]
    launch: bool,

    #[serde(default)]
    metadata: Metadata,
}

impl FlatLayer {
    pub fn decode(raw: &str) -> Result<LayerContentMetadata, toml::de::Error> {
        toml::from_str::<FlatLayer>(raw).map(Into::into)
    }
}

impl TypedLayer {
    /// Decode a layer file written by any supported API.
    pub fn decode(raw: &str) -> Result<LayerContentMetadata, toml::de::Error> {
        let either: EitherLayer = toml::from_str(raw)?;
        let types = match either.types {
            Some(t) => t.into(),
            None => LayerTypes {
                build: either.build,
                cache: either.cache,
                launch: either.launch,
            },
        };
        Ok(LayerContentMetadata {
            types,
            metadata: either.metadata,
        })
    }
}

impl From<TypesTable> for LayerTypes {
    fn from(t: TypesTable) -> Self {
        LayerTypes {
            build: t.build,
            cache: t.cache,
            launch: t.launch,
        }
    }
}

impl From<&LayerContentMetadata> for FlatLayer {
    fn from(layer: &LayerContentMetadata) -> Self {
        Self {
            build: layer.types.build,
            cache: layer.types.cache,
            launch: layer.types.launch,
            metadata: layer.metadata.clone(),
        }
    }
}

impl From<FlatLayer> for LayerContentMetadata {
    fn from(layer: FlatLayer) -> Self {
        LayerContentMetadata {
            types: LayerTypes {
                build: layer.build,
                cache: layer.cache,
                launch: layer.launch,
            },
            metadata: layer.metadata,
        }
    }
}

impl From<&LayerContentMetadata> for TypedLayer {
    fn from(layer: &LayerContentMetadata) -> Self {
        Self {
            types: TypesTable {
                build: layer.types.build,
                cache: layer.types.cache,
                launch: layer.types.launch,
            },
            metadata: layer.metadata.clone(),
        }
    }
}

impl From<TypedLayer> for LayerContentMetadata {
    fn from(layer: TypedLayer) -> Self {
        LayerContentMetadata {
            types: layer.types.into(),
            metadata: layer.metadata,
        }
    }
}

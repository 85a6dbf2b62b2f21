use crate::Metadata;

/// Usage flags for a layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerTypes {
    pub build: bool,
    pub cache: bool,
    pub launch: bool,
}

impl LayerTypes {
    pub fn is_empty(&self) -> bool {
        !(self.build || self.cache || self.launch)
    }
}

/// Version-neutral contents of `<layers>/<name>.toml`.
///
/// On disk this is either the flat or the `[types]` shape; see
/// [`crate::wire::layer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerContentMetadata {
    pub types: LayerTypes,
    pub metadata: Metadata,
}

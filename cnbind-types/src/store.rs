use crate::Metadata;
use serde::{Deserialize, Serialize};

/// Contents of `store.toml`: metadata that survives across builds even when
/// the layer cache is cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub metadata: Metadata,
}

impl Store {
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}

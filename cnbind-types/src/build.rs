use crate::launch::BomEntry;
use serde::{Deserialize, Serialize};

/// Contents of `build.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Build {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bom: Vec<BomEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmet: Vec<UnmetPlanEntry>,
}

impl Build {
    pub fn is_empty(&self) -> bool {
        self.bom.is_empty() && self.unmet.is_empty()
    }
}

/// A buildpack plan entry the buildpack declined to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmetPlanEntry {
    pub name: String,
}

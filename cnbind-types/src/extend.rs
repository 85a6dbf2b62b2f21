use serde::{Deserialize, Serialize};

/// Contents of `extend-config.toml` produced by an image extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendConfig {
    #[serde(default, skip_serializing_if = "ExtendArgs::is_empty")]
    pub build: ExtendArgs,

    #[serde(default, skip_serializing_if = "ExtendArgs::is_empty")]
    pub run: ExtendArgs,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendArgs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<BuildArg>,
}

/// A Dockerfile `ARG` value passed to the extend step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildArg {
    pub name: String,
    pub value: String,
}

impl ExtendArgs {
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

impl ExtendConfig {
    pub fn is_empty(&self) -> bool {
        self.build.is_empty() && self.run.is_empty()
    }
}

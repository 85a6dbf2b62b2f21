use crate::Metadata;
use serde::{Deserialize, Serialize};

/// Version-neutral model of `launch.toml`.
///
/// This is not serialized directly: processes take a different shape depending
/// on the negotiated API, see [`crate::wire::launch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Launch {
    pub labels: Vec<Label>,
    pub processes: Vec<Process>,
    pub slices: Vec<Slice>,
    pub bom: Vec<BomEntry>,
}

impl Launch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing to write. An empty `Launch` must not produce a `launch.toml`.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
            && self.processes.is_empty()
            && self.slices.is_empty()
            && self.bom.is_empty()
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(Label {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn process(mut self, process: Process) -> Self {
        self.processes.push(process);
        self
    }

    pub fn slice(mut self, slice: Slice) -> Self {
        self.slices.push(slice);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub key: String,
    pub value: String,
}

/// A launch process.
///
/// `command` holds the executable followed by any fixed leading arguments.
/// Older APIs only accept a single command string; the wire layer handles
/// the conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub kind: String,
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub direct: bool,
    pub default: bool,
    pub working_directory: Option<String>,
}

impl Process {
    pub fn new(kind: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            command: vec![command.into()],
            args: Vec::new(),
            direct: false,
            default: false,
            working_directory: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn direct(mut self, direct: bool) -> Self {
        self.direct = direct;
        self
    }

    pub fn default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    pub fn working_directory(mut self, dir: impl Into<String>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Legacy bill-of-materials entry embedded in `launch.toml` / `build.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

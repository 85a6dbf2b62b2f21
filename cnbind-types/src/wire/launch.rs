use serde::{Deserialize, Serialize};

use crate::launch::{BomEntry, Label, Launch, Process, Slice};
use crate::wire::WireError;

/// `launch.toml` parameterized over the process shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchToml<P> {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,

    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub processes: Vec<P>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slices: Vec<Slice>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bom: Vec<BomEntry>,
}

/// Pre-0.9 process: `command` is a single string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringCommandProcess {
    #[serde(rename = "type")]
    pub kind: String,

    pub command: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default)]
    pub direct: bool,

    #[serde(default)]
    pub default: bool,
}

/// 0.9+ process: `command` is an array and `direct` is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArrayCommandProcess {
    #[serde(rename = "type")]
    pub kind: String,

    pub command: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default)]
    pub default: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

impl<P> LaunchToml<P>
where
    P: for<'a> TryFrom<&'a Process, Error = WireError>,
{
    pub fn try_from_launch(launch: &Launch) -> Result<Self, WireError> {
        let processes = launch
            .processes
            .iter()
            .map(P::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            labels: launch.labels.clone(),
            processes,
            slices: launch.slices.clone(),
            bom: launch.bom.clone(),
        })
    }
}

impl<P> From<LaunchToml<P>> for Launch
where
    P: Into<Process>,
{
    fn from(toml: LaunchToml<P>) -> Self {
        Launch {
            labels: toml.labels,
            processes: toml.processes.into_iter().map(Into::into).collect(),
            slices: toml.slices,
            bom: toml.bom,
        }
    }
}

impl TryFrom<&Process> for StringCommandProcess {
    type Error = WireError;

    /// The first command element becomes `command`; any further elements are
    /// prepended to `args`.
    fn try_from(process: &Process) -> Result<Self, Self::Error> {
        let (head, tail) = process
            .command
            .split_first()
            .ok_or_else(|| WireError::EmptyCommand {
                process: process.kind.clone(),
            })?;
        if process.working_directory.is_some() {
            return Err(WireError::UnsupportedField {
                field: "working-dir",
                process: process.kind.clone(),
                shape: "string",
            });
        }
        let mut args = tail.to_vec();
        args.extend(process.args.iter().cloned());
        Ok(Self {
            kind: process.kind.clone(),
            command: head.clone(),
            args,
            direct: process.direct,
            default: process.default,
        })
    }
}

impl TryFrom<&Process> for ArrayCommandProcess {
    type Error = WireError;

    fn try_from(process: &Process) -> Result<Self, Self::Error> {
        if process.command.is_empty() {
            return Err(WireError::EmptyCommand {
                process: process.kind.clone(),
            });
        }
        if process.direct {
            return Err(WireError::UnsupportedField {
                field: "direct",
                process: process.kind.clone(),
                shape: "array",
            });
        }
        Ok(Self {
            kind: process.kind.clone(),
            command: process.command.clone(),
            args: process.args.clone(),
            default: process.default,
            working_dir: process.working_directory.clone(),
        })
    }
}

impl From<StringCommandProcess> for Process {
    fn from(p: StringCommandProcess) -> Self {
        Process {
            kind: p.kind,
            command: vec![p.command],
            args: p.args,
            direct: p.direct,
            default: p.default,
            working_directory: None,
        }
    }
}

impl From<ArrayCommandProcess> for Process {
    fn from(p: ArrayCommandProcess) -> Self {
        Process {
            kind: p.kind,
            command: p.command,
            args: p.args,
            direct: false,
            default: p.default,
            working_directory: p.working_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_shape_folds_extra_command_words_into_args() {
        let mut process = Process::new("web", "node").args(["server.js"]);
        process.command.push("--enable-source-maps".to_string());

        let wire = StringCommandProcess::try_from(&process).expect("convert");
        assert_eq!(wire.command, "node");
        assert_eq!(wire.args, vec!["--enable-source-maps", "server.js"]);
    }

    #[test]
    fn string_shape_rejects_working_directory() {
        let process = Process::new("web", "node").working_directory("/workspace/app");
        let err = StringCommandProcess::try_from(&process).expect_err("must reject");
        assert!(matches!(
            err,
            WireError::UnsupportedField {
                field: "working-dir",
                ..
            }
        ));
    }

    #[test]
    fn array_shape_rejects_direct() {
        let process = Process::new("web", "node").direct(true);
        let err = ArrayCommandProcess::try_from(&process).expect_err("must reject");
        assert!(matches!(err, WireError::UnsupportedField { field: "direct", .. }));
    }

    #[test]
    fn array_shape_serializes_command_as_array_with_working_dir() {
        let launch = Launch::new().process(
            Process::new("web", "node")
                .args(["server.js"])
                .default(true)
                .working_directory("/workspace"),
        );
        let wire = LaunchToml::<ArrayCommandProcess>::try_from_launch(&launch).expect("convert");
        let rendered = toml::to_string(&wire).expect("encode");
        assert!(rendered.contains(r#"command = ["node"]"#));
        assert!(rendered.contains(r#"working-dir = "/workspace""#));
        assert!(!rendered.contains("direct"));
    }

    #[test]
    fn empty_command_is_rejected_by_both_shapes() {
        let mut process = Process::new("worker", "x");
        process.command.clear();
        assert!(StringCommandProcess::try_from(&process).is_err());
        assert!(ArrayCommandProcess::try_from(&process).is_err());
    }
}

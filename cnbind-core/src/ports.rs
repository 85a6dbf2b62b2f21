//! Port traits abstracting process state and file output away from the runner.

use camino::Utf8PathBuf;

pub use cnbind_layers::ports::{EnvWritePort, TomlWritePort};

/// Process environment: variables, arguments and working directory.
pub trait EnvPort {
    fn var(&self, key: &str) -> Option<String>;
    fn args(&self) -> Vec<String>;
    fn current_dir(&self) -> anyhow::Result<Utf8PathBuf>;
}

/// Terminates the phase with a status code.
///
/// The production adapter never returns; fakes record the code.
pub trait ExitPort {
    fn exit(&self, code: i32);
}

/// The full set of collaborators a phase needs.
#[derive(Clone, Copy)]
pub struct Ports<'a> {
    pub env: &'a dyn EnvPort,
    pub toml: &'a dyn TomlWritePort,
    pub env_writer: &'a dyn EnvWritePort,
    pub exit: &'a dyn ExitPort,
}

impl Ports<'static> {
    /// Real process environment, real filesystem, real exit.
    pub fn process() -> Self {
        use crate::adapters::{FsEnvWriter, FsTomlWriter, ProcessEnv, ProcessExit};
        Ports {
            env: &ProcessEnv,
            toml: &FsTomlWriter,
            env_writer: &FsEnvWriter,
            exit: &ProcessExit,
        }
    }
}

impl std::fmt::Debug for Ports<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ports").finish_non_exhaustive()
    }
}

//! Default process-backed port implementations, plus in-memory ones for
//! embedding and testing.

use std::cell::RefCell;
use std::collections::BTreeMap;

use anyhow::Context;
use camino::Utf8PathBuf;

use crate::ports::{EnvPort, ExitPort};

pub use cnbind_layers::ports::{FsEnvWriter, FsTomlWriter};

/// Reads the real process environment.
#[derive(Debug, Clone, Default)]
pub struct ProcessEnv;

impl EnvPort for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn args(&self) -> Vec<String> {
        std::env::args().collect()
    }

    fn current_dir(&self) -> anyhow::Result<Utf8PathBuf> {
        let dir = std::env::current_dir().context("read current directory")?;
        Utf8PathBuf::from_path_buf(dir)
            .map_err(|p| anyhow::anyhow!("current directory {} is not UTF-8", p.display()))
    }
}

/// Exits the process.
#[derive(Debug, Clone, Default)]
pub struct ProcessExit;

impl ExitPort for ProcessExit {
    fn exit(&self, code: i32) {
        std::process::exit(code)
    }
}

/// Fixed environment for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEnv {
    vars: BTreeMap<String, String>,
    args: Vec<String>,
    cwd: Option<Utf8PathBuf>,
}

impl InMemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn without_var(mut self, key: &str) -> Self {
        self.vars.remove(key);
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cwd(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl EnvPort for InMemoryEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn args(&self) -> Vec<String> {
        self.args.clone()
    }

    fn current_dir(&self) -> anyhow::Result<Utf8PathBuf> {
        self.cwd
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no working directory configured"))
    }
}

/// Records exit codes instead of exiting.
#[derive(Debug, Default)]
pub struct RecordingExit {
    codes: RefCell<Vec<i32>>,
}

impl RecordingExit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn codes(&self) -> Vec<i32> {
        self.codes.borrow().clone()
    }

    pub fn last(&self) -> Option<i32> {
        self.codes.borrow().last().copied()
    }
}

impl ExitPort for RecordingExit {
    fn exit(&self, code: i32) {
        self.codes.borrow_mut().push(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_env_reports_missing_cwd() {
        let env = InMemoryEnv::new().with_var("A", "1");
        assert_eq!(env.var("A").as_deref(), Some("1"));
        assert!(env.var("B").is_none());
        assert!(env.current_dir().is_err());
    }

    #[test]
    fn recording_exit_keeps_order() {
        let exit = RecordingExit::new();
        exit.exit(100);
        exit.exit(0);
        assert_eq!(exit.codes(), vec![100, 0]);
        assert_eq!(exit.last(), Some(0));
    }
}

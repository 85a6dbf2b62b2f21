//! Port traits for the two structured writers the reconciler needs.

use anyhow::Context;
use camino::Utf8Path;

use crate::Environment;

/// Writes a TOML document to a file, creating parent directories.
pub trait TomlWritePort {
    fn write_toml(&self, path: &Utf8Path, doc: &toml::Table) -> anyhow::Result<()>;
}

/// Writes an [`Environment`] as one file per entry under `dir`.
pub trait EnvWritePort {
    fn write_env(&self, dir: &Utf8Path, env: &Environment) -> anyhow::Result<()>;
}

/// Filesystem TOML writer.
#[derive(Debug, Clone, Default)]
pub struct FsTomlWriter;

impl TomlWritePort for FsTomlWriter {
    fn write_toml(&self, path: &Utf8Path, doc: &toml::Table) -> anyhow::Result<()> {
        let contents = toml::to_string(doc).with_context(|| format!("serialize {}", path))?;
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs_err::write(path, contents).with_context(|| format!("write {}", path))
    }
}

/// Filesystem environment-directory writer.
#[derive(Debug, Clone, Default)]
pub struct FsEnvWriter;

impl EnvWritePort for FsEnvWriter {
    fn write_env(&self, dir: &Utf8Path, env: &Environment) -> anyhow::Result<()> {
        fs_err::create_dir_all(dir).with_context(|| format!("create_dir_all {}", dir))?;
        for (file_name, contents) in env.files() {
            let path = dir.join(file_name);
            fs_err::write(&path, contents).with_context(|| format!("write {}", path))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn utf8_dir(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 tempdir")
    }

    #[test]
    fn toml_writer_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = utf8_dir(&tmp).join("nested/dir/layer.toml");

        let mut doc = toml::Table::new();
        doc.insert("launch".to_string(), toml::Value::Boolean(true));
        FsTomlWriter.write_toml(&path, &doc).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim(), "launch = true");
    }

    #[test]
    fn env_writer_writes_one_file_per_entry() {
        let tmp = TempDir::new().unwrap();
        let dir = utf8_dir(&tmp).join("env.launch");

        let mut env = Environment::new();
        env.prepend("PATH", "/layers/bin", Some(":"));
        FsEnvWriter.write_env(&dir, &env).unwrap();

        assert_eq!(std::fs::read_to_string(dir.join("PATH.prepend")).unwrap(), "/layers/bin");
        assert_eq!(std::fs::read_to_string(dir.join("PATH.delim")).unwrap(), ":");
    }
}

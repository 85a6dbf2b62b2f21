use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::collections::BTreeMap;
use std::io;
use tracing::{debug, warn};

use crate::PlatformError;

/// A visible directory entry, with symlinks resolved for the type check.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub name: String,
    pub path: Utf8PathBuf,
    pub is_dir: bool,
}

/// List visible entries of `dir`, sorted by name.
///
/// A missing directory is an empty listing. Hidden entries (leading `.`) are
/// skipped, which also drops the `..data` indirection Kubernetes projects
/// into mounted volumes.
pub(crate) fn list_entries(dir: &Utf8Path) -> Result<Vec<Entry>, PlatformError> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %dir, "directory absent, treating as empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(PlatformError::Io {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut out = Vec::new();
    for entry in read {
        let entry = entry.map_err(|source| PlatformError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = match Utf8PathBuf::from_path_buf(entry.path()) {
            Ok(p) => p,
            Err(p) => {
                warn!(path = %p.display(), "skipping non UTF-8 path");
                continue;
            }
        };
        let Some(name) = path.file_name().map(str::to_owned) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let meta = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %path, error = %e, "skipping unreadable entry");
                continue;
            }
        };
        out.push(Entry {
            name,
            path,
            is_dir: meta.is_dir(),
        });
    }

    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

pub(crate) fn read_utf8(path: &Utf8Path) -> Result<String, PlatformError> {
    let bytes = fs::read(path).map_err(|source| PlatformError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| PlatformError::NotUtf8 {
        path: path.to_path_buf(),
    })
}

/// Project a directory of files into a variable mapping.
///
/// Each regular file is one variable named after the file; its contents are
/// the value, byte for byte. Subdirectories are ignored.
pub fn read_env_dir(dir: &Utf8Path) -> Result<BTreeMap<String, String>, PlatformError> {
    let mut env = BTreeMap::new();
    for entry in list_entries(dir)? {
        if entry.is_dir {
            continue;
        }
        let value = read_utf8(&entry.path)?;
        env.insert(entry.name, value);
    }
    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8")
    }

    #[test]
    fn missing_dir_is_empty() {
        let temp = TempDir::new().expect("temp dir");
        let env = read_env_dir(&utf8(&temp).join("env")).expect("read");
        assert!(env.is_empty());
    }

    #[test]
    fn values_are_not_trimmed() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8(&temp);
        std::fs::write(root.join("JAVA_OPTS"), "-Xmx1g\n").unwrap();
        let env = read_env_dir(&root).expect("read");
        assert_eq!(env.get("JAVA_OPTS").map(String::as_str), Some("-Xmx1g\n"));
    }

    #[test]
    fn hidden_files_and_subdirs_are_skipped() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8(&temp);
        std::fs::write(root.join(".hidden"), "x").unwrap();
        std::fs::create_dir(root.join("nested")).unwrap();
        std::fs::write(root.join("nested").join("INNER"), "x").unwrap();
        std::fs::write(root.join("VISIBLE"), "yes").unwrap();

        let env = read_env_dir(&root).expect("read");
        assert_eq!(env.keys().collect::<Vec<_>>(), vec!["VISIBLE"]);
    }
}

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::env_dir::{list_entries, read_utf8};
use crate::{BINDINGS_DIR, PlatformError, vars};

/// Subdirectories understood by the legacy binding layout.
const LEGACY_SUBDIRS: [&str; 2] = ["metadata", "secret"];

/// How binding directories are projected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BindingLayout {
    /// One directory per binding, one file per key. Subdirectories are ignored.
    #[default]
    Flat,
    /// As `Flat`, but files inside `metadata/` and `secret/` subdirectories
    /// are folded into the binding's keys.
    AllowLegacySubdirs,
}

/// A service binding projected from `<root>/<name>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub path: Utf8PathBuf,
    /// Key to trimmed file contents. Includes `type` and `provider` when present.
    pub secret: BTreeMap<String, String>,
}

impl Binding {
    /// The binding's `type`, falling back to the legacy `kind` key.
    pub fn binding_type(&self) -> Option<&str> {
        self.secret
            .get("type")
            .or_else(|| self.secret.get("kind"))
            .map(String::as_str)
    }

    pub fn provider(&self) -> Option<&str> {
        self.secret.get("provider").map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.secret.get(key).map(String::as_str)
    }
}

/// Resolve the bindings root.
///
/// `SERVICE_BINDING_ROOT` wins, then the legacy `CNB_BINDINGS`, then
/// `<platform>/bindings`.
pub fn binding_root(
    platform_dir: &Utf8Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Utf8PathBuf {
    let non_empty = |var: &str| lookup(var).filter(|s| !s.is_empty());
    non_empty(vars::SERVICE_BINDING_ROOT)
        .or_else(|| non_empty(vars::LEGACY_BINDINGS))
        .map(Utf8PathBuf::from)
        .unwrap_or_else(|| platform_dir.join(BINDINGS_DIR))
}

/// Read every binding under `root`, sorted by binding name.
pub fn read_bindings(root: &Utf8Path, layout: BindingLayout) -> Result<Vec<Binding>, PlatformError> {
    let mut bindings = Vec::new();
    for entry in list_entries(root)? {
        if !entry.is_dir {
            continue;
        }
        let secret = read_binding_keys(&entry.path, layout)?;
        debug!(binding = %entry.name, keys = secret.len(), "read binding");
        bindings.push(Binding {
            name: entry.name,
            path: entry.path,
            secret,
        });
    }
    Ok(bindings)
}

fn read_binding_keys(
    dir: &Utf8Path,
    layout: BindingLayout,
) -> Result<BTreeMap<String, String>, PlatformError> {
    let entries = list_entries(dir)?;
    let mut keys = BTreeMap::new();
    for entry in entries.iter().filter(|e| !e.is_dir) {
        keys.insert(entry.name.clone(), read_utf8(&entry.path)?.trim().to_string());
    }
    if layout != BindingLayout::AllowLegacySubdirs {
        return Ok(keys);
    }

    // Top-level files win, then metadata/, then secret/.
    for subdir in LEGACY_SUBDIRS {
        let Some(entry) = entries.iter().find(|e| e.is_dir && e.name == subdir) else {
            continue;
        };
        for inner in list_entries(&entry.path)? {
            if inner.is_dir {
                continue;
            }
            if keys.contains_key(&inner.name) {
                warn!(path = %inner.path, key = %inner.name, "duplicate binding key ignored");
                continue;
            }
            keys.insert(inner.name, read_utf8(&inner.path)?.trim().to_string());
        }
    }
    Ok(keys)
}

use std::collections::BTreeMap;

/// How the lifecycle applies a layer environment file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModificationMode {
    Override,
    Default,
    Append,
    Prepend,
}

impl ModificationMode {
    pub fn suffix(self) -> &'static str {
        match self {
            ModificationMode::Override => "override",
            ModificationMode::Default => "default",
            ModificationMode::Append => "append",
            ModificationMode::Prepend => "prepend",
        }
    }
}

/// One layer environment directory.
///
/// Keys are file names (`NAME.override`, `NAME.append`, `NAME.delim`, ...),
/// values are file contents, so writing is a straight dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment(BTreeMap<String, String>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, mode: ModificationMode, value: impl Into<String>) {
        self.0.insert(format!("{}.{}", name, mode.suffix()), value.into());
    }

    pub fn override_value(&mut self, name: &str, value: impl Into<String>) {
        self.set(name, ModificationMode::Override, value);
    }

    pub fn default_value(&mut self, name: &str, value: impl Into<String>) {
        self.set(name, ModificationMode::Default, value);
    }

    /// Append `value` to `name`. The delimiter file is only written when one is given.
    pub fn append(&mut self, name: &str, value: impl Into<String>, delimiter: Option<&str>) {
        self.set(name, ModificationMode::Append, value);
        self.set_delimiter(name, delimiter);
    }

    pub fn prepend(&mut self, name: &str, value: impl Into<String>, delimiter: Option<&str>) {
        self.set(name, ModificationMode::Prepend, value);
        self.set_delimiter(name, delimiter);
    }

    fn set_delimiter(&mut self, name: &str, delimiter: Option<&str>) {
        if let Some(delim) = delimiter {
            self.0.insert(format!("{}.delim", name), delim.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(file name, contents)` pairs in file-name order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.0.get(file_name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_encode_mode() {
        let mut env = Environment::new();
        env.override_value("JAVA_HOME", "/layers/jdk");
        env.default_value("NODE_ENV", "production");
        env.prepend("PATH", "/layers/node/bin", Some(":"));
        env.append("CFLAGS", "-O2", None);

        let names: Vec<&str> = env.files().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            vec![
                "CFLAGS.append",
                "JAVA_HOME.override",
                "NODE_ENV.default",
                "PATH.delim",
                "PATH.prepend",
            ]
        );
        assert_eq!(env.get("PATH.delim"), Some(":"));
        assert!(env.get("CFLAGS.delim").is_none());
    }
}

use crate::vars;

/// Target the build is running for, from the `CNB_TARGET_*` variables.
///
/// Every field is optional; older platforms set none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetInfo {
    pub os: Option<String>,
    pub arch: Option<String>,
    pub arch_variant: Option<String>,
    pub distro_name: Option<String>,
    pub distro_version: Option<String>,
}

impl TargetInfo {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            os: get(vars::TARGET_OS),
            arch: get(vars::TARGET_ARCH),
            arch_variant: get(vars::TARGET_ARCH_VARIANT),
            distro_name: get(vars::TARGET_DISTRO_NAME),
            distro_version: get(vars::TARGET_DISTRO_VERSION),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_treated_as_unset() {
        let target = TargetInfo::from_lookup(|k| match k {
            vars::TARGET_OS => Some("linux".to_string()),
            vars::TARGET_ARCH => Some(String::new()),
            _ => None,
        });
        assert_eq!(target.os.as_deref(), Some("linux"));
        assert!(target.arch.is_none());
        assert!(!target.is_empty());
        assert!(TargetInfo::from_lookup(|_| None).is_empty());
    }
}

use crate::ApiVersion;

/// Behaviour variant selected by the negotiated API.
///
/// Variants are ordered; each one includes the behaviour changes of the
/// variants before it.
///
/// | variant     | from | change                                              |
/// |-------------|------|-----------------------------------------------------|
/// | `Flat`      | 0.5  | flat layer metadata                                 |
/// | `Typed`     | 0.6  | layer flags under `[types]`                         |
/// | `Sbom`      | 0.7  | SBOM files                                          |
/// | `EnvLayout` | 0.8  | paths come from `CNB_*` variables, not argv         |
/// | `ExecArray` | 0.9  | array commands, `working-dir`, no `direct`/profile.d |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Contract {
    Flat,
    Typed,
    Sbom,
    EnvLayout,
    ExecArray,
}

/// On-disk shape of `<layers>/<name>.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerShape {
    Flat,
    Typed,
}

/// On-disk shape of a process `command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandShape {
    String,
    Array,
}

/// Where a phase learns its directory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSource {
    Arguments,
    Environment,
}

impl Contract {
    pub fn for_version(version: &ApiVersion) -> Self {
        if *version >= ApiVersion::new(0, 9) {
            Contract::ExecArray
        } else if *version >= ApiVersion::new(0, 8) {
            Contract::EnvLayout
        } else if *version >= ApiVersion::new(0, 7) {
            Contract::Sbom
        } else if *version >= ApiVersion::new(0, 6) {
            Contract::Typed
        } else {
            Contract::Flat
        }
    }

    pub fn layer_shape(self) -> LayerShape {
        if self >= Contract::Typed {
            LayerShape::Typed
        } else {
            LayerShape::Flat
        }
    }

    pub fn command_shape(self) -> CommandShape {
        if self >= Contract::ExecArray {
            CommandShape::Array
        } else {
            CommandShape::String
        }
    }

    pub fn layout_source(self) -> LayoutSource {
        if self >= Contract::EnvLayout {
            LayoutSource::Environment
        } else {
            LayoutSource::Arguments
        }
    }

    pub fn supports_sbom(self) -> bool {
        self >= Contract::Sbom
    }

    pub fn supports_profile_d(self) -> bool {
        self < Contract::ExecArray
    }

    /// Image extensions only exist for env-layout APIs.
    pub fn supports_generate(self) -> bool {
        self >= Contract::EnvLayout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn thresholds_select_expected_variant() {
        let cases = [
            ((0, 5), Contract::Flat),
            ((0, 6), Contract::Typed),
            ((0, 7), Contract::Sbom),
            ((0, 8), Contract::EnvLayout),
            ((0, 9), Contract::ExecArray),
            ((0, 10), Contract::ExecArray),
        ];
        for ((major, minor), expected) in cases {
            assert_eq!(
                Contract::for_version(&ApiVersion::new(major, minor)),
                expected,
                "{}.{}",
                major,
                minor
            );
        }
    }

    #[test]
    fn behaviour_switches_follow_the_ordering() {
        assert_eq!(Contract::Flat.layer_shape(), LayerShape::Flat);
        assert_eq!(Contract::Typed.layer_shape(), LayerShape::Typed);
        assert!(!Contract::Typed.supports_sbom());
        assert!(Contract::Sbom.supports_sbom());
        assert_eq!(Contract::Sbom.layout_source(), LayoutSource::Arguments);
        assert_eq!(Contract::EnvLayout.layout_source(), LayoutSource::Environment);
        assert_eq!(Contract::EnvLayout.command_shape(), CommandShape::String);
        assert_eq!(Contract::ExecArray.command_shape(), CommandShape::Array);
        assert!(Contract::EnvLayout.supports_profile_d());
        assert!(!Contract::ExecArray.supports_profile_d());
        assert!(!Contract::Sbom.supports_generate());
    }
}

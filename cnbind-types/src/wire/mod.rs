//! API-version-specific on-disk shapes.
//!
//! Each shape converts to and from the version-neutral model at the crate
//! root. Picking the right shape for a given API is the caller's job.

pub mod launch;
pub mod layer;

pub use launch::{ArrayCommandProcess, LaunchToml, StringCommandProcess};
pub use layer::{FlatLayer, TypedLayer};

/// Errors emitted while converting internal models to wire models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    EmptyCommand {
        process: String,
    },
    UnsupportedField {
        field: &'static str,
        process: String,
        shape: &'static str,
    },
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireError::EmptyCommand { process } => {
                write!(f, "process '{}' has an empty command", process)
            }
            WireError::UnsupportedField {
                field,
                process,
                shape,
            } => write!(
                f,
                "process '{}' sets '{}', which is not supported by {} process commands",
                process, field, shape
            ),
        }
    }
}

impl std::error::Error for WireError {}

#[cfg(test)]
mod tests {
    use super::WireError;

    #[test]
    fn wire_error_display_names_process_and_field() {
        let err = WireError::UnsupportedField {
            field: "direct",
            process: "web".to_string(),
            shape: "array",
        };
        assert_eq!(
            err.to_string(),
            "process 'web' sets 'direct', which is not supported by array process commands"
        );
    }
}

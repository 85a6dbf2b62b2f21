use crate::LayerError;

const RESERVED: [&str; 3] = ["launch", "build", "store"];

/// A layer name must be usable both as a directory name and as the stem of
/// `<name>.toml` next to the reserved lifecycle files.
pub fn validate_layer_name(name: &str) -> Result<(), LayerError> {
    let reason = segment_problem(name).or_else(|| {
        RESERVED
            .contains(&name)
            .then_some("is reserved by the lifecycle")
    });

    match reason {
        Some(reason) => Err(LayerError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Check a name that becomes one path component inside a layer: an env
/// file, a process type, a profile.d script or an exec.d executable.
pub(crate) fn validate_entry(layer: &str, entry: &str) -> Result<(), LayerError> {
    match segment_problem(entry) {
        Some(reason) => Err(LayerError::InvalidEntry {
            layer: layer.to_string(),
            entry: entry.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn segment_problem(segment: &str) -> Option<&'static str> {
    if segment.is_empty() {
        Some("must not be empty")
    } else if segment == "." || segment == ".." {
        Some("must not be a relative path component")
    } else if segment.contains('/') || segment.contains('\\') {
        Some("must not contain path separators")
    } else if segment.contains('\0') {
        Some("must not contain NUL")
    } else {
        None
    }
}

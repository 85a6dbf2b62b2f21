use thiserror::Error;

use crate::{ApiVersion, SupportedRange};

/// Gate failures. All of them are configuration errors from the phase's
/// point of view and none are retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("buildpack API version '{raw}' cannot be parsed: {source}")]
    Unparseable {
        raw: String,
        #[source]
        source: semver::Error,
    },

    #[error("{}", unsupported_message(version, range))]
    Unsupported {
        version: ApiVersion,
        range: SupportedRange,
    },

    #[error("invalid supported API range: {min} is greater than {max}")]
    InvalidRange { min: ApiVersion, max: ApiVersion },
}

fn unsupported_message(version: &ApiVersion, range: &SupportedRange) -> String {
    if range.is_single() {
        format!(
            "buildpack API version {} is not supported: this library only supports {}",
            version, range
        )
    } else {
        format!(
            "buildpack API version {} is not supported: supported versions are {}",
            version, range
        )
    }
}

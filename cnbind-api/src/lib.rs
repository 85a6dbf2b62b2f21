//! Buildpack API compatibility gate.
//!
//! A phase starts by reading the `api` declared in its descriptor. This crate
//! parses it, checks it against the range the library implements, and
//! resolves the [`Contract`] that every later serialization step consults.
//! The contract is resolved exactly once per invocation.

mod contract;
mod error;
mod version;

pub use contract::{CommandShape, Contract, LayerShape, LayoutSource};
pub use error::ApiError;
pub use version::{ApiVersion, SupportedRange};

use tracing::debug;

/// Result of a successful gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    pub version: ApiVersion,
    pub contract: Contract,
}

/// Parse `raw` and check it against `range`.
///
/// Both failure modes are fatal for the phase: the caller must not build a
/// context or invoke user code after an error here.
pub fn check_compatibility(raw: &str, range: &SupportedRange) -> Result<Negotiated, ApiError> {
    let version = ApiVersion::parse(raw)?;
    if !range.contains(&version) {
        return Err(ApiError::Unsupported {
            version,
            range: range.clone(),
        });
    }
    let contract = Contract::for_version(&version);
    debug!(%version, ?contract, "buildpack API accepted");
    Ok(Negotiated { version, contract })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepts_both_ends_of_default_range() {
        let range = SupportedRange::default();
        assert!(check_compatibility("0.5", &range).is_ok());
        assert!(check_compatibility("0.10", &range).is_ok());
        assert!(check_compatibility("0.10.0", &range).is_ok());
    }

    #[test]
    fn rejects_one_patch_outside_range() {
        let range = SupportedRange::default();
        let above = check_compatibility("0.10.1", &range).expect_err("above max");
        assert!(matches!(above, ApiError::Unsupported { .. }));
        assert!(above.to_string().contains("0.5 through 0.10"));

        let below = check_compatibility("0.4.9", &range).expect_err("below min");
        assert!(below.to_string().contains("0.5 through 0.10"));
    }

    #[test]
    fn single_version_range_names_exact_version() {
        let range = SupportedRange::new(ApiVersion::new(0, 9), ApiVersion::new(0, 9)).unwrap();
        let err = check_compatibility("0.8", &range).expect_err("out of range");
        assert_eq!(
            err.to_string(),
            "buildpack API version 0.8 is not supported: this library only supports 0.9"
        );
    }

    #[test]
    fn unparseable_version_is_reported_as_such() {
        let err = check_compatibility("latest", &SupportedRange::default()).expect_err("bad");
        assert!(matches!(err, ApiError::Unparseable { .. }));
        assert!(err.to_string().contains("cannot be parsed"));
    }

    #[test]
    fn negotiated_contract_tracks_version() {
        let n = check_compatibility("0.8", &SupportedRange::default()).unwrap();
        assert_eq!(n.contract, Contract::EnvLayout);
        assert_eq!(n.version, ApiVersion::new(0, 8));
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ApiError;

/// A buildpack API version.
///
/// Descriptors normally write `major.minor`; that form is normalised to
/// `major.minor.0`. Full semver strings are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion(semver::Version);

impl ApiVersion {
    pub const fn new(major: u64, minor: u64) -> Self {
        Self(semver::Version::new(major, minor, 0))
    }

    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let trimmed = raw.trim();
        let normalised = if trimmed.split('.').count() == 2 {
            format!("{}.0", trimmed)
        } else {
            trimmed.to_string()
        };
        semver::Version::parse(&normalised)
            .map(Self)
            .map_err(|source| ApiError::Unparseable {
                raw: raw.to_string(),
                source,
            })
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = &self.0;
        if v.patch == 0 && v.pre.is_empty() && v.build.is_empty() {
            write!(f, "{}.{}", v.major, v.minor)
        } else {
            write!(f, "{}", v)
        }
    }
}

impl std::str::FromStr for ApiVersion {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ApiVersion {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ApiVersion> for String {
    fn from(v: ApiVersion) -> Self {
        v.to_string()
    }
}

/// Inclusive `[min, max]` range of API versions the library implements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedRange {
    min: ApiVersion,
    max: ApiVersion,
}

impl SupportedRange {
    pub const DEFAULT_MIN: ApiVersion = ApiVersion::new(0, 5);
    pub const DEFAULT_MAX: ApiVersion = ApiVersion::new(0, 10);

    pub fn new(min: ApiVersion, max: ApiVersion) -> Result<Self, ApiError> {
        if min > max {
            return Err(ApiError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> &ApiVersion {
        &self.min
    }

    pub fn max(&self) -> &ApiVersion {
        &self.max
    }

    pub fn contains(&self, version: &ApiVersion) -> bool {
        &self.min <= version && version <= &self.max
    }

    /// Whether the range admits exactly one version.
    pub fn is_single(&self) -> bool {
        self.min == self.max
    }
}

impl Default for SupportedRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

impl fmt::Display for SupportedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{} through {}", self.min, self.max)
        }
    }
}

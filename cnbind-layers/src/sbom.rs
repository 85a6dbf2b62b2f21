/// SBOM document formats understood by the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SbomFormat {
    CycloneDxJson,
    SpdxJson,
    SyftJson,
}

impl SbomFormat {
    pub fn media_type(self) -> &'static str {
        match self {
            SbomFormat::CycloneDxJson => "application/vnd.cyclonedx+json",
            SbomFormat::SpdxJson => "application/spdx+json",
            SbomFormat::SyftJson => "application/vnd.syft+json",
        }
    }

    /// File extension used after `.sbom.`.
    pub fn extension(self) -> &'static str {
        match self {
            SbomFormat::CycloneDxJson => "cdx.json",
            SbomFormat::SpdxJson => "spdx.json",
            SbomFormat::SyftJson => "syft.json",
        }
    }

    pub fn from_media_type(media_type: &str) -> Option<Self> {
        [Self::CycloneDxJson, Self::SpdxJson, Self::SyftJson]
            .into_iter()
            .find(|f| f.media_type() == media_type)
    }

    /// File name for an SBOM attached to `owner` (a layer name, `launch` or `build`).
    pub fn file_name(self, owner: &str) -> String {
        format!("{}.sbom.{}", owner, self.extension())
    }
}

/// An SBOM document produced by the buildpack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sbom {
    pub format: SbomFormat,
    pub content: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_round_trips() {
        for format in [SbomFormat::CycloneDxJson, SbomFormat::SpdxJson, SbomFormat::SyftJson] {
            assert_eq!(SbomFormat::from_media_type(format.media_type()), Some(format));
        }
        assert_eq!(SbomFormat::from_media_type("text/plain"), None);
    }

    #[test]
    fn file_name_uses_owner_and_extension() {
        assert_eq!(SbomFormat::SpdxJson.file_name("node"), "node.sbom.spdx.json");
        assert_eq!(SbomFormat::CycloneDxJson.file_name("launch"), "launch.sbom.cdx.json");
    }
}

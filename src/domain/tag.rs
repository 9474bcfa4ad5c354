use crate::error::{ReleaseError, Result};

/// Which of the two release tags to work with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<version>rc<rc_version>`, created on every run
    Candidate,
    /// Bare `<version>`, created only on promotion
    Final,
}

/// The version pair entered by the operator.
///
/// Both parts are opaque strings; the only requirement is that they are
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    pub version: String,
    pub rc_version: String,
}

impl ReleaseVersion {
    pub fn new(version: impl Into<String>, rc_version: impl Into<String>) -> Result<Self> {
        let version = version.into().trim().to_string();
        let rc_version = rc_version.into().trim().to_string();

        if version.is_empty() {
            return Err(ReleaseError::invalid_input("version must not be empty"));
        }
        if rc_version.is_empty() {
            return Err(ReleaseError::invalid_input("rc version must not be empty"));
        }

        Ok(ReleaseVersion {
            version,
            rc_version,
        })
    }

    /// Example: version="2.0", rc_version="1" -> "2.0rc1"
    pub fn candidate_tag(&self) -> String {
        format!("{}rc{}", self.version, self.rc_version)
    }

    pub fn final_tag(&self) -> String {
        self.version.clone()
    }

    pub fn tag(&self, kind: TagKind) -> String {
        match kind {
            TagKind::Candidate => self.candidate_tag(),
            TagKind::Final => self.final_tag(),
        }
    }

    /// Both tag names this release would create.
    pub fn tag_names(&self) -> [String; 2] {
        [self.candidate_tag(), self.final_tag()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_tag() {
        let release = ReleaseVersion::new("2.0", "1").unwrap();
        assert_eq!(release.candidate_tag(), "2.0rc1");
        assert_eq!(release.tag(TagKind::Candidate), "2.0rc1");
    }

    #[test]
    fn test_final_tag() {
        let release = ReleaseVersion::new("2.0", "1").unwrap();
        assert_eq!(release.tag(TagKind::Final), "2.0");
    }

    #[test]
    fn test_any_non_empty_string_is_accepted() {
        let release = ReleaseVersion::new("spring-release", "beta").unwrap();
        assert_eq!(release.candidate_tag(), "spring-releasercbeta");
    }

    #[test]
    fn test_input_is_trimmed() {
        let release = ReleaseVersion::new(" 3.1\n", "2 ").unwrap();
        assert_eq!(release.tag_names(), ["3.1rc2".to_string(), "3.1".to_string()]);
    }

    #[test]
    fn test_empty_parts_are_rejected() {
        assert!(ReleaseVersion::new("", "1").is_err());
        assert!(ReleaseVersion::new("1.0", "   ").is_err());
    }
}

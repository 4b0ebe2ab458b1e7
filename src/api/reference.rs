// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};

use std::fmt::Display;
use std::str::FromStr;

/// A parsed image reference.
///
/// Built from a `docker://` URI. The namespace falls back to the
/// registry's `library` prefix and the tag to `latest`, so
/// `docker://alpine` and `docker://library/alpine:latest` name the
/// same image. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    namespace: String,
    repository: String,
    tag: String,
}

impl Reference {
    const SCHEME: &'static str = "docker://";
    const DEFAULT_NAMESPACE: &'static str = "library";
    const DEFAULT_TAG: &'static str = "latest";

    pub fn parse(uri: &str) -> Result<Self> {
        let invalid = || Error::InvalidReference(uri.into());

        let mut rest = uri.strip_prefix(Self::SCHEME).ok_or_else(invalid)?;

        // Split off the tag, if any. A colon only counts after the
        // last path separator.
        let sep = rest.rfind('/').unwrap_or_default();
        let lbl = rest.rfind(':').unwrap_or_default();
        let mut tag = Self::DEFAULT_TAG;
        if lbl > sep {
            let (lhs, rhs) = rest.split_at(lbl);
            rest = lhs;
            tag = &rhs[1..];
        }

        let (namespace, repository) = match rest.split_once('/') {
            None => (Self::DEFAULT_NAMESPACE, rest),
            Some((ns, repo)) if !repo.contains('/') => (ns, repo),
            Some(..) => return Err(invalid()),
        };

        if namespace.is_empty() || repository.is_empty() || tag.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            namespace: namespace.into(),
            repository: repository.into(),
            tag: tag.into(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The `namespace/repository` path used in registry URLs.
    pub fn path(&self) -> String {
        format!("{}/{}", self.namespace(), self.repository())
    }
}

impl FromStr for Reference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}:{}", self.namespace, self.repository, self.tag)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_full_reference() {
        let reference = Reference::parse("docker://library/alpine:3.2").unwrap();
        assert_eq!(reference.namespace(), "library");
        assert_eq!(reference.repository(), "alpine");
        assert_eq!(reference.tag(), "3.2");
    }

    #[test]
    fn defaults_namespace_and_tag() {
        let reference = Reference::parse("docker://alpine").unwrap();
        assert_eq!(reference.namespace(), "library");
        assert_eq!(reference.repository(), "alpine");
        assert_eq!(reference.tag(), "latest");
    }

    #[test]
    fn display_round_trips() {
        let uri = "docker://sylabs/lolcow:1.0";
        let reference = Reference::parse(uri).unwrap();
        assert_eq!(reference.to_string(), "sylabs/lolcow:1.0");

        let again = Reference::parse(&format!("docker://{}", reference)).unwrap();
        assert_eq!(again, reference);
    }

    #[test]
    fn rejects_malformed() {
        for uri in [
            "library/alpine",
            "http://library/alpine",
            "docker://",
            "docker:///alpine",
            "docker://library/",
            "docker://alpine:",
            "docker://a/b/c",
        ] {
            assert!(
                matches!(Reference::parse(uri), Err(Error::InvalidReference(..))),
                "accepted {:?}",
                uri
            );
        }
    }
}

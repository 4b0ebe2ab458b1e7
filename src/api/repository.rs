use super::Reference;
use crate::error::{Error, Result};

use std::fmt::Display;

use serde::Deserialize;

/// One repository on one registry host.
///
/// Holds the transport agent, the host (a caller-supplied override or
/// the public default), and the caller-supplied authorization header.
/// Credentials are plain per-instance data, never negotiated with the
/// registry and never global, so concurrent pulls with different
/// credentials cannot interfere.
#[derive(Clone)]
pub struct Repository {
    agent: ureq::Agent,
    host: String,
    path: String,
    auth: Option<String>,
}

impl Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.host, self.path)
    }
}

impl Repository {
    const DEFAULT_REGISTRY: &'static str = "registry.hub.docker.com";

    pub fn new(reference: &Reference, registry: Option<&str>, auth: Option<&str>) -> Self {
        let host = registry
            .unwrap_or(Self::DEFAULT_REGISTRY)
            .trim_end_matches('/');

        Self {
            agent: ureq::AgentBuilder::new().build(),
            host: host.into(),
            path: reference.path(),
            auth: auth.map(String::from),
        }
    }

    /// An authenticated GET below this repository's `/v2` prefix.
    pub(crate) fn get(&self, path: &str) -> Result<ureq::Response> {
        let url = format!("https://{}/v2/{}/{}", self.host, self.path, path);

        let mut req = self.agent.get(&url);
        if let Some(auth) = &self.auth {
            req = req.set("Authorization", auth);
        }

        match req.call() {
            Ok(rep) => Ok(rep),
            Err(ureq::Error::Status(401 | 403, ..)) => Err(Error::Auth(self.to_string())),
            Err(ureq::Error::Status(404, ..)) => Err(Error::NotFound(url)),
            Err(err) => Err(Error::Network(err.to_string())),
        }
    }

    /// Lists the repository's tags.
    pub fn tags(&self) -> Result<Vec<String>> {
        #[derive(Debug, Deserialize)]
        struct Tags {
            tags: Vec<String>,
        }

        let rep = self.get("tags/list")?;
        let tags: Tags = rep
            .into_json()
            .map_err(|err| Error::Network(err.to_string()))?;

        Ok(tags.tags)
    }
}

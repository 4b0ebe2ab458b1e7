// SPDX-License-Identifier: Apache-2.0

//! Wire shapes for the registry's schema 1 manifest
//!
//! The manifest lists layer blobs (`fsLayers`) and build history
//! entries side by side, both newest-first. Each history entry embeds
//! a JSON document in its `v1Compatibility` string; the interesting
//! part of that document is the per-step image configuration.

mod digest;

pub use self::digest::LayerId;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct FsLayer {
    #[serde(rename = "blobSum")]
    pub blob_sum: LayerId,
}

#[derive(Clone, Debug, Deserialize)]
pub struct History {
    #[serde(rename = "v1Compatibility")]
    pub v1_compatibility: String,
}

/// The optional startup configuration embedded in a history entry.
///
/// `Env` keeps the wire encoding: one `KEY=VALUE` string per entry.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConfigBlob {
    #[serde(rename = "Entrypoint")]
    pub entrypoint: Option<Vec<String>>,

    #[serde(rename = "Cmd")]
    pub cmd: Option<Vec<String>>,

    #[serde(rename = "Env")]
    pub env: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct V1Compatibility {
    #[serde(default)]
    config: Option<ConfigBlob>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Manifest {
    #[serde(rename = "schemaVersion")]
    pub schema_version: usize,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub tag: Option<String>,

    #[serde(rename = "fsLayers")]
    pub layers: Vec<FsLayer>,

    #[serde(default)]
    pub history: Vec<History>,
}

impl Manifest {
    /// Confirms the layer and history lists line up.
    pub fn check(&self) -> Result<(), String> {
        if self.layers.len() != self.history.len() {
            return Err(format!(
                "{} layers but {} history entries",
                self.layers.len(),
                self.history.len()
            ));
        }

        Ok(())
    }

    /// Decodes the topmost history entry's embedded configuration.
    ///
    /// History is newest-first, so the first entry carries the final
    /// build step and overrides everything below it.
    pub fn config(&self) -> Result<ConfigBlob, serde_json::Error> {
        let entry = match self.history.first() {
            Some(entry) => entry,
            None => return Ok(ConfigBlob::default()),
        };

        let compat: V1Compatibility = serde_json::from_str(&entry.v1_compatibility)?;
        Ok(compat.config.unwrap_or_default())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const MANIFEST: &str = r#"{
        "schemaVersion": 1,
        "name": "library/alpine",
        "tag": "3.2",
        "fsLayers": [
            {"blobSum": "sha256:bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"},
            {"blobSum": "sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"}
        ],
        "history": [
            {"v1Compatibility": "{\"config\":{\"Entrypoint\":[\"/bin/sh\"],\"Env\":[\"PATH=/usr/bin:/bin\"]}}"},
            {"v1Compatibility": "{\"config\":{\"Entrypoint\":[\"/bin/old\"],\"Cmd\":[\"stale\"]}}"}
        ]
    }"#;

    #[test]
    fn decodes_schema1() {
        let manifest: Manifest = serde_json::from_str(MANIFEST).unwrap();
        assert_eq!(manifest.schema_version, 1);
        assert_eq!(manifest.layers.len(), 2);
        assert!(manifest.check().is_ok());
        assert!(manifest.layers[0].blob_sum.hex().starts_with("bbbb"));
    }

    #[test]
    fn topmost_config_wins() {
        let manifest: Manifest = serde_json::from_str(MANIFEST).unwrap();
        let config = manifest.config().unwrap();
        assert_eq!(config.entrypoint.unwrap(), vec!["/bin/sh"]);
        assert_eq!(config.cmd, None);
        assert_eq!(config.env.unwrap(), vec!["PATH=/usr/bin:/bin"]);
    }

    #[test]
    fn empty_history_yields_no_config() {
        let manifest: Manifest =
            serde_json::from_str(r#"{"schemaVersion": 1, "fsLayers": [], "history": []}"#).unwrap();
        let config = manifest.config().unwrap();
        assert_eq!(config.entrypoint, None);
        assert_eq!(config.cmd, None);
    }

    #[test]
    fn mismatched_history_fails_check() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "schemaVersion": 1,
                "fsLayers": [{"blobSum": "sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"}],
                "history": []
            }"#,
        )
        .unwrap();
        assert!(manifest.check().is_err());
    }

    #[test]
    fn config_without_blob_is_empty() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "schemaVersion": 1,
                "fsLayers": [{"blobSum": "sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"}],
                "history": [{"v1Compatibility": "{\"id\":\"aaaa\"}"}]
            }"#,
        )
        .unwrap();
        let config = manifest.config().unwrap();
        assert_eq!(config.entrypoint, None);
        assert_eq!(config.cmd, None);
        assert_eq!(config.env, None);
    }
}

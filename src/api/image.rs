// SPDX-License-Identifier: Apache-2.0

use super::{Reference, Repository};
use crate::error::{Error, Result};
use crate::formats::{LayerId, Manifest};

/// A manifest bound to the reference it was fetched for.
#[derive(Clone, Debug)]
pub struct Image {
    reference: Reference,
    manifest: Manifest,
}

impl Image {
    pub fn new(reference: Reference, manifest: Manifest) -> Self {
        Self {
            reference,
            manifest,
        }
    }

    /// Fetches and decodes the manifest for `reference`.
    pub fn fetch(repo: &Repository, reference: &Reference) -> Result<Self> {
        let path = format!("manifests/{}", reference.tag());
        let rep = repo.get(&path)?;

        let manifest: Manifest = rep
            .into_json()
            .map_err(|err| Error::ManifestParse(reference.to_string(), err.to_string()))?;

        manifest
            .check()
            .map_err(|detail| Error::ManifestParse(reference.to_string(), detail))?;

        Ok(Self::new(reference.clone(), manifest))
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Layer ids in extraction order, base layer first.
    ///
    /// The wire lists `fsLayers` newest-first, so the listing is
    /// reversed here. One id per manifest layer, duplicates included.
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.manifest
            .layers
            .iter()
            .rev()
            .map(|layer| layer.blob_sum.clone())
            .collect()
    }

    /// The image's startup argv.
    ///
    /// Reads the topmost config blob; `use_cmd` selects `Cmd`,
    /// otherwise `Entrypoint`. There is no fallback between the two:
    /// an absent or empty selected field means the image has no
    /// default startup command, which is a valid outcome.
    pub fn startup_command(&self, use_cmd: bool) -> Result<Option<Vec<String>>> {
        let config = self
            .manifest
            .config()
            .map_err(|err| Error::ManifestParse(self.reference.to_string(), err.to_string()))?;

        let argv = if use_cmd {
            config.cmd
        } else {
            config.entrypoint
        };

        Ok(argv.filter(|argv| !argv.is_empty()))
    }

    /// The topmost config blob's environment, as `KEY=VALUE` strings.
    pub fn environment(&self) -> Result<Vec<String>> {
        let config = self
            .manifest
            .config()
            .map_err(|err| Error::ManifestParse(self.reference.to_string(), err.to_string()))?;

        Ok(config.env.unwrap_or_default())
    }
}

// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Errors surfaced by the image acquisition pipeline.
///
/// Every variant is fatal to the run that produced it: the pipeline
/// halts at the first error and the variant names the step that
/// failed. An image without a startup command is not an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid image reference: {0:?}")]
    InvalidReference(String),

    #[error("registry refused authorization for {0}")]
    Auth(String),

    #[error("not found in registry: {0}")]
    NotFound(String),

    #[error("registry request failed: {0}")]
    Network(String),

    #[error("cannot decode manifest for {0}: {1}")]
    ManifestParse(String, String),

    #[error("download of layer {id} failed: {reason}")]
    Download { id: String, reason: String },

    #[error("extraction of {archive:?} failed")]
    Extraction {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write runscript at {path:?}")]
    Runscript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache operation on {path:?} failed")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

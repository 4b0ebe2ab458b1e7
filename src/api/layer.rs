// SPDX-License-Identifier: Apache-2.0

use super::Repository;
use crate::cache::Entry;
use crate::error::{Error, Result};
use crate::formats::LayerId;

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

use indicatif::ProgressBar;

/// Downloads one layer blob into its cache slot.
pub struct Layer<'a> {
    repo: &'a Repository,
    id: &'a LayerId,
}

impl<'a> Layer<'a> {
    pub fn new(repo: &'a Repository, id: &'a LayerId) -> Self {
        Self { repo, id }
    }

    /// Streams the blob into `entry` and returns the final path.
    ///
    /// Bytes land in a `.partial` sibling first and are renamed into
    /// place only after the digest checks out, so a concurrent reader
    /// sees either no file or a complete one, never a truncated
    /// archive. Nothing is left at the partial path on failure.
    pub fn fetch(&self, entry: &Entry, progress: &ProgressBar) -> Result<PathBuf> {
        let partial = entry.partial();

        let result = self.stream(&partial, progress);
        if result.is_err() {
            let _ = std::fs::remove_file(&partial);
            return result.map(|_| entry.path.clone());
        }

        std::fs::rename(&partial, &entry.path).map_err(|err| self.failed(err.to_string()))?;
        Ok(entry.path.clone())
    }

    fn stream(&self, partial: &std::path::Path, progress: &ProgressBar) -> Result<()> {
        let path = format!("blobs/{}", self.id);
        let rep = self
            .repo
            .get(&path)
            .map_err(|err| self.failed(err.to_string()))?;

        if let Some(len) = rep.header("Content-Length").and_then(|s| s.parse().ok()) {
            progress.inc_length(len);
        }

        let mut src = progress.wrap_read(rep.into_reader());
        let mut dst = File::create(partial).map_err(|err| self.failed(err.to_string()))?;
        let mut verifier = self.id.verifier();

        let mut buf = [0u8; 65536];
        loop {
            let n = src.read(&mut buf).map_err(|err| self.failed(err.to_string()))?;
            if n == 0 {
                break;
            }

            verifier.update(&buf[..n]);
            dst.write_all(&buf[..n])
                .map_err(|err| self.failed(err.to_string()))?;
        }

        if !verifier.matches() {
            return Err(self.failed("content digest mismatch".into()));
        }

        Ok(())
    }

    fn failed(&self, reason: String) -> Error {
        Error::Download {
            id: self.id.to_string(),
            reason,
        }
    }
}

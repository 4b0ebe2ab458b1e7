// SPDX-License-Identifier: Apache-2.0

//! The on-disk layer cache
//!
//! Downloaded layer archives live at `<base>/<layer-hex>.tar.gz`. The
//! base is resolved once per run and then carried through the pipeline
//! result, so the cleanup step consumes the same value acquisition
//! used instead of recomputing it.

use crate::error::{Error, Result};
use crate::formats::LayerId;

use std::env;
use std::path::{Path, PathBuf};

/// Overrides the persistent cache base directory.
pub const ENV_BASE: &str = "BURROW_CACHE_DIR";

/// A resolved cache base.
///
/// An ephemeral cache lives in a fresh temporary directory and must
/// not outlive the run that created it; a persistent one is shared
/// across runs and across images.
#[derive(Clone, Debug)]
pub struct Cache {
    base: PathBuf,
    ephemeral: bool,
}

impl Cache {
    /// Resolves the cache base for `subsystem`.
    ///
    /// With `disable` set the cache is a throwaway temporary
    /// directory; otherwise `$BURROW_CACHE_DIR`, `$XDG_CACHE_HOME`,
    /// or `~/.cache` decide where layers persist.
    pub fn resolve(subsystem: &str, disable: bool) -> Result<Self> {
        if disable {
            let dir = tempfile::Builder::new()
                .prefix(&format!("burrow-{}-", subsystem))
                .tempdir()
                .map_err(|err| Error::Cache {
                    path: env::temp_dir(),
                    source: err,
                })?;

            return Ok(Self::at(dir.into_path(), true));
        }

        let base = match env::var_os(ENV_BASE) {
            Some(dir) => PathBuf::from(dir),
            None => match env::var_os("XDG_CACHE_HOME") {
                Some(dir) => PathBuf::from(dir).join("burrow"),
                None => match env::var_os("HOME") {
                    Some(home) => PathBuf::from(home).join(".cache").join("burrow"),
                    None => {
                        return Err(Error::Cache {
                            path: PathBuf::from("~"),
                            source: std::io::Error::new(
                                std::io::ErrorKind::NotFound,
                                "no home directory",
                            ),
                        })
                    }
                },
            },
        };

        let base = base.join(subsystem);
        std::fs::create_dir_all(&base).map_err(|err| Error::Cache {
            path: base.clone(),
            source: err,
        })?;

        Ok(Self::at(base, false))
    }

    /// Uses `base` as-is. The directory must already exist.
    pub fn at(base: PathBuf, ephemeral: bool) -> Self {
        Self { base, ephemeral }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// The cache slot for one layer id. Pure; no I/O.
    pub fn entry(&self, id: &LayerId) -> Entry {
        Entry {
            path: self.base.join(format!("{}.tar.gz", id.hex())),
            id: id.clone(),
        }
    }

    /// Removes the whole base recursively.
    ///
    /// Only meaningful for an ephemeral cache: purging a persistent
    /// base would destroy entries belonging to other images.
    pub fn purge(&self) -> Result<()> {
        std::fs::remove_dir_all(&self.base).map_err(|err| Error::Cache {
            path: self.base.clone(),
            source: err,
        })
    }
}

/// One layer's slot in the cache.
#[derive(Clone, Debug)]
pub struct Entry {
    pub id: LayerId,
    pub path: PathBuf,
}

impl Entry {
    /// Whether a cached copy is already present.
    ///
    /// Presence only: a corrupted or truncated file at the path is
    /// indistinguishable from a valid one and will be used as-is.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Where in-flight downloads land before the atomic rename.
    pub(crate) fn partial(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".partial");
        path.into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn id(fill: char) -> LayerId {
        let hex: String = std::iter::repeat(fill).take(64).collect();
        format!("sha256:{}", hex).parse().unwrap()
    }

    #[test]
    fn entry_path_is_deterministic() {
        let cache = Cache::at(PathBuf::from("/var/cache/burrow/docker"), false);
        let entry = cache.entry(&id('a'));

        assert_eq!(
            entry.path,
            Path::new("/var/cache/burrow/docker").join(format!("{}.tar.gz", "a".repeat(64)))
        );
        assert_eq!(entry.path, cache.entry(&id('a')).path);
        assert_ne!(entry.path, cache.entry(&id('b')).path);
    }

    #[test]
    fn partial_sits_next_to_the_entry() {
        let cache = Cache::at(PathBuf::from("/base"), false);
        let entry = cache.entry(&id('a'));

        assert_eq!(entry.partial().parent(), entry.path.parent());
        assert_eq!(
            entry.partial().extension().unwrap().to_str().unwrap(),
            "partial"
        );
    }

    #[test]
    fn exists_reflects_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::at(dir.path().into(), false);
        let entry = cache.entry(&id('a'));

        assert!(!entry.exists());
        std::fs::write(&entry.path, b"archive").unwrap();
        assert!(entry.exists());
    }

    #[test]
    fn purge_removes_the_base() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("docker");
        std::fs::create_dir(&base).unwrap();

        let cache = Cache::at(base.clone(), true);
        std::fs::write(cache.entry(&id('a')).path, b"archive").unwrap();

        cache.purge().unwrap();
        assert!(!base.exists());
    }

    #[test]
    fn resolve_honors_the_disable_flag() {
        let cache = Cache::resolve("docker", true).unwrap();
        assert!(cache.is_ephemeral());
        assert!(cache.base().exists());
        cache.purge().unwrap();
    }
}

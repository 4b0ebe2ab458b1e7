//! The end-to-end acquisition pipeline
//!
//! `Puller` drives resolve → manifest → ensure-cached → extract →
//! runscript. Its collaborators (the registry source, the cache, the
//! tar extractor) are injected at construction, so nothing here
//! reaches for ambient state and every step can be substituted in
//! tests.

use crate::api::{Image, Layer, Reference, Repository};
use crate::cache::{Cache, Entry};
use crate::error::{Error, Result};
use crate::extract::Extract;
use crate::formats::LayerId;
use crate::runscript;

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

/// The registry-facing operations the pipeline consumes.
pub trait Source {
    /// Fetches the manifest for `reference`.
    fn image(&self, reference: &Reference) -> Result<Image>;

    /// Downloads one layer blob into `entry`.
    fn layer(&self, id: &LayerId, entry: &Entry, progress: &ProgressBar) -> Result<PathBuf>;
}

impl Source for Repository {
    fn image(&self, reference: &Reference) -> Result<Image> {
        Image::fetch(self, reference)
    }

    fn layer(&self, id: &LayerId, entry: &Entry, progress: &ProgressBar) -> Result<PathBuf> {
        Layer::new(self, id).fetch(entry, progress)
    }
}

/// What acquisition produced: every cached layer in extraction order
/// plus the data the remaining steps need.
///
/// The cache handle rides along explicitly so the cleanup step
/// consumes the same base acquisition resolved.
#[derive(Clone, Debug)]
pub struct Additions {
    pub layers: Vec<Entry>,
    pub reference: Reference,
    pub image: Image,
    pub cache: Cache,
}

pub struct Puller<'a> {
    source: &'a dyn Source,
    cache: Cache,
    extractor: &'a dyn Extract,
    progress: bool,
}

impl<'a> Puller<'a> {
    pub fn new(source: &'a dyn Source, cache: Cache, extractor: &'a dyn Extract) -> Self {
        Self {
            source,
            cache,
            extractor,
            progress: false,
        }
    }

    pub fn progress(mut self, show: bool) -> Self {
        self.progress = show;
        self
    }

    /// Ensures every layer of `reference` is cached.
    ///
    /// Layers already present are not downloaded again. When
    /// `layerfile` is given, the cached paths are persisted there,
    /// one per line, in extraction order.
    pub fn add(&self, reference: &Reference, layerfile: Option<&Path>) -> Result<Additions> {
        let image = self.source.image(reference)?;
        let ids = image.layer_ids();
        info!("{}: {} layer(s)", image.reference(), ids.len());
        debug!(
            "schema {} manifest, cache base {:?}",
            image.manifest().schema_version,
            self.cache.base()
        );

        let bar = self.bar(reference);
        let mut layers = Vec::with_capacity(ids.len());
        for id in &ids {
            let entry = self.cache.entry(id);
            if entry.exists() {
                debug!("cached: {}", id);
            } else {
                self.source.layer(id, &entry, &bar)?;
            }

            layers.push(entry);
        }
        bar.finish_and_clear();

        if let Some(path) = layerfile {
            let listing: Vec<_> = layers
                .iter()
                .map(|entry| entry.path.display().to_string())
                .collect();

            std::fs::write(path, listing.join("\n") + "\n").map_err(|err| Error::Cache {
                path: path.into(),
                source: err,
            })?;
        }

        Ok(Additions {
            layers,
            reference: reference.clone(),
            image,
            cache: self.cache.clone(),
        })
    }

    /// The whole pipeline: acquire, extract in order, write the
    /// runscript, clean up an ephemeral cache.
    ///
    /// Any failure halts the run where it happened; a partially
    /// populated rootfs is reported as failed, never as complete.
    pub fn import(
        &self,
        reference: &Reference,
        rootfs: &Path,
        use_cmd: bool,
        layerfile: Option<&Path>,
    ) -> Result<()> {
        let result = self
            .add(reference, layerfile)
            .and_then(|additions| self.finish(&additions, rootfs, use_cmd));

        // The ephemeral base must not outlive the run, successful or
        // not. A purge failure never masks the run's own error.
        if self.cache.is_ephemeral() {
            match (self.cache.purge(), &result) {
                (Err(err), Ok(())) => return Err(err),
                (Err(err), Err(..)) => log::warn!("{}", err),
                _ => {}
            }
        }

        result
    }

    /// Extracts cached layers onto `rootfs` in order, then derives
    /// the startup files.
    ///
    /// The first extraction failure aborts the remaining sequence;
    /// already-extracted layers stay in place.
    pub fn finish(&self, additions: &Additions, rootfs: &Path, use_cmd: bool) -> Result<()> {
        for entry in &additions.layers {
            info!("extracting {}", entry.id);
            self.extractor
                .extract(&entry.path, rootfs)
                .map_err(|err| Error::Extraction {
                    archive: entry.path.clone(),
                    source: err,
                })?;
        }

        if let Some(argv) = additions.image.startup_command(use_cmd)? {
            info!("runscript: {}", argv.join(" "));
            runscript::write_runscript(rootfs, &argv)?;
        }

        let env = additions.image.environment()?;
        if !env.is_empty() {
            runscript::write_environment(rootfs, &env)?;
        }

        Ok(())
    }

    fn bar(&self, reference: &Reference) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }

        let tmpl = "{prefix} {elapsed:>4} {wide_bar} {bytes:>12} {bytes_per_sec:>12} {eta:>4}";
        let bar = ProgressBar::new(0);
        bar.set_prefix(reference.to_string());
        bar.set_style(ProgressStyle::default_bar().template(tmpl));
        bar
    }
}

// SPDX-License-Identifier: Apache-2.0

use super::Command;
use crate::api::{Reference, Repository};
use crate::cache::Cache;
use crate::extract::TarGz;
use crate::pipeline::Puller;

use std::path::PathBuf;

use structopt::StructOpt;

/// Ensures an image's layers are cached and lists their paths
#[derive(StructOpt, Debug)]
pub struct Layers {
    /// The image reference (format: docker://[namespace/]name[:tag])
    image: String,

    /// Replace the default registry host
    #[structopt(long)]
    registry: Option<String>,

    /// Authorization header value to send to the registry
    #[structopt(long)]
    auth: Option<String>,

    /// Write the cached layer paths to this file, one per line
    #[structopt(long)]
    layerfile: Option<PathBuf>,

    /// Don't display the progress bar
    #[structopt(short, long)]
    quiet: bool,
}

impl Command for Layers {
    fn execute(self) -> anyhow::Result<()> {
        let reference = Reference::parse(&self.image)?;
        let repo = Repository::new(&reference, self.registry.as_deref(), self.auth.as_deref());
        let cache = Cache::resolve("docker", false)?;

        let extractor = TarGz;
        let puller = Puller::new(&repo, cache, &extractor).progress(!self.quiet);
        let additions = puller.add(&reference, self.layerfile.as_deref())?;

        for entry in &additions.layers {
            println!("{}", entry.path.display());
        }

        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0

use super::Command;
use crate::api::{Reference, Repository};
use crate::cache::Cache;
use crate::extract::TarGz;
use crate::pipeline::Puller;

use std::path::PathBuf;

use structopt::StructOpt;

/// Imports an image onto a root filesystem and derives its runscript
#[derive(StructOpt, Debug)]
pub struct Import {
    /// The image reference (format: docker://[namespace/]name[:tag])
    image: String,

    /// The target root filesystem directory (will be created)
    rootfs: PathBuf,

    /// Use the image Cmd instead of its Entrypoint for the runscript
    #[structopt(long)]
    use_cmd: bool,

    /// Replace the default registry host
    #[structopt(long)]
    registry: Option<String>,

    /// Authorization header value to send to the registry
    #[structopt(long)]
    auth: Option<String>,

    /// Don't keep downloaded layers beyond this run
    #[structopt(long)]
    no_cache: bool,

    /// Write the cached layer paths to this file, one per line
    #[structopt(long)]
    layerfile: Option<PathBuf>,

    /// Don't display the progress bar
    #[structopt(short, long)]
    quiet: bool,
}

impl Command for Import {
    fn execute(self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.rootfs)?;

        let reference = Reference::parse(&self.image)?;
        let repo = Repository::new(&reference, self.registry.as_deref(), self.auth.as_deref());
        let cache = Cache::resolve("docker", self.no_cache)?;

        let extractor = TarGz;
        let puller = Puller::new(&repo, cache, &extractor).progress(!self.quiet);
        puller.import(
            &reference,
            &self.rootfs,
            self.use_cmd,
            self.layerfile.as_deref(),
        )?;

        Ok(())
    }
}

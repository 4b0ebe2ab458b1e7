// SPDX-License-Identifier: Apache-2.0

use super::Command;
use crate::api::{Reference, Repository};

use structopt::StructOpt;

/// Lists the registry tags for an image
#[derive(StructOpt, Debug)]
pub struct Tags {
    /// The image reference (format: docker://[namespace/]name)
    image: String,

    /// Replace the default registry host
    #[structopt(long)]
    registry: Option<String>,

    /// Authorization header value to send to the registry
    #[structopt(long)]
    auth: Option<String>,
}

impl Command for Tags {
    fn execute(self) -> anyhow::Result<()> {
        let reference = Reference::parse(&self.image)?;
        let repo = Repository::new(&reference, self.registry.as_deref(), self.auth.as_deref());

        for tag in repo.tags()? {
            println!("{}", tag);
        }

        Ok(())
    }
}

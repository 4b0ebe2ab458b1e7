// SPDX-License-Identifier: Apache-2.0

use structopt::StructOpt;

mod import;
mod layers;
mod tags;

pub trait Command {
    fn execute(self) -> anyhow::Result<()>;
}

#[derive(StructOpt, Debug)]
#[structopt(about = "imports container images into root filesystems")]
pub enum Main {
    Import(import::Import),
    Layers(layers::Layers),
    Tags(tags::Tags),
}

impl Command for Main {
    fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Import(cmd) => cmd.execute(),
            Self::Layers(cmd) => cmd.execute(),
            Self::Tags(cmd) => cmd.execute(),
        }
    }
}

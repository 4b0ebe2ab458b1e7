mod api;
mod cache;
mod commands;
mod error;
mod extract;
mod formats;
mod pipeline;
mod runscript;

use commands::{Command, Main};
use structopt::StructOpt;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    Main::from_args().execute()
}

use anyhow::Result;
use clap::Parser;

use clipmaker::commands::clip::{self, ClipArgs};

fn main() -> Result<()> {
    let args = ClipArgs::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    clip::run(args)
}

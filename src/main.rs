use anyhow::Result;
use clap::Parser;

use parabench::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    parabench::run(args)
}

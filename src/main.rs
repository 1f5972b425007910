use anyhow::Result;
use clap::Parser;
use mailtidy::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = cli.context();

    mailtidy::core::run(cli, &ctx)
}

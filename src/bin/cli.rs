// src/bin/cli.rs
use didel::cli;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();
    cli::run()
}

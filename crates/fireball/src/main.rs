mod camera;
mod cli;
mod config;
mod geometry;
mod keymap;
mod run;
mod shaders;

use anyhow::Result;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();
    run::run(cli)
}

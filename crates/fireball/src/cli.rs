use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::shaders::SurfaceShader;

#[derive(Parser, Debug)]
#[command(
    name = "fireball",
    author,
    version,
    about = "Procedural fireball renderer with live-tunable shader parameters"
)]
pub struct Cli {
    /// TOML file with window options and initial parameters.
    #[arg(long, value_name = "FILE", env = "FIREBALL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_window_size)]
    pub size: Option<(u32, u32)>,

    /// Initial icosphere subdivision level (0-8).
    #[arg(long, value_name = "LEVEL", value_parser = clap::value_parser!(u32).range(0..=8))]
    pub tessellation: Option<u32>,

    /// Program used to shade the sphere.
    #[arg(long, value_name = "SHADER", value_enum)]
    pub surface_shader: Option<SurfaceShader>,

    /// Present as fast as possible instead of waiting for vertical sync.
    #[arg(long)]
    pub no_vsync: bool,

    /// Exit after rendering this many frames.
    #[arg(long, value_name = "COUNT")]
    pub frames: Option<u64>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

/// Largest window edge accepted on the command line.
const MAX_WINDOW_EDGE: u32 = 16_384;

fn parse_window_size(value: &str) -> Result<(u32, u32)> {
    let Some((width, height)) = value.trim().split_once(['x', 'X']) else {
        bail!("`{value}` is not WIDTHxHEIGHT");
    };
    let edge = |text: &str, axis: &str| -> Result<u32> {
        let edge: u32 = text
            .trim()
            .parse()
            .with_context(|| format!("invalid window {axis} `{}`", text.trim()))?;
        if !(1..=MAX_WINDOW_EDGE).contains(&edge) {
            bail!("window {axis} must be between 1 and {MAX_WINDOW_EDGE}, got {edge}");
        }
        Ok(edge)
    };
    Ok((edge(width, "width")?, edge(height, "height")?))
}

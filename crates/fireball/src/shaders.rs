use clap::ValueEnum;
use renderer::ShaderSource;
use serde::{Deserialize, Serialize};

const FIREBALL_VERT: &str = include_str!("../shaders/fireball-vert.glsl");
const FIREBALL_FRAG: &str = include_str!("../shaders/fireball-frag.glsl");
const LAMBERT_VERT: &str = include_str!("../shaders/lambert-vert.glsl");
const LAMBERT_FRAG: &str = include_str!("../shaders/lambert-frag.glsl");
const FLAT_VERT: &str = include_str!("../shaders/flat-vert.glsl");
const FLAT_FRAG: &str = include_str!("../shaders/flat-frag.glsl");

/// Program used to shade the icosphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceShader {
    /// Noise-displaced sphere with a vertical color gradient.
    #[default]
    Fireball,
    /// Plain diffuse shading, handy for checking the mesh.
    Lambert,
}

impl SurfaceShader {
    pub fn label(self) -> &'static str {
        match self {
            SurfaceShader::Fireball => "fireball",
            SurfaceShader::Lambert => "lambert",
        }
    }

    pub fn sources(self) -> [ShaderSource<'static>; 2] {
        match self {
            SurfaceShader::Fireball => [
                ShaderSource::vertex(FIREBALL_VERT),
                ShaderSource::fragment(FIREBALL_FRAG),
            ],
            SurfaceShader::Lambert => [
                ShaderSource::vertex(LAMBERT_VERT),
                ShaderSource::fragment(LAMBERT_FRAG),
            ],
        }
    }
}

/// Fullscreen flame backdrop.
pub fn background_sources() -> [ShaderSource<'static>; 2] {
    [
        ShaderSource::vertex(FLAT_VERT),
        ShaderSource::fragment(FLAT_FRAG),
    ]
}

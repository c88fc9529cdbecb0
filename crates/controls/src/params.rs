use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Valid icosphere subdivision levels.
pub const TESSELLATION_RANGE: RangeInclusive<u32> = 0..=8;
/// Gradient color channels are expressed in 0-255 units.
pub const COLOR_RANGE: RangeInclusive<f32> = 0.0..=255.0;
pub const FBM_LOOP_RANGE: RangeInclusive<f32> = 0.0..=16.0;
pub const UP_BIAS_RANGE: RangeInclusive<f32> = 0.0..=10.0;

/// RGB triple in 0-255 units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Returns the color as a homogeneous `[r, g, b, 1]` array, still in 0-255 units.
    pub fn to_rgba(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }

    fn clamped(self) -> Self {
        Self {
            r: clamp_f32(self.r, &COLOR_RANGE),
            g: clamp_f32(self.g, &COLOR_RANGE),
            b: clamp_f32(self.b, &COLOR_RANGE),
        }
    }
}

/// Fractal noise controls forwarded to the fireball shaders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Noise {
    /// Number of fBm octaves the shader iterates.
    pub fbm_loop: f32,
    /// Upward displacement bias of the flame.
    pub up_bias: f32,
}

impl Default for Noise {
    fn default() -> Self {
        Self {
            fbm_loop: 4.0,
            up_bias: 3.0,
        }
    }
}

/// The complete set of runtime-tunable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub tessellation: u32,
    pub top_color: Rgb,
    pub bottom_color: Rgb,
    pub noise: Noise,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            tessellation: 5,
            top_color: Rgb::new(255.0, 103.0, 27.0),
            bottom_color: Rgb::new(100.0, 127.0, 255.0),
            noise: Noise::default(),
        }
    }
}

impl Parameters {
    /// Restores every field to its default value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Checks every field against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !TESSELLATION_RANGE.contains(&self.tessellation) {
            return Err(ConfigError::Invalid(format!(
                "tessellation {} outside {}..={}",
                self.tessellation,
                TESSELLATION_RANGE.start(),
                TESSELLATION_RANGE.end()
            )));
        }
        for (name, color) in [("top_color", self.top_color), ("bottom_color", self.bottom_color)] {
            for (channel, value) in [("r", color.r), ("g", color.g), ("b", color.b)] {
                check_range(&format!("{name}.{channel}"), value, &COLOR_RANGE)?;
            }
        }
        check_range("noise.fbm_loop", self.noise.fbm_loop, &FBM_LOOP_RANGE)?;
        check_range("noise.up_bias", self.noise.up_bias, &UP_BIAS_RANGE)?;
        Ok(())
    }

    /// Returns a copy with every field forced into its range.
    pub fn clamped(&self) -> Self {
        Self {
            tessellation: self
                .tessellation
                .clamp(*TESSELLATION_RANGE.start(), *TESSELLATION_RANGE.end()),
            top_color: self.top_color.clamped(),
            bottom_color: self.bottom_color.clamped(),
            noise: Noise {
                fbm_loop: clamp_f32(self.noise.fbm_loop, &FBM_LOOP_RANGE),
                up_bias: clamp_f32(self.noise.up_bias, &UP_BIAS_RANGE),
            },
        }
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(input)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), ?params, "loaded parameters");
        Ok(params)
    }
}

fn check_range(name: &str, value: f32, range: &RangeInclusive<f32>) -> Result<(), ConfigError> {
    if value.is_nan() || !range.contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{name} = {value} outside {}..={}",
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

pub(crate) fn clamp_f32(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

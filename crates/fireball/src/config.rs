use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use controls::Parameters;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::shaders::SurfaceShader;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Fireball".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// Everything needed to start the renderer.
///
/// Resolved from built-in defaults, then an optional TOML file, then CLI flags.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub surface_shader: SurfaceShader,
    pub parameters: Parameters,
}

impl AppConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            anyhow::bail!("window dimensions must be greater than zero");
        }
        self.parameters.validate()?;
        Ok(())
    }

    /// Loads the configured file (if any) and applies command-line overrides.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some((width, height)) = cli.size {
            self.window.width = width;
            self.window.height = height;
        }
        if let Some(level) = cli.tessellation {
            self.parameters.tessellation = level;
        }
        if let Some(shader) = cli.surface_shader {
            self.surface_shader = shader;
        }
        if cli.no_vsync {
            self.window.vsync = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use controls::Rgb;

    use super::*;

    const SAMPLE: &str = r#"
surface_shader = "lambert"

[window]
title = "Demo"
width = 800
height = 600

[parameters]
tessellation = 3

[parameters.top_color]
r = 10.0
g = 20.0
b = 30.0
"#;

    #[test]
    fn file_overrides_defaults() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.surface_shader, SurfaceShader::Lambert);
        assert_eq!(config.window.title, "Demo");
        assert_eq!((config.window.width, config.window.height), (800, 600));
        assert!(config.window.vsync);
        assert_eq!(config.parameters.tessellation, 3);
        assert_eq!(config.parameters.top_color, Rgb::new(10.0, 20.0, 30.0));
        assert_eq!(
            config.parameters.bottom_color,
            Parameters::default().bottom_color
        );
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let err = AppConfig::from_toml_str("[parameters]\ntessellation = 12\n").unwrap_err();
        assert!(format!("{err:#}").contains("tessellation"));
    }

    #[test]
    fn cli_flags_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from([
            "fireball",
            "--config",
            path.as_str(),
            "--size",
            "320x200",
            "--tessellation",
            "7",
            "--surface-shader",
            "fireball",
            "--no-vsync",
        ])
        .unwrap();
        let config = AppConfig::resolve(&cli).unwrap();

        assert_eq!((config.window.width, config.window.height), (320, 200));
        assert_eq!(config.parameters.tessellation, 7);
        assert_eq!(config.surface_shader, SurfaceShader::Fireball);
        assert!(!config.window.vsync);
        assert_eq!(config.window.title, "Demo");
    }

    #[test]
    fn missing_file_reports_path() {
        let cli = Cli::try_parse_from(["fireball", "--config", "/nonexistent/fireball.toml"]).unwrap();
        let err = AppConfig::resolve(&cli).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/fireball.toml"));
    }
}

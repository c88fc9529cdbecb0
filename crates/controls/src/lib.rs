//! Live, user-tunable parameters for the fireball renderer.
//!
//! Three layers live here:
//! - [`Parameters`] is the plain value type (tessellation, gradient colors,
//!   noise knobs) with its defaults, ranges and TOML representation.
//! - [`ParameterHandle`] shares one `Parameters` between the control surface
//!   and the frame loop. Writers mutate under a lock; the frame loop takes a
//!   copy once per tick so it never observes a half-applied change.
//! - [`ControlPanel`] models the widgets a control surface displays, snapping
//!   and clamping input the way sliders do and reflecting resets back into
//!   every widget.

mod handle;
mod panel;
mod params;

use std::path::PathBuf;

pub use handle::ParameterHandle;
pub use panel::{ControlPanel, PanelAction, Widget, WidgetSpec, FOLDERS};
pub use params::{
    Noise, Parameters, Rgb, COLOR_RANGE, FBM_LOOP_RANGE, TESSELLATION_RANGE, UP_BIAS_RANGE,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

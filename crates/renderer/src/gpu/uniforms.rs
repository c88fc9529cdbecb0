use controls::Parameters;
use glam::{Mat4, Vec2, Vec4};

/// Uniform semantics the renderer knows how to feed.
///
/// A program that does not declare one of these simply never receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uniform {
    Time,
    Model,
    ModelInvTr,
    ViewProj,
    Color,
    Resolution,
    BottomColor,
    TopColor,
    FbmLoop,
    UpBias,
}

impl Uniform {
    pub const ALL: [Uniform; 10] = [
        Uniform::Time,
        Uniform::Model,
        Uniform::ModelInvTr,
        Uniform::ViewProj,
        Uniform::Color,
        Uniform::Resolution,
        Uniform::BottomColor,
        Uniform::TopColor,
        Uniform::FbmLoop,
        Uniform::UpBias,
    ];

    /// GLSL identifier for the semantic.
    pub fn name(self) -> &'static str {
        match self {
            Uniform::Time => "u_Time",
            Uniform::Model => "u_Model",
            Uniform::ModelInvTr => "u_ModelInvTr",
            Uniform::ViewProj => "u_ViewProj",
            Uniform::Color => "u_Color",
            Uniform::Resolution => "u_Resolution",
            Uniform::BottomColor => "u_BottomColor",
            Uniform::TopColor => "u_TopColor",
            Uniform::FbmLoop => "u_FbmLoop",
            Uniform::UpBias => "u_UpBias",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Per-vertex attribute semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Position,
    Normal,
    Color,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Position, Attribute::Normal, Attribute::Color];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Position => "vs_Pos",
            Attribute::Normal => "vs_Nor",
            Attribute::Color => "vs_Col",
        }
    }

    /// Attributes are stored as tightly packed vec4s.
    pub fn components(self) -> i32 {
        4
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Values pushed into a program for one frame.
///
/// Built fresh every tick and read-only once handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformValues {
    pub model: Mat4,
    pub view_proj: Mat4,
    pub color: Vec4,
    pub time: f32,
    pub resolution: Vec2,
    pub top_color: Vec4,
    pub bottom_color: Vec4,
    pub fbm_loop: f32,
    pub up_bias: f32,
}

impl UniformValues {
    pub fn new(model: Mat4, view_proj: Mat4, time: f32) -> Self {
        let defaults = Parameters::default();
        Self {
            model,
            view_proj,
            color: Vec4::ONE,
            time,
            resolution: Vec2::ZERO,
            top_color: Vec4::from_array(defaults.top_color.to_rgba()),
            bottom_color: Vec4::from_array(defaults.bottom_color.to_rgba()),
            fbm_loop: defaults.noise.fbm_loop,
            up_bias: defaults.noise.up_bias,
        }
    }

    /// Frame bundle for `params` at `time` over a `width`x`height` surface.
    ///
    /// Colors stay in 0-255 units; the shaders normalise them.
    pub fn from_parameters(params: &Parameters, time: f32, width: u32, height: u32) -> Self {
        Self {
            resolution: Vec2::new(width as f32, height as f32),
            top_color: Vec4::from_array(params.top_color.to_rgba()),
            bottom_color: Vec4::from_array(params.bottom_color.to_rgba()),
            fbm_loop: params.noise.fbm_loop,
            up_bias: params.noise.up_bias,
            ..Self::new(Mat4::IDENTITY, Mat4::IDENTITY, time)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use controls::{Noise, Rgb};

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = Uniform::ALL.iter().map(|uniform| uniform.name()).collect();
        names.extend(Attribute::ALL.iter().map(|attribute| attribute.name()));
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn bundle_mirrors_parameters() {
        let params = Parameters {
            tessellation: 2,
            top_color: Rgb::new(1.0, 2.0, 3.0),
            bottom_color: Rgb::new(4.0, 5.0, 6.0),
            noise: Noise {
                fbm_loop: 7.0,
                up_bias: 8.0,
            },
        };
        let values = UniformValues::from_parameters(&params, 12.0, 640, 480);
        assert_eq!(values.time, 12.0);
        assert_eq!(values.resolution, Vec2::new(640.0, 480.0));
        assert_eq!(values.top_color, Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(values.bottom_color, Vec4::new(4.0, 5.0, 6.0, 1.0));
        assert_eq!(values.fbm_loop, 7.0);
        assert_eq!(values.up_bias, 8.0);
        assert_eq!(values.model, Mat4::IDENTITY);
        assert_eq!(values.color, Vec4::ONE);
    }
}

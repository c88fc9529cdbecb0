//! Capabilities the renderer consumes but does not implement.

use anyhow::Result;
use glam::Mat4;

use crate::backend::{GlBackend, PrimitiveMode};

/// Anything that can hand vertex and index buffers to a program.
///
/// Each `bind_*` method binds the corresponding buffer and reports whether the
/// drawable has one. A drawable owns its GPU buffers and releases them in
/// [`Drawable::destroy`].
pub trait Drawable<B: GlBackend> {
    fn bind_position(&self, gl: &B) -> bool;
    fn bind_normal(&self, gl: &B) -> bool;
    fn bind_color(&self, _gl: &B) -> bool {
        false
    }
    fn bind_index(&self, gl: &B) -> bool;
    fn draw_mode(&self) -> PrimitiveMode;
    fn element_count(&self) -> u32;

    /// Local transform applied as `u_Model`.
    fn model_matrix(&self) -> Mat4 {
        Mat4::IDENTITY
    }

    fn destroy(&mut self, gl: &B);
}

/// Produces the frame loop's primary geometry at a given tessellation level.
pub trait GeometryFactory<B: GlBackend> {
    fn build(&mut self, gl: &B, tessellation: u32) -> Result<Box<dyn Drawable<B>>>;
}

/// View and projection provider.
pub trait Camera {
    fn view_matrix(&self) -> Mat4;
    fn projection_matrix(&self) -> Mat4;
    /// Advances any internal animation and recomputes the view matrix.
    fn update(&mut self);
    fn set_aspect_ratio(&mut self, aspect: f32);
    fn update_projection_matrix(&mut self);
}

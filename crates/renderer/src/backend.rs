//! The narrow GL surface the renderer is written against.
//!
//! Everything above this module talks to the GPU exclusively through
//! [`GlBackend`]. Production code uses [`crate::GlowBackend`]; unit tests use
//! a recording implementation that captures every call.

use std::fmt;

/// Shader pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Primitive topology for draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

/// Buffer binding point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    /// Per-vertex attribute data.
    Array,
    /// 32-bit element indices.
    ElementArray,
}

/// Color blending configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// `src * src_alpha + dst * (1 - src_alpha)`.
    Alpha,
}

/// Low-level GL entry points used by the renderer.
///
/// Methods take `&self` because GL contexts are inherently stateful handles;
/// implementations are expected to be used from the thread that owns the
/// current context.
pub trait GlBackend {
    type Shader: Copy + fmt::Debug;
    type Program: Copy + PartialEq + fmt::Debug;
    type UniformLocation: Clone + fmt::Debug;
    type Buffer: Copy + fmt::Debug;

    /// Compiles one stage; on failure returns the compiler's info log.
    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String>;
    fn delete_shader(&self, shader: Self::Shader);

    /// Links the given stages; on failure returns the linker's info log.
    ///
    /// Implementations release the program object themselves when linking
    /// fails; the shaders stay owned by the caller either way.
    fn link_program(&self, shaders: &[Self::Shader]) -> Result<Self::Program, String>;
    fn delete_program(&self, program: Self::Program);

    fn attribute_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    fn use_program(&self, program: Option<Self::Program>);

    fn uniform_1f(&self, location: &Self::UniformLocation, value: f32);
    fn uniform_2f(&self, location: &Self::UniformLocation, value: [f32; 2]);
    fn uniform_4f(&self, location: &Self::UniformLocation, value: [f32; 4]);
    /// Uploads a column-major 4x4 matrix.
    fn uniform_matrix_4f(&self, location: &Self::UniformLocation, value: &[f32; 16]);

    fn enable_attribute(&self, slot: u32);
    /// Describes the currently bound array buffer as `components` tightly packed floats.
    fn attribute_pointer(&self, slot: u32, components: i32);
    fn disable_attribute(&self, slot: u32);

    fn create_buffer(&self, target: BufferTarget, data: &[u8]) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Indexed draw using 32-bit indices from the bound element buffer.
    fn draw_elements(&self, mode: PrimitiveMode, count: i32);
    fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32);

    fn clear_color(&self, rgba: [f32; 4]);
    /// Clears the color and depth buffers.
    fn clear(&self);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn set_depth_test(&self, enabled: bool);
    fn set_blend(&self, mode: Option<BlendMode>);
}

#[cfg(test)]
pub(crate) mod recording;

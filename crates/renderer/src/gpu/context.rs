use std::sync::Arc;

use anyhow::{anyhow, Result};
use glow::HasContext;

use crate::backend::{BlendMode, BufferTarget, GlBackend, PrimitiveMode, ShaderStage};

/// [`GlBackend`] over a live `glow` context.
///
/// Core profiles reject attribute pointers without a bound vertex array, so
/// the backend creates one VAO up front and keeps it bound for its lifetime.
pub struct GlowBackend {
    gl: Arc<glow::Context>,
    vertex_array: glow::VertexArray,
}

impl GlowBackend {
    /// Wraps a context that is current on the calling thread.
    pub fn new(gl: Arc<glow::Context>) -> Result<Self> {
        let vertex_array = unsafe { gl.create_vertex_array() }
            .map_err(|err| anyhow!("failed to create vertex array: {err}"))?;
        unsafe { gl.bind_vertex_array(Some(vertex_array)) };

        let version = gl.version();
        tracing::debug!(
            major = version.major,
            minor = version.minor,
            embedded = version.is_embedded,
            vendor = %version.vendor_info,
            "initialised GL backend"
        );

        Ok(Self { gl, vertex_array })
    }
}

impl Drop for GlowBackend {
    fn drop(&mut self) {
        unsafe {
            self.gl.bind_vertex_array(None);
            self.gl.delete_vertex_array(self.vertex_array);
        }
    }
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn mode_enum(mode: PrimitiveMode) -> u32 {
    match mode {
        PrimitiveMode::Points => glow::POINTS,
        PrimitiveMode::Lines => glow::LINES,
        PrimitiveMode::LineStrip => glow::LINE_STRIP,
        PrimitiveMode::Triangles => glow::TRIANGLES,
        PrimitiveMode::TriangleStrip => glow::TRIANGLE_STRIP,
    }
}

fn target_enum(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

impl GlBackend for GlowBackend {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;
    type Buffer = glow::Buffer;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<glow::Shader, String> {
        unsafe {
            let shader = self.gl.create_shader(stage_enum(stage))?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if self.gl.get_shader_compile_status(shader) {
                Ok(shader)
            } else {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                Err(log)
            }
        }
    }

    fn delete_shader(&self, shader: glow::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn link_program(&self, shaders: &[glow::Shader]) -> Result<glow::Program, String> {
        unsafe {
            let program = self.gl.create_program()?;
            for shader in shaders {
                self.gl.attach_shader(program, *shader);
            }
            self.gl.link_program(program);
            for shader in shaders {
                self.gl.detach_shader(program, *shader);
            }
            if self.gl.get_program_link_status(program) {
                Ok(program)
            } else {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                Err(log)
            }
        }
    }

    fn delete_program(&self, program: glow::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn attribute_location(&self, program: glow::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_location(&self, program: glow::Program, name: &str) -> Option<glow::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn use_program(&self, program: Option<glow::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn uniform_1f(&self, location: &glow::UniformLocation, value: f32) {
        unsafe { self.gl.uniform_1_f32(Some(location), value) }
    }

    fn uniform_2f(&self, location: &glow::UniformLocation, value: [f32; 2]) {
        unsafe { self.gl.uniform_2_f32(Some(location), value[0], value[1]) }
    }

    fn uniform_4f(&self, location: &glow::UniformLocation, value: [f32; 4]) {
        unsafe {
            self.gl
                .uniform_4_f32(Some(location), value[0], value[1], value[2], value[3])
        }
    }

    fn uniform_matrix_4f(&self, location: &glow::UniformLocation, value: &[f32; 16]) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(location), false, value)
        }
    }

    fn enable_attribute(&self, slot: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(slot) }
    }

    fn attribute_pointer(&self, slot: u32, components: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(slot, components, glow::FLOAT, false, 0, 0)
        }
    }

    fn disable_attribute(&self, slot: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(slot) }
    }

    fn create_buffer(&self, target: BufferTarget, data: &[u8]) -> Result<glow::Buffer, String> {
        let target = target_enum(target);
        unsafe {
            let buffer = self.gl.create_buffer()?;
            self.gl.bind_buffer(target, Some(buffer));
            self.gl.buffer_data_u8_slice(target, data, glow::STATIC_DRAW);
            self.gl.bind_buffer(target, None);
            Ok(buffer)
        }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<glow::Buffer>) {
        unsafe { self.gl.bind_buffer(target_enum(target), buffer) }
    }

    fn delete_buffer(&self, buffer: glow::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: i32) {
        unsafe {
            self.gl
                .draw_elements(mode_enum(mode), count, glow::UNSIGNED_INT, 0)
        }
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(mode_enum(mode), first, count) }
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        unsafe { self.gl.clear_color(rgba[0], rgba[1], rgba[2], rgba[3]) }
    }

    fn clear(&self) {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn set_depth_test(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::DEPTH_TEST);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
        }
    }

    fn set_blend(&self, mode: Option<BlendMode>) {
        unsafe {
            match mode {
                Some(BlendMode::Alpha) => {
                    self.gl.enable(glow::BLEND);
                    self.gl
                        .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
                }
                None => self.gl.disable(glow::BLEND),
            }
        }
    }
}

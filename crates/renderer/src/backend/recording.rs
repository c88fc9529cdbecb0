use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{BlendMode, BufferTarget, GlBackend, PrimitiveMode, ShaderStage};

/// One GL call as seen by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GlCall {
    CompileShader(ShaderStage),
    DeleteShader(u32),
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
    Uniform1f { location: u32, value: f32 },
    Uniform2f { location: u32, value: [f32; 2] },
    Uniform4f { location: u32, value: [f32; 4] },
    UniformMatrix4f { location: u32, value: [f32; 16] },
    EnableAttribute(u32),
    AttributePointer { slot: u32, components: i32 },
    DisableAttribute(u32),
    CreateBuffer(BufferTarget),
    BindBuffer(BufferTarget, Option<u32>),
    DeleteBuffer(u32),
    DrawElements { mode: PrimitiveMode, count: i32 },
    DrawArrays { mode: PrimitiveMode, first: i32, count: i32 },
    ClearColor([f32; 4]),
    Clear,
    Viewport { width: i32, height: i32 },
    DepthTest(bool),
    Blend(Option<BlendMode>),
}

impl GlCall {
    pub(crate) fn is_uniform_write(&self) -> bool {
        matches!(
            self,
            GlCall::Uniform1f { .. }
                | GlCall::Uniform2f { .. }
                | GlCall::Uniform4f { .. }
                | GlCall::UniformMatrix4f { .. }
        )
    }
}

/// In-memory GL stand-in.
///
/// Shaders containing `#error` fail to compile (as they would on a real
/// driver). Attribute and uniform names resolve only when they occur in the
/// linked sources, so a shader that never mentions `u_Time` has no `u_Time`
/// location. Locations are program id * 100 + declaration order.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    calls: RefCell<Vec<GlCall>>,
    next_id: Cell<u32>,
    shader_sources: RefCell<HashMap<u32, String>>,
    program_sources: RefCell<HashMap<u32, String>>,
    fail_next_link: Cell<bool>,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub(crate) fn count(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    pub(crate) fn fail_next_link(&self) {
        self.fail_next_link.set(true);
    }

    pub(crate) fn live_shaders(&self) -> usize {
        self.shader_sources.borrow().len()
    }

    pub(crate) fn live_programs(&self) -> usize {
        self.program_sources.borrow().len()
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn lookup(&self, program: u32, name: &str) -> Option<u32> {
        let sources = self.program_sources.borrow();
        let source = sources.get(&program)?;
        let mut order = 0;
        for token in source.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
            if token.starts_with("u_") || token.starts_with("vs_") {
                if token == name {
                    return Some(program * 100 + order);
                }
                order += 1;
            }
        }
        None
    }
}

impl GlBackend for RecordingBackend {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = u32;
    type Buffer = u32;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<u32, String> {
        self.record(GlCall::CompileShader(stage));
        if source.contains("#error") {
            return Err(format!("ERROR: 0:1: '#error' : {stage} shader rejected"));
        }
        let id = self.allocate();
        self.shader_sources
            .borrow_mut()
            .insert(id, source.to_string());
        Ok(id)
    }

    fn delete_shader(&self, shader: u32) {
        self.record(GlCall::DeleteShader(shader));
        self.shader_sources.borrow_mut().remove(&shader);
    }

    fn link_program(&self, shaders: &[u32]) -> Result<u32, String> {
        let id = self.allocate();
        self.record(GlCall::LinkProgram(id));
        if self.fail_next_link.replace(false) {
            return Err("error: vertex output does not match fragment input".to_string());
        }
        let sources = self.shader_sources.borrow();
        let combined = shaders
            .iter()
            .filter_map(|shader| sources.get(shader).cloned())
            .collect::<Vec<_>>()
            .join("\n");
        self.program_sources.borrow_mut().insert(id, combined);
        Ok(id)
    }

    fn delete_program(&self, program: u32) {
        self.record(GlCall::DeleteProgram(program));
        self.program_sources.borrow_mut().remove(&program);
    }

    fn attribute_location(&self, program: u32, name: &str) -> Option<u32> {
        self.lookup(program, name)
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        self.lookup(program, name)
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(GlCall::UseProgram(program));
    }

    fn uniform_1f(&self, location: &u32, value: f32) {
        self.record(GlCall::Uniform1f {
            location: *location,
            value,
        });
    }

    fn uniform_2f(&self, location: &u32, value: [f32; 2]) {
        self.record(GlCall::Uniform2f {
            location: *location,
            value,
        });
    }

    fn uniform_4f(&self, location: &u32, value: [f32; 4]) {
        self.record(GlCall::Uniform4f {
            location: *location,
            value,
        });
    }

    fn uniform_matrix_4f(&self, location: &u32, value: &[f32; 16]) {
        self.record(GlCall::UniformMatrix4f {
            location: *location,
            value: *value,
        });
    }

    fn enable_attribute(&self, slot: u32) {
        self.record(GlCall::EnableAttribute(slot));
    }

    fn attribute_pointer(&self, slot: u32, components: i32) {
        self.record(GlCall::AttributePointer { slot, components });
    }

    fn disable_attribute(&self, slot: u32) {
        self.record(GlCall::DisableAttribute(slot));
    }

    fn create_buffer(&self, target: BufferTarget, _data: &[u8]) -> Result<u32, String> {
        self.record(GlCall::CreateBuffer(target));
        Ok(self.allocate())
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<u32>) {
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: i32) {
        self.record(GlCall::DrawElements { mode, count });
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { mode, first, count });
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record(GlCall::ClearColor(rgba));
    }

    fn clear(&self) {
        self.record(GlCall::Clear);
    }

    fn viewport(&self, _x: i32, _y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport { width, height });
    }

    fn set_depth_test(&self, enabled: bool) {
        self.record(GlCall::DepthTest(enabled));
    }

    fn set_blend(&self, mode: Option<BlendMode>) {
        self.record(GlCall::Blend(mode));
    }
}

/// Drawable with fixed fake buffer ids that records its binds.
#[derive(Debug, Clone)]
pub(crate) struct TestDrawable {
    pub(crate) position: bool,
    pub(crate) normal: bool,
    pub(crate) color: bool,
    pub(crate) index: bool,
    pub(crate) count: u32,
    pub(crate) mode: PrimitiveMode,
    pub(crate) model: glam::Mat4,
}

impl TestDrawable {
    pub(crate) const POSITION_BUFFER: u32 = 901;
    pub(crate) const NORMAL_BUFFER: u32 = 902;
    pub(crate) const COLOR_BUFFER: u32 = 903;
    pub(crate) const INDEX_BUFFER: u32 = 904;

    /// Positions, normals and indices; no colors.
    pub(crate) fn indexed(count: u32) -> Self {
        Self {
            position: true,
            normal: true,
            color: false,
            index: true,
            count,
            mode: PrimitiveMode::Triangles,
            model: glam::Mat4::IDENTITY,
        }
    }

    fn bind(gl: &RecordingBackend, present: bool, target: BufferTarget, buffer: u32) -> bool {
        if present {
            gl.bind_buffer(target, Some(buffer));
        }
        present
    }
}

impl crate::scene::Drawable<RecordingBackend> for TestDrawable {
    fn bind_position(&self, gl: &RecordingBackend) -> bool {
        Self::bind(gl, self.position, BufferTarget::Array, Self::POSITION_BUFFER)
    }

    fn bind_normal(&self, gl: &RecordingBackend) -> bool {
        Self::bind(gl, self.normal, BufferTarget::Array, Self::NORMAL_BUFFER)
    }

    fn bind_color(&self, gl: &RecordingBackend) -> bool {
        Self::bind(gl, self.color, BufferTarget::Array, Self::COLOR_BUFFER)
    }

    fn bind_index(&self, gl: &RecordingBackend) -> bool {
        Self::bind(gl, self.index, BufferTarget::ElementArray, Self::INDEX_BUFFER)
    }

    fn draw_mode(&self) -> PrimitiveMode {
        self.mode
    }

    fn element_count(&self) -> u32 {
        self.count
    }

    fn model_matrix(&self) -> glam::Mat4 {
        self.model
    }

    fn destroy(&mut self, gl: &RecordingBackend) {
        for (present, buffer) in [
            (self.position, Self::POSITION_BUFFER),
            (self.normal, Self::NORMAL_BUFFER),
            (self.color, Self::COLOR_BUFFER),
            (self.index, Self::INDEX_BUFFER),
        ] {
            if present {
                gl.delete_buffer(buffer);
            }
        }
    }
}

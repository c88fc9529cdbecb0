use glam::{Mat4, Vec2, Vec4};

use crate::backend::{GlBackend, PrimitiveMode, ShaderStage};
use crate::error::{BufferKind, DrawError, ProgramError};
use crate::scene::Drawable;

use super::uniforms::{Attribute, Uniform, UniformValues};
use super::Gpu;

/// Source text for one pipeline stage.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSource<'a> {
    pub stage: ShaderStage,
    pub source: &'a str,
}

impl<'a> ShaderSource<'a> {
    pub fn vertex(source: &'a str) -> Self {
        Self {
            stage: ShaderStage::Vertex,
            source,
        }
    }

    pub fn fragment(source: &'a str) -> Self {
        Self {
            stage: ShaderStage::Fragment,
            source,
        }
    }
}

/// Vertices emitted by [`ShaderProgram::draw_fullscreen_quad`]: two triangles.
const QUAD_VERTICES: i32 = 6;

/// A linked GPU program with its attribute slots and uniform locations resolved.
///
/// The program is immutable once built. Semantics the shaders never declare
/// resolve to `None`, and writes to them are skipped without touching the
/// driver.
pub struct ShaderProgram<B: GlBackend> {
    label: String,
    program: B::Program,
    attributes: [Option<u32>; Attribute::ALL.len()],
    uniforms: [Option<B::UniformLocation>; Uniform::ALL.len()],
}

impl<B: GlBackend> std::fmt::Debug for ShaderProgram<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("label", &self.label)
            .field("program", &self.program)
            .field("attributes", &self.attributes)
            .field("uniforms", &self.uniforms)
            .finish()
    }
}

impl<B: GlBackend> ShaderProgram<B> {
    /// Compiles every stage, links them and resolves all known semantics.
    ///
    /// Any compile or link failure releases the GL objects created so far and
    /// returns the driver's diagnostic.
    pub fn new(
        gpu: &Gpu<B>,
        label: impl Into<String>,
        stages: &[ShaderSource<'_>],
    ) -> Result<Self, ProgramError> {
        let label = label.into();
        let gl = gpu.backend();

        let has_stage = |stage: ShaderStage| stages.iter().any(|source| source.stage == stage);
        if !has_stage(ShaderStage::Vertex) || !has_stage(ShaderStage::Fragment) {
            return Err(ProgramError::MissingStage);
        }

        let mut compiled = Vec::with_capacity(stages.len());
        for source in stages {
            match gl.compile_shader(source.stage, source.source) {
                Ok(shader) => compiled.push(shader),
                Err(log) => {
                    for shader in compiled {
                        gl.delete_shader(shader);
                    }
                    tracing::error!(program = %label, stage = %source.stage, "shader compilation failed");
                    return Err(ProgramError::Compile {
                        stage: source.stage,
                        log,
                    });
                }
            }
        }

        let linked = gl.link_program(&compiled);
        for shader in compiled {
            gl.delete_shader(shader);
        }
        let program = linked.map_err(|log| {
            tracing::error!(program = %label, "shader program failed to link");
            ProgramError::Link { log }
        })?;

        let attributes = std::array::from_fn(|index| {
            gl.attribute_location(program, Attribute::ALL[index].name())
        });
        let uniforms = std::array::from_fn(|index| {
            gl.uniform_location(program, Uniform::ALL[index].name())
        });

        let built = Self {
            label,
            program,
            attributes,
            uniforms,
        };
        tracing::debug!(
            program = %built.label,
            attributes = ?Attribute::ALL
                .iter()
                .filter(|attribute| built.attribute_slot(**attribute).is_some())
                .map(|attribute| attribute.name())
                .collect::<Vec<_>>(),
            uniforms = ?Uniform::ALL
                .iter()
                .filter(|uniform| built.has_uniform(**uniform))
                .map(|uniform| uniform.name())
                .collect::<Vec<_>>(),
            "linked shader program"
        );
        Ok(built)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn handle(&self) -> B::Program {
        self.program
    }

    pub fn attribute_slot(&self, attribute: Attribute) -> Option<u32> {
        self.attributes[attribute.index()]
    }

    pub fn has_uniform(&self, uniform: Uniform) -> bool {
        self.uniforms[uniform.index()].is_some()
    }

    /// Binds the program. Returns `true` when the driver was asked to switch.
    pub fn bind(&self, gpu: &Gpu<B>) -> bool {
        gpu.use_program(self.program)
    }

    fn write<F>(&self, gpu: &Gpu<B>, uniform: Uniform, write: F) -> bool
    where
        F: FnOnce(&B, &B::UniformLocation),
    {
        self.bind(gpu);
        match &self.uniforms[uniform.index()] {
            Some(location) => {
                write(gpu.backend(), location);
                true
            }
            None => false,
        }
    }

    /// Uploads `u_Model` and, when declared, its inverse transpose as `u_ModelInvTr`.
    pub fn set_model_matrix(&self, gpu: &Gpu<B>, model: &Mat4) -> bool {
        let wrote_model = self.write(gpu, Uniform::Model, |gl, location| {
            gl.uniform_matrix_4f(location, &model.to_cols_array())
        });
        let wrote_inverse = self.write(gpu, Uniform::ModelInvTr, |gl, location| {
            let inverse_transpose = model.transpose().inverse();
            gl.uniform_matrix_4f(location, &inverse_transpose.to_cols_array())
        });
        wrote_model || wrote_inverse
    }

    pub fn set_view_proj_matrix(&self, gpu: &Gpu<B>, view_proj: &Mat4) -> bool {
        self.write(gpu, Uniform::ViewProj, |gl, location| {
            gl.uniform_matrix_4f(location, &view_proj.to_cols_array())
        })
    }

    pub fn set_geometry_color(&self, gpu: &Gpu<B>, color: Vec4) -> bool {
        self.write(gpu, Uniform::Color, |gl, location| {
            gl.uniform_4f(location, color.to_array())
        })
    }

    pub fn set_time(&self, gpu: &Gpu<B>, time: f32) -> bool {
        self.write(gpu, Uniform::Time, |gl, location| gl.uniform_1f(location, time))
    }

    pub fn set_resolution(&self, gpu: &Gpu<B>, resolution: Vec2) -> bool {
        self.write(gpu, Uniform::Resolution, |gl, location| {
            gl.uniform_2f(location, resolution.to_array())
        })
    }

    pub fn set_top_color(&self, gpu: &Gpu<B>, color: Vec4) -> bool {
        self.write(gpu, Uniform::TopColor, |gl, location| {
            gl.uniform_4f(location, color.to_array())
        })
    }

    pub fn set_bottom_color(&self, gpu: &Gpu<B>, color: Vec4) -> bool {
        self.write(gpu, Uniform::BottomColor, |gl, location| {
            gl.uniform_4f(location, color.to_array())
        })
    }

    pub fn set_fbm_loop(&self, gpu: &Gpu<B>, count: f32) -> bool {
        self.write(gpu, Uniform::FbmLoop, |gl, location| gl.uniform_1f(location, count))
    }

    pub fn set_up_bias(&self, gpu: &Gpu<B>, bias: f32) -> bool {
        self.write(gpu, Uniform::UpBias, |gl, location| gl.uniform_1f(location, bias))
    }

    /// Pushes the frame-wide part of `values`: time, resolution, flat color,
    /// gradient colors and noise. Transforms are set per draw by the renderer.
    pub fn set_frame_values(&self, gpu: &Gpu<B>, values: &UniformValues) {
        self.set_time(gpu, values.time);
        self.set_resolution(gpu, values.resolution);
        self.set_geometry_color(gpu, values.color);
        self.set_top_color(gpu, values.top_color);
        self.set_bottom_color(gpu, values.bottom_color);
        self.set_fbm_loop(gpu, values.fbm_loop);
        self.set_up_bias(gpu, values.up_bias);
    }

    /// Issues an indexed draw of `drawable`.
    ///
    /// Only attributes this program declares and the drawable provides are
    /// enabled, and exactly those are disabled again afterwards.
    pub fn draw(&self, gpu: &Gpu<B>, drawable: &dyn Drawable<B>) -> Result<(), DrawError> {
        self.bind(gpu);
        let gl = gpu.backend();

        let mut enabled: [Option<u32>; Attribute::ALL.len()] = [None; Attribute::ALL.len()];
        for attribute in Attribute::ALL {
            let Some(slot) = self.attribute_slot(attribute) else {
                continue;
            };
            let provided = match attribute {
                Attribute::Position => drawable.bind_position(gl),
                Attribute::Normal => drawable.bind_normal(gl),
                Attribute::Color => drawable.bind_color(gl),
            };
            if provided {
                gl.enable_attribute(slot);
                gl.attribute_pointer(slot, attribute.components());
                enabled[attribute.index()] = Some(slot);
            }
        }

        let result = if drawable.bind_index(gl) {
            let count = i32::try_from(drawable.element_count()).unwrap_or(i32::MAX);
            gl.draw_elements(drawable.draw_mode(), count);
            Ok(())
        } else {
            Err(DrawError::MissingCapability {
                buffer: BufferKind::Index,
            })
        };

        for slot in enabled.into_iter().flatten() {
            gl.disable_attribute(slot);
        }
        result
    }

    /// Draws six vertices with the drawable's primitive mode and no buffers.
    pub fn draw_arrays(&self, gpu: &Gpu<B>, drawable: &dyn Drawable<B>) {
        self.bind(gpu);
        gpu.backend()
            .draw_arrays(drawable.draw_mode(), 0, QUAD_VERTICES);
    }

    /// Draws two viewport-covering triangles; the vertex stage is expected to
    /// derive positions from the vertex index.
    pub fn draw_fullscreen_quad(&self, gpu: &Gpu<B>) {
        self.bind(gpu);
        gpu.backend()
            .draw_arrays(PrimitiveMode::Triangles, 0, QUAD_VERTICES);
    }

    /// Deletes the program object.
    pub fn destroy(self, gpu: &Gpu<B>) {
        gpu.binder().forget(self.program);
        gpu.backend().delete_program(self.program);
    }
}

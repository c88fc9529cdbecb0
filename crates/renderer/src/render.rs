use crate::backend::{BlendMode, GlBackend};
use crate::error::DrawError;
use crate::gpu::{Gpu, ShaderProgram, UniformValues};
use crate::scene::{Camera, Drawable};

/// Outcome of one [`Renderer::render`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawReport {
    /// Drawables that were submitted successfully.
    pub drawn: usize,
    /// Position in the draw list and cause of every skipped drawable.
    pub failed: Vec<(usize, DrawError)>,
}

impl DrawReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns the GPU handle and the fixed-function state of the frame.
pub struct Renderer<B: GlBackend> {
    gpu: Gpu<B>,
    clear_color: [f32; 4],
    width: u32,
    height: u32,
    depth_test: bool,
    blend: Option<BlendMode>,
}

fn gl_extent(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl<B: GlBackend> Renderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            gpu: Gpu::new(backend),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            width: 0,
            height: 0,
            depth_test: false,
            blend: None,
        }
    }

    pub fn gpu(&self) -> &Gpu<B> {
        &self.gpu
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    pub fn blend(&self) -> Option<BlendMode> {
        self.blend
    }

    pub fn set_clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.clear_color = [r, g, b, a];
        self.gpu.backend().clear_color(self.clear_color);
    }

    /// Records the surface size and applies it as the viewport.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.set_viewport(width, height);
    }

    pub fn set_viewport(&self, width: u32, height: u32) {
        self.gpu
            .backend()
            .viewport(0, 0, gl_extent(width), gl_extent(height));
    }

    /// Clears color and depth.
    pub fn clear(&self) {
        self.gpu.backend().clear();
    }

    pub fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
        self.gpu.backend().set_depth_test(enabled);
    }

    pub fn enable_alpha_blending(&mut self) {
        self.set_blend(Some(BlendMode::Alpha));
    }

    pub fn disable_blending(&mut self) {
        self.set_blend(None);
    }

    fn set_blend(&mut self, mode: Option<BlendMode>) {
        self.blend = mode;
        self.gpu.backend().set_blend(mode);
    }

    /// Draws every drawable in order with `program`.
    ///
    /// `values.model` is composed with each drawable's own transform. A draw
    /// that fails is logged and skipped; the rest of the list still draws.
    pub fn render(
        &self,
        camera: &dyn Camera,
        program: &ShaderProgram<B>,
        values: &UniformValues,
        drawables: &[&dyn Drawable<B>],
    ) -> DrawReport {
        let view_proj = camera.projection_matrix() * camera.view_matrix();
        let mut report = DrawReport::default();

        for (index, drawable) in drawables.iter().enumerate() {
            program.set_view_proj_matrix(&self.gpu, &view_proj);
            program.set_model_matrix(&self.gpu, &(values.model * drawable.model_matrix()));
            program.set_frame_values(&self.gpu, values);

            match program.draw(&self.gpu, *drawable) {
                Ok(()) => report.drawn += 1,
                Err(err) => {
                    tracing::warn!(
                        program = program.label(),
                        index,
                        error = %err,
                        "skipping drawable"
                    );
                    report.failed.push((index, err));
                }
            }
        }
        report
    }

    /// Fullscreen pass with the same uniforms [`Renderer::render`] provides.
    pub fn draw_background(
        &self,
        camera: &dyn Camera,
        program: &ShaderProgram<B>,
        values: &UniformValues,
    ) {
        let view_proj = camera.projection_matrix() * camera.view_matrix();
        program.set_view_proj_matrix(&self.gpu, &view_proj);
        program.set_model_matrix(&self.gpu, &values.model);
        program.set_frame_values(&self.gpu, values);
        program.draw_fullscreen_quad(&self.gpu);
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::backend::recording::{GlCall, RecordingBackend, TestDrawable};
    use crate::backend::PrimitiveMode;
    use crate::error::BufferKind;
    use crate::gpu::ShaderSource;

    struct StillCamera;

    impl Camera for StillCamera {
        fn view_matrix(&self) -> Mat4 {
            Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0))
        }

        fn projection_matrix(&self) -> Mat4 {
            Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0))
        }

        fn update(&mut self) {}

        fn set_aspect_ratio(&mut self, _aspect: f32) {}

        fn update_projection_matrix(&mut self) {}
    }

    const VERT: &str = "uniform mat4 u_Model; uniform mat4 u_ViewProj; in vec4 vs_Pos; void main() {}";
    const FRAG: &str = "uniform float u_Time; out vec4 color; void main() {}";

    fn program(renderer: &Renderer<RecordingBackend>) -> ShaderProgram<RecordingBackend> {
        ShaderProgram::new(
            renderer.gpu(),
            "surface",
            &[ShaderSource::vertex(VERT), ShaderSource::fragment(FRAG)],
        )
        .unwrap()
    }

    fn matrix_writes(renderer: &Renderer<RecordingBackend>, location: u32) -> Vec<[f32; 16]> {
        renderer
            .gpu()
            .backend()
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GlCall::UniformMatrix4f { location: at, value } if at == location => Some(value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn failing_drawable_does_not_abort_the_pass() {
        let renderer = Renderer::new(RecordingBackend::new());
        let program = program(&renderer);
        renderer.gpu().backend().clear_calls();

        let broken = TestDrawable {
            index: false,
            ..TestDrawable::indexed(6)
        };
        let healthy = TestDrawable::indexed(12);
        let values = UniformValues::new(Mat4::IDENTITY, Mat4::IDENTITY, 1.0);
        let report = renderer.render(&StillCamera, &program, &values, &[&broken, &healthy]);

        assert_eq!(report.drawn, 1);
        assert_eq!(
            report.failed,
            vec![(
                0,
                DrawError::MissingCapability {
                    buffer: BufferKind::Index
                }
            )]
        );
        assert_eq!(
            renderer.gpu().backend().calls().iter().filter(|call| matches!(call, GlCall::DrawElements { .. })).count(),
            1
        );
    }

    #[test]
    fn view_projection_and_model_are_uploaded_per_drawable() {
        let renderer = Renderer::new(RecordingBackend::new());
        let program = program(&renderer);
        let gl = renderer.gpu().backend();
        let model_location = gl.uniform_location(program.handle(), "u_Model").unwrap();
        let view_proj_location = gl.uniform_location(program.handle(), "u_ViewProj").unwrap();
        gl.clear_calls();

        let moved = TestDrawable {
            model: Mat4::from_translation(Vec3::X),
            ..TestDrawable::indexed(3)
        };
        let values = UniformValues::new(Mat4::from_scale(Vec3::splat(2.0)), Mat4::IDENTITY, 0.0);
        let report = renderer.render(&StillCamera, &program, &values, &[&moved]);
        assert!(report.is_clean());

        let expected_view_proj = StillCamera.projection_matrix() * StillCamera.view_matrix();
        assert_eq!(
            matrix_writes(&renderer, view_proj_location),
            vec![expected_view_proj.to_cols_array()]
        );
        let expected_model = Mat4::from_scale(Vec3::splat(2.0)) * Mat4::from_translation(Vec3::X);
        assert_eq!(
            matrix_writes(&renderer, model_location),
            vec![expected_model.to_cols_array()]
        );
    }

    #[test]
    fn background_draws_fullscreen_quad_with_frame_uniforms() {
        let renderer = Renderer::new(RecordingBackend::new());
        let program = program(&renderer);
        let time_location = renderer
            .gpu()
            .backend()
            .uniform_location(program.handle(), "u_Time")
            .unwrap();
        renderer.gpu().backend().clear_calls();

        let values = UniformValues::new(Mat4::IDENTITY, Mat4::IDENTITY, 42.0);
        renderer.draw_background(&StillCamera, &program, &values);

        let calls = renderer.gpu().backend().calls();
        assert!(calls.contains(&GlCall::Uniform1f {
            location: time_location,
            value: 42.0
        }));
        assert_eq!(
            calls.last(),
            Some(&GlCall::DrawArrays {
                mode: PrimitiveMode::Triangles,
                first: 0,
                count: 6
            })
        );
    }

    #[test]
    fn fixed_function_state_is_tracked() {
        let mut renderer = Renderer::new(RecordingBackend::new());
        renderer.set_clear_color(0.2, 0.2, 0.2, 1.0);
        renderer.set_size(800, 600);
        renderer.set_depth_test(true);
        renderer.enable_alpha_blending();
        renderer.clear();
        renderer.disable_blending();

        assert_eq!(renderer.size(), (800, 600));
        assert_eq!(renderer.clear_color(), [0.2, 0.2, 0.2, 1.0]);
        assert!(renderer.depth_test());
        assert_eq!(renderer.blend(), None);
        assert_eq!(
            renderer.gpu().backend().calls(),
            vec![
                GlCall::ClearColor([0.2, 0.2, 0.2, 1.0]),
                GlCall::Viewport {
                    width: 800,
                    height: 600
                },
                GlCall::DepthTest(true),
                GlCall::Blend(Some(BlendMode::Alpha)),
                GlCall::Clear,
                GlCall::Blend(None),
            ]
        );
    }
}

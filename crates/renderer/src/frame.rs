use std::time::Instant;

use anyhow::{bail, Context, Result};
use controls::ParameterHandle;
use glam::Vec4;

use crate::backend::GlBackend;
use crate::gpu::{ShaderProgram, UniformValues};
use crate::render::Renderer;
use crate::runtime::{
    FpsCounter, FrameEvent, FrameSignal, LoopState, StopHandle, TickReport, TIME_STEP,
};
use crate::scene::{Camera, Drawable, GeometryFactory};

/// Programs used by every frame.
pub struct FramePrograms<B: GlBackend> {
    /// Shades the primary geometry.
    pub surface: ShaderProgram<B>,
    /// Fullscreen pass drawn behind the geometry.
    pub background: ShaderProgram<B>,
}

struct BuiltGeometry<B: GlBackend> {
    drawable: Box<dyn Drawable<B>>,
    tessellation: u32,
}

/// Drives one frame per tick: advances time, rebuilds geometry when the
/// tessellation changes, then draws the geometry and the background.
pub struct FrameLoop<B: GlBackend> {
    renderer: Renderer<B>,
    camera: Box<dyn Camera>,
    programs: FramePrograms<B>,
    factory: Box<dyn GeometryFactory<B>>,
    geometry: Option<BuiltGeometry<B>>,
    params: ParameterHandle,
    time: f32,
    frame: u64,
    width: u32,
    height: u32,
    rebuild_requested: bool,
    state: LoopState,
    stop: StopHandle,
    fps: FpsCounter,
}

impl<B: GlBackend> FrameLoop<B> {
    /// The surface size is taken from `renderer`; geometry is built on the first tick.
    pub fn new(
        renderer: Renderer<B>,
        camera: Box<dyn Camera>,
        programs: FramePrograms<B>,
        factory: Box<dyn GeometryFactory<B>>,
        params: ParameterHandle,
    ) -> Self {
        let (width, height) = renderer.size();
        Self {
            renderer,
            camera,
            programs,
            factory,
            geometry: None,
            params,
            time: 0.0,
            frame: 0,
            width,
            height,
            rebuild_requested: false,
            state: LoopState::Idle,
            stop: StopHandle::new(),
            fps: FpsCounter::default(),
        }
    }

    pub fn renderer(&self) -> &Renderer<B> {
        &self.renderer
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Tessellation level of the geometry currently on the GPU.
    pub fn built_tessellation(&self) -> Option<u32> {
        self.geometry.as_ref().map(|built| built.tessellation)
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Forces the next tick to rebuild the geometry even if the tessellation
    /// is unchanged.
    pub fn request_rebuild(&mut self) {
        self.rebuild_requested = true;
    }

    /// Records a new surface size. Takes effect on the next tick.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.renderer.set_size(width, height);
        self.camera.set_aspect_ratio(width as f32 / height.max(1) as f32);
        self.camera.update_projection_matrix();
        tracing::debug!(width, height, "surface resized");
    }

    /// Renders one frame.
    pub fn tick(&mut self) -> Result<TickReport> {
        if self.state == LoopState::Stopped {
            bail!("frame loop has been stopped");
        }
        self.state = LoopState::FrameActive;

        self.time += TIME_STEP;
        self.frame += 1;
        self.camera.update();
        self.renderer.set_viewport(self.width, self.height);
        self.renderer.clear();

        let params = self.params.snapshot();
        let rebuilt = match self.ensure_geometry(params.tessellation) {
            Ok(rebuilt) => rebuilt,
            Err(err) => {
                self.state = LoopState::Stopped;
                return Err(err);
            }
        };

        let values = UniformValues::from_parameters(&params, self.time, self.width, self.height);

        self.renderer.enable_alpha_blending();
        let gpu = self.renderer.gpu();
        let surface = &self.programs.surface;
        surface.set_top_color(gpu, Vec4::from_array(params.top_color.to_rgba()));
        surface.set_bottom_color(gpu, Vec4::from_array(params.bottom_color.to_rgba()));
        surface.set_fbm_loop(gpu, params.noise.fbm_loop);
        surface.set_up_bias(gpu, params.noise.up_bias);

        let mut drawables: Vec<&dyn Drawable<B>> = Vec::with_capacity(1);
        if let Some(built) = &self.geometry {
            drawables.push(built.drawable.as_ref());
        }
        let draws = self
            .renderer
            .render(self.camera.as_ref(), surface, &values, &drawables);
        self.renderer
            .draw_background(self.camera.as_ref(), &self.programs.background, &values);
        self.renderer.disable_blending();

        self.fps.record(Instant::now());
        self.state = LoopState::Idle;
        Ok(TickReport {
            frame: self.frame,
            time: self.time,
            rebuilt,
            draws,
        })
    }

    fn ensure_geometry(&mut self, tessellation: u32) -> Result<bool> {
        let stale = self.rebuild_requested
            || self
                .geometry
                .as_ref()
                .map_or(true, |built| built.tessellation != tessellation);
        if !stale {
            return Ok(false);
        }

        let gl = self.renderer.gpu().backend();
        if let Some(mut old) = self.geometry.take() {
            old.drawable.destroy(gl);
        }
        let drawable = self
            .factory
            .build(gl, tessellation)
            .with_context(|| format!("failed to build geometry at tessellation {tessellation}"))?;
        self.geometry = Some(BuiltGeometry {
            drawable,
            tessellation,
        });
        self.rebuild_requested = false;
        tracing::info!(tessellation, "built geometry");
        Ok(true)
    }

    /// Ticks on every [`FrameEvent::Tick`] until the signal reports
    /// [`FrameEvent::Stop`] or the stop handle fires. Returns the number of
    /// frames rendered.
    pub fn run(&mut self, signal: &mut dyn FrameSignal) -> Result<u64> {
        let mut rendered = 0;
        while !self.stop.is_stopped() {
            match signal.wait_next() {
                FrameEvent::Stop => break,
                FrameEvent::Tick => {
                    if self.stop.is_stopped() {
                        break;
                    }
                    self.tick()?;
                    rendered += 1;
                }
            }
        }
        self.state = LoopState::Stopped;
        tracing::info!(frames = rendered, "frame loop stopped");
        Ok(rendered)
    }

    /// Releases the geometry and both programs and hands back the renderer.
    /// The GL context must be current.
    pub fn destroy(mut self) -> Renderer<B> {
        let gpu = self.renderer.gpu();
        if let Some(mut built) = self.geometry.take() {
            built.drawable.destroy(gpu.backend());
        }
        self.programs.surface.destroy(gpu);
        self.programs.background.destroy(gpu);
        self.renderer
    }
}

use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use controls::{ControlPanel, ParameterHandle};
use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use renderer::{FrameLoop, FramePrograms, GlowBackend, Renderer, ShaderProgram};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::ModifiersState;
use winit::window::{Window, WindowId};

use crate::camera::{OrbitCamera, SharedCamera};
use crate::cli::Cli;
use crate::config::AppConfig;
use crate::geometry::IcosphereFactory;
use crate::keymap::{self, KeyboardControls, Outcome};
use crate::shaders;

/// Radians of orbit per pixel of mouse drag.
const ORBIT_SPEED: f32 = 0.005;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::resolve(&cli)?;
    tracing::info!(
        width = config.window.width,
        height = config.window.height,
        vsync = config.window.vsync,
        shader = config.surface_shader.label(),
        tessellation = config.parameters.tessellation,
        "starting fireball"
    );

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = FireballApp::new(config, cli.frames);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Picks the candidate with the most multisample samples; the first wins ties.
fn most_samples<T>(candidates: impl Iterator<Item = T>, samples: impl Fn(&T) -> u8) -> Option<T> {
    candidates.reduce(|best, candidate| {
        if samples(&candidate) > samples(&best) {
            candidate
        } else {
            best
        }
    })
}

/// Everything that only exists while a window and GL context are alive.
struct GlState {
    // Dropped first: GL objects must go before the context.
    frame_loop: Option<FrameLoop<GlowBackend>>,
    camera: SharedCamera,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
}

impl GlState {
    fn create(event_loop: &ActiveEventLoop, config: &AppConfig, params: ParameterHandle) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title(config.window.title.clone())
            .with_inner_size(PhysicalSize::new(config.window.width, config.window.height));
        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24);

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, |configs| {
                // glutin returns an error before calling the picker when nothing matches.
                most_samples(configs, |config| config.num_samples())
                    .expect("display builder offers at least one config")
            })
            .map_err(|err| anyhow!("failed to create window: {err}"))?;
        let window = window.ok_or_else(|| anyhow!("display builder did not create a window"))?;

        let raw_handle = window
            .window_handle()
            .context("window has no native handle")?
            .as_raw();
        let gl_display = gl_config.display();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_handle));
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .context("failed to create an OpenGL 3.3 core context")?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .context("failed to describe window surface")?;
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .context("failed to create window surface")?;
        let gl_context = not_current
            .make_current(&gl_surface)
            .context("failed to make GL context current")?;

        let interval = if config.window.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(err) = gl_surface.set_swap_interval(&gl_context, interval) {
            tracing::warn!(error = %err, "could not set swap interval");
        }

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| gl_display.get_proc_address(symbol))
        };
        let backend = GlowBackend::new(Arc::new(gl))?;

        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));
        let mut renderer = Renderer::new(backend);
        renderer.set_clear_color(0.2, 0.2, 0.2, 1.0);
        renderer.set_depth_test(true);
        renderer.set_size(width, height);

        let programs = FramePrograms {
            surface: ShaderProgram::new(
                renderer.gpu(),
                config.surface_shader.label(),
                &config.surface_shader.sources(),
            )
            .with_context(|| format!("failed to build {} program", config.surface_shader.label()))?,
            background: ShaderProgram::new(renderer.gpu(), "background", &shaders::background_sources())
                .context("failed to build background program")?,
        };

        let camera = SharedCamera::new(OrbitCamera::new(width as f32 / height as f32));
        let frame_loop = FrameLoop::new(
            renderer,
            Box::new(camera.clone()),
            programs,
            Box::new(IcosphereFactory::default()),
            params,
        );

        tracing::info!(width, height, "window ready");
        Ok(Self {
            frame_loop: Some(frame_loop),
            camera,
            gl_surface,
            gl_context,
            window,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return;
        };
        self.gl_surface.resize(&self.gl_context, width, height);
        if let Some(frame_loop) = self.frame_loop.as_mut() {
            frame_loop.resize(width.get(), height.get());
        }
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(frame_loop) = self.frame_loop.as_mut() else {
            return Ok(());
        };
        let report = frame_loop.tick()?;
        if !report.draws.is_clean() {
            tracing::warn!(frame = report.frame, failed = report.draws.failed.len(), "frame had failed draws");
        }
        self.gl_surface
            .swap_buffers(&self.gl_context)
            .context("failed to present frame")?;
        self.window.request_redraw();
        Ok(())
    }

    /// Releases GPU resources while the context is still current.
    fn shutdown(&mut self) {
        if let Some(frame_loop) = self.frame_loop.take() {
            drop(frame_loop.destroy());
        }
    }
}

#[derive(Debug, Default)]
struct Pointer {
    dragging: bool,
    last: Option<PhysicalPosition<f64>>,
}

struct FireballApp {
    config: AppConfig,
    params: ParameterHandle,
    keyboard: KeyboardControls,
    modifiers: ModifiersState,
    pointer: Pointer,
    frames_left: Option<u64>,
    state: Option<GlState>,
    error: Option<anyhow::Error>,
}

impl FireballApp {
    fn new(config: AppConfig, frames: Option<u64>) -> Self {
        let params = ParameterHandle::new(config.parameters);
        let keyboard = KeyboardControls::new(ControlPanel::new(params.clone()));
        Self {
            config,
            params,
            keyboard,
            modifiers: ModifiersState::empty(),
            pointer: Pointer::default(),
            frames_left: frames,
            state: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!(error = %format!("{err:#}"), "fatal error");
        self.error = Some(err);
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let Some(command) = keymap::command_for(&event.logical_key, self.modifiers.shift_key())
        else {
            return;
        };
        match self.keyboard.apply(command) {
            Outcome::Handled => {}
            Outcome::Rebuild => {
                if let Some(frame_loop) = self.state.as_mut().and_then(|state| state.frame_loop.as_mut()) {
                    frame_loop.request_rebuild();
                }
            }
            Outcome::Quit => event_loop.exit(),
        }
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        if let (true, Some(last), Some(state)) = (self.pointer.dragging, self.pointer.last, &self.state) {
            let dx = (position.x - last.x) as f32;
            let dy = (position.y - last.y) as f32;
            state.camera.orbit(-dx * ORBIT_SPEED, dy * ORBIT_SPEED);
        }
        self.pointer.last = Some(position);
    }
}

impl ApplicationHandler for FireballApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match GlState::create(event_loop, &self.config, self.params.clone()) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.resize(size);
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => self.modifiers = modifiers.state(),
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => self.pointer.dragging = button_state == ElementState::Pressed,
            WindowEvent::CursorMoved { position, .. } => self.handle_cursor(position),
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(offset) => offset.y as f32 / 40.0,
                };
                if let Some(state) = self.state.as_ref() {
                    state.camera.zoom(0.9f32.powf(lines));
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(state) = self.state.as_mut() else {
                    return;
                };
                if let Err(err) = state.redraw() {
                    self.fail(event_loop, err);
                    return;
                }
                if let Some(left) = self.frames_left.as_mut() {
                    *left = left.saturating_sub(1);
                    if *left == 0 {
                        tracing::info!("requested frame count reached");
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut state) = self.state.take() {
            state.shutdown();
        }
    }
}

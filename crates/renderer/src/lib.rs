//! OpenGL renderer for the fireball demo.
//!
//! The crate is layered bottom-up:
//!
//! ```text
//!   FrameLoop::tick ──▶ Renderer::render ──▶ ShaderProgram::{set_*, draw}
//!        │                    │                       │
//!        │ ParameterHandle    │ Camera                └─▶ GlBackend (glow)
//!        ▼                    ▼
//!   GeometryFactory      Drawable list
//! ```
//!
//! [`GlBackend`] is the only place GL calls are made. [`GlowBackend`] maps it
//! onto a live `glow` context; tests substitute a recorder so program,
//! renderer and frame-loop behaviour can be checked without a GPU.
//!
//! All types here are single-threaded and must be used on the thread that
//! owns the current GL context. The only cross-thread state is the
//! [`controls::ParameterHandle`] the frame loop snapshots each tick and the
//! [`StopHandle`] that cancels [`FrameLoop::run`].

mod backend;
mod error;
mod frame;
mod gpu;
mod render;
mod runtime;
mod scene;

pub use backend::{BlendMode, BufferTarget, GlBackend, PrimitiveMode, ShaderStage};
pub use error::{BufferKind, DrawError, ProgramError};
pub use frame::{FrameLoop, FramePrograms};
pub use gpu::{
    Attribute, GlowBackend, Gpu, ProgramBinder, ShaderProgram, ShaderSource, Uniform,
    UniformValues,
};
pub use render::{DrawReport, Renderer};
pub use runtime::{
    FpsCounter, FrameEvent, FrameSignal, LoopState, StopHandle, TickReport, TIME_STEP,
};
pub use scene::{Camera, Drawable, GeometryFactory};

/// Boxed geometry as produced by a [`GeometryFactory`].
pub type BoxedDrawable<B> = Box<dyn Drawable<B>>;

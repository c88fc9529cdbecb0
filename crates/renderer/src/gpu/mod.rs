//! GPU-side building blocks.
//!
//! - `context` implements the GL binding layer on top of `glow`.
//! - `binder` deduplicates program binds.
//! - `program` compiles, links and drives a single shader program.
//! - `uniforms` defines the shader semantics and the per-frame value bundle.
//!
//! [`Gpu`] pairs a backend with the binder that tracks its bound program;
//! every program operation borrows it.

mod binder;
mod context;
mod program;
mod uniforms;

pub use binder::ProgramBinder;
pub use context::GlowBackend;
pub use program::{ShaderProgram, ShaderSource};
pub use uniforms::{Attribute, Uniform, UniformValues};

use crate::backend::GlBackend;

/// A GL backend together with its program-binding state.
pub struct Gpu<B: GlBackend> {
    backend: B,
    binder: ProgramBinder<B::Program>,
}

impl<B: GlBackend> Gpu<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            binder: ProgramBinder::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn binder(&self) -> &ProgramBinder<B::Program> {
        &self.binder
    }

    /// Binds `program` unless it is already current.
    pub fn use_program(&self, program: B::Program) -> bool {
        self.binder.bind(&self.backend, program)
    }
}

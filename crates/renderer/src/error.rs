use crate::backend::ShaderStage;

/// Failures while building a [`crate::ShaderProgram`].
///
/// All of these are fatal: no partially built program is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {log}")]
    Link { log: String },
    #[error("program needs at least one vertex and one fragment stage")]
    MissingStage,
}

/// Buffers whose absence fails a draw.
///
/// Vertex attribute buffers are optional: a drawable that cannot bind one
/// simply leaves that attribute disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Index,
}

impl std::fmt::Display for BufferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferKind::Index => f.write_str("index"),
        }
    }
}

/// Per-draw failures. These abort one draw call, never the frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("drawable has no {buffer} buffer")]
    MissingCapability { buffer: BufferKind },
}

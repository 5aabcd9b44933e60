use std::fmt;

use thiserror::Error;

use crate::gpu::GlVersion;
use crate::render_loop::LoopState;

/// Pipeline stage a shader diagnostic came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompileStage {
    Vertex,
    Fragment,
    Link,
}

impl fmt::Display for CompileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompileStage::Vertex => "vertex shader",
            CompileStage::Fragment => "fragment shader",
            CompileStage::Link => "program link",
        };
        f.write_str(name)
    }
}

/// Errors raised while preparing or driving the preview.
///
/// None of these are retried. Compile and upload failures abort the load
/// that produced them and carry the raw driver text for display.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{stage} failed:\n{log}")]
    ShaderCompile { stage: CompileStage, log: String },

    #[error(
        "problem uploading {buffer} buffer: tried to upload {expected} bytes, uploaded {actual}"
    )]
    BufferUploadSizeMismatch {
        buffer: &'static str,
        expected: usize,
        actual: i64,
    },

    #[error("OpenGL {required} is required (you only have {found})")]
    UnsupportedGraphicsVersion { required: GlVersion, found: GlVersion },

    #[error("cannot create {what}: {reason}")]
    ResourceCreation { what: &'static str, reason: String },

    #[error("cannot {operation} while the render loop is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: LoopState,
    },
}

impl RenderError {
    /// Raw compiler or linker log, if this is a shader diagnostic.
    pub fn shader_log(&self) -> Option<&str> {
        match self {
            RenderError::ShaderCompile { log, .. } => Some(log),
            _ => None,
        }
    }

    /// Whether the process cannot continue after this error.
    ///
    /// Shader diagnostics are recoverable by editing the source; driver
    /// level failures are not.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            RenderError::ShaderCompile { .. } | RenderError::InvalidState { .. }
        )
    }
}

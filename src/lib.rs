//! Live preview host for GLSL fragment shaders drawn over a full-screen quad.

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod logging;
pub mod preprocess;
pub mod projection;
pub mod render_loop;
pub mod scene;
pub mod shader;
pub mod uniforms;

pub use error::{CompileStage, RenderError};
pub use render_loop::{LoopConfig, LoopState, RenderLoop};
pub use scene::{ParamField, SceneCommand, SceneParameters};
pub use shader::ShaderSource;

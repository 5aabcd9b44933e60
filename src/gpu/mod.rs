//! The slice of OpenGL the preview uses.
//!
//! Everything above this module talks to [`Gpu`] instead of `glow` so the
//! compile, upload and tick logic can run against [`fake::FakeGpu`] in tests.
//! Method names follow the GL entry points they wrap.

use std::fmt;

mod glow_backend;

#[cfg(test)]
pub(crate) mod fake;

/// OpenGL version as reported by the driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlVersion {
    pub major: u32,
    pub minor: u32,
}

impl GlVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for GlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

/// Component layout of a vertex attribute buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttribFormat {
    F32,
    /// Bytes mapped to `[0, 1]`, used for packed RGBA colours.
    U8Normalized,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3([f32; 3]),
    /// Column-major.
    Mat4([f32; 16]),
}

/// One attribute stream for [`Gpu::draw_indexed`].
#[derive(Debug, Copy, Clone)]
pub struct VertexAttribute<B> {
    pub location: u32,
    pub buffer: B,
    pub components: i32,
    pub format: AttribFormat,
}

/// Pixel rectangle the quad is drawn into, origin bottom-left.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub const fn sized(width: i32, height: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

pub trait Gpu {
    type Shader: Copy + fmt::Debug;
    type Program: Copy + fmt::Debug;
    type Buffer: Copy + fmt::Debug;
    type VertexArray: Copy + fmt::Debug;
    type UniformLocation: Clone + fmt::Debug;

    fn version(&self) -> GlVersion;

    fn create_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn bind_attrib_location(&self, program: Self::Program, index: u32, name: &str);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);

    /// `None` when the linked program has no active uniform of that name.
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
    fn set_uniform(&self, location: &Self::UniformLocation, value: UniformValue);

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    /// Uploads static data and returns the byte size the driver reports
    /// for the buffer afterwards.
    fn upload_buffer(&self, target: BufferTarget, buffer: Self::Buffer, data: &[u8]) -> i64;
    fn delete_buffer(&self, buffer: Self::Buffer);

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    fn set_viewport(&self, viewport: Viewport);
    /// Clears colour and depth and enables depth testing for the next draw.
    fn clear(&self, color: [f32; 4]);
    /// Binds the attribute streams and index buffer, then issues one
    /// indexed triangle-list draw of `count` `u32` indices.
    fn draw_indexed(
        &self,
        vertex_array: Self::VertexArray,
        attributes: &[VertexAttribute<Self::Buffer>],
        indices: Self::Buffer,
        count: i32,
    );
}

use eframe::glow::{self, HasContext};

use super::{
    AttribFormat, BufferTarget, GlVersion, Gpu, ShaderKind, UniformValue, VertexAttribute,
    Viewport,
};

// Every call below requires the context to be current on this thread. The
// preview only touches it from eframe's update and paint callbacks, which
// run on the thread that owns the context.

fn target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

impl Gpu for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;
    type VertexArray = glow::VertexArray;
    type UniformLocation = glow::UniformLocation;

    fn version(&self) -> GlVersion {
        let version = HasContext::version(self);
        GlVersion::new(version.major, version.minor)
    }

    fn create_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String> {
        let shader_type = match kind {
            ShaderKind::Vertex => glow::VERTEX_SHADER,
            ShaderKind::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { HasContext::create_shader(self, shader_type) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn bind_attrib_location(&self, program: Self::Program, index: u32, name: &str) {
        unsafe { HasContext::bind_attrib_location(self, program, index, name) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn set_uniform(&self, location: &Self::UniformLocation, value: UniformValue) {
        unsafe {
            match value {
                UniformValue::Float(v) => self.uniform_1_f32(Some(location), v),
                UniformValue::Vec3([x, y, z]) => self.uniform_3_f32(Some(location), x, y, z),
                UniformValue::Mat4(m) => self.uniform_matrix_4_f32_slice(Some(location), false, &m),
            }
        }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn upload_buffer(&self, buffer_target: BufferTarget, buffer: Self::Buffer, data: &[u8]) -> i64 {
        let gl_target = target(buffer_target);
        unsafe {
            self.bind_buffer(gl_target, Some(buffer));
            self.buffer_data_u8_slice(gl_target, data, glow::STATIC_DRAW);
            let reported = self.get_buffer_parameter_i32(gl_target, glow::BUFFER_SIZE);
            self.bind_buffer(gl_target, None);
            i64::from(reported)
        }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vertex_array) }
    }

    fn set_viewport(&self, viewport: Viewport) {
        unsafe { self.viewport(viewport.x, viewport.y, viewport.width, viewport.height) }
    }

    fn clear(&self, [r, g, b, a]: [f32; 4]) {
        unsafe {
            self.enable(glow::DEPTH_TEST);
            self.clear_color(r, g, b, a);
            HasContext::clear(self, glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn draw_indexed(
        &self,
        vertex_array: Self::VertexArray,
        attributes: &[VertexAttribute<Self::Buffer>],
        indices: Self::Buffer,
        count: i32,
    ) {
        unsafe {
            self.bind_vertex_array(Some(vertex_array));
            for attribute in attributes {
                let (data_type, normalized) = match attribute.format {
                    AttribFormat::F32 => (glow::FLOAT, false),
                    AttribFormat::U8Normalized => (glow::UNSIGNED_BYTE, true),
                };
                self.bind_buffer(glow::ARRAY_BUFFER, Some(attribute.buffer));
                self.enable_vertex_attrib_array(attribute.location);
                self.vertex_attrib_pointer_f32(
                    attribute.location,
                    attribute.components,
                    data_type,
                    normalized,
                    0,
                    0,
                );
            }
            self.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(indices));
            self.draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_INT, 0);

            for attribute in attributes {
                self.disable_vertex_attrib_array(attribute.location);
            }
            self.bind_vertex_array(None);
            self.bind_buffer(glow::ARRAY_BUFFER, None);
            // egui paints on top of us with depth testing off.
            self.disable(glow::DEPTH_TEST);
        }
    }
}

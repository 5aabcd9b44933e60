//! Shader sources, prefixes and compilation into a linked program.

use std::io;
use std::path::Path;

use log::{info, warn};

use crate::error::{CompileStage, RenderError};
use crate::gpu::{GlVersion, Gpu, ShaderKind};
use crate::uniforms::{UniformBindings, HOST_UNIFORMS, SCENE_UNIFORMS};

/// Body shown when no shader file is given.
pub const DEFAULT_FRAGMENT: &str = include_str!("../shaders/water.glsl");

pub const ATTRIB_POSITION: (u32, &str) = (0, "a_position");
pub const ATTRIB_COLOR: (u32, &str) = (1, "a_color");

/// User-authored fragment body, one entry per line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShaderSource {
    lines: Vec<String>,
}

impl ShaderSource {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect(),
        }
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        std::fs::read_to_string(path).map(|text| Self::from_text(&text))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Which uniforms the fragment prefix declares.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PrefixMode {
    /// Every uniform the host writes, so no binding silently misses.
    #[default]
    Full,
    /// Only `iResolution` and `iGlobalTime`; bodies declare the scene
    /// uniforms themselves.
    Legacy,
}

/// `#version` line plus uniform declarations placed ahead of the body.
pub fn fragment_prefix(glsl_version: &str, mode: PrefixMode) -> String {
    let mut prefix = format!("#version {glsl_version}\n");
    let scene: &[_] = match mode {
        PrefixMode::Full => &SCENE_UNIFORMS,
        PrefixMode::Legacy => &[],
    };
    for decl in HOST_UNIFORMS.iter().chain(scene) {
        prefix.push_str(&decl.declaration());
        prefix.push('\n');
    }
    prefix
}

fn glsl_number(glsl_version: &str) -> Option<u32> {
    let digits: String = glsl_version
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn uses_legacy_syntax(glsl_version: &str) -> bool {
    glsl_number(glsl_version).map_or(true, |v| v < 130)
}

/// Lowest OpenGL version whose GLSL accepts `#version <glsl_version>`.
pub fn required_gl_version(glsl_version: &str) -> GlVersion {
    let (major, minor) = match glsl_number(glsl_version) {
        None | Some(..=110) => (2, 0),
        Some(111..=120) => (2, 1),
        Some(121..=130) => (3, 0),
        Some(131..=140) => (3, 1),
        Some(141..=150) => (3, 2),
        Some(v) => (v / 100, v % 100 / 10),
    };
    GlVersion::new(major, minor)
}

/// Built-in vertex stage: forwards the vertex colour and places the quad
/// through `u_projection * u_modelview`.
pub fn vertex_source(glsl_version: &str) -> String {
    let (input, output) = if uses_legacy_syntax(glsl_version) {
        ("attribute", "varying")
    } else {
        ("in", "out")
    };
    let (_, position) = ATTRIB_POSITION;
    let (_, color) = ATTRIB_COLOR;
    format!(
        r#"#version {glsl_version}
{input} vec3 {position};
{input} vec4 {color};
uniform mat4 u_projection;
uniform mat4 u_modelview;
{output} vec4 v_color;

void main()
{{
    v_color = {color};
    gl_Position = u_projection * u_modelview * vec4({position}, 1.0);
}}
"#
    )
}

/// Vertex shader, fragment shader and the program linking them.
///
/// Exists only when all three are valid; a failure at any step releases
/// what was created before it.
pub struct CompiledProgram<G: Gpu> {
    vertex: G::Shader,
    fragment: G::Shader,
    program: G::Program,
    bindings: UniformBindings<G>,
}

impl<G: Gpu> CompiledProgram<G> {
    /// Compiles both stages, links them and makes the program current.
    pub fn compile(gpu: &G, vertex_src: &str, fragment_src: &str) -> Result<Self, RenderError> {
        let vertex = compile_stage(gpu, ShaderKind::Vertex, vertex_src)?;
        let fragment =
            compile_stage(gpu, ShaderKind::Fragment, fragment_src).map_err(|e| {
                gpu.delete_shader(vertex);
                e
            })?;

        let program = gpu.create_program().map_err(|reason| {
            gpu.delete_shader(vertex);
            gpu.delete_shader(fragment);
            RenderError::ResourceCreation {
                what: "shader program",
                reason,
            }
        })?;

        gpu.attach_shader(program, vertex);
        gpu.attach_shader(program, fragment);
        for (index, name) in [ATTRIB_POSITION, ATTRIB_COLOR] {
            gpu.bind_attrib_location(program, index, name);
        }
        gpu.link_program(program);

        if !gpu.program_link_status(program) {
            let log = non_empty(gpu.program_info_log(program));
            gpu.detach_shader(program, vertex);
            gpu.detach_shader(program, fragment);
            gpu.delete_program(program);
            gpu.delete_shader(vertex);
            gpu.delete_shader(fragment);
            return Err(RenderError::ShaderCompile {
                stage: CompileStage::Link,
                log,
            });
        }

        gpu.use_program(Some(program));
        let bindings = UniformBindings::resolve(gpu, program);
        info!("shader program linked");

        Ok(Self {
            vertex,
            fragment,
            program,
            bindings,
        })
    }

    pub fn program(&self) -> G::Program {
        self.program
    }

    pub fn bindings(&self) -> &UniformBindings<G> {
        &self.bindings
    }

    /// Deletes the program and both shader objects.
    pub fn release(self, gpu: &G) {
        gpu.use_program(None);
        gpu.detach_shader(self.program, self.vertex);
        gpu.detach_shader(self.program, self.fragment);
        gpu.delete_program(self.program);
        gpu.delete_shader(self.vertex);
        gpu.delete_shader(self.fragment);
    }
}

fn non_empty(log: String) -> String {
    if log.trim().is_empty() {
        "(no diagnostic output from the driver)".to_owned()
    } else {
        log
    }
}

fn compile_stage<G: Gpu>(gpu: &G, kind: ShaderKind, source: &str) -> Result<G::Shader, RenderError> {
    let (stage, what) = match kind {
        ShaderKind::Vertex => (CompileStage::Vertex, "vertex shader"),
        ShaderKind::Fragment => (CompileStage::Fragment, "fragment shader"),
    };
    let shader = gpu
        .create_shader(kind)
        .map_err(|reason| RenderError::ResourceCreation { what, reason })?;
    gpu.shader_source(shader, source);
    gpu.compile_shader(shader);

    let log = gpu.shader_info_log(shader);
    if !gpu.shader_compile_status(shader) {
        gpu.delete_shader(shader);
        return Err(RenderError::ShaderCompile {
            stage,
            log: non_empty(log),
        });
    }
    if !log.trim().is_empty() {
        warn!("{what} compiled with warnings:\n{log}");
    }
    Ok(shader)
}

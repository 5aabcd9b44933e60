//! Recording stand-in for a GL context.
//!
//! Compilation is simulated: a stage fails when its braces or parentheses
//! do not balance or it has no `main`. Linking picks up every
//! `uniform <type> <name>;` line of the attached stages as an active
//! uniform.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::{
    BufferTarget, GlVersion, Gpu, ShaderKind, UniformValue, VertexAttribute, Viewport,
};

#[derive(Debug)]
struct FakeShader {
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<u32>,
    attribs: Vec<(u32, String)>,
    uniforms: Vec<String>,
    linked: bool,
    log: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeLocation {
    program: u32,
    name: String,
}

#[derive(Debug, Default)]
struct FakeState {
    next_id: u32,
    shaders: HashMap<u32, FakeShader>,
    programs: HashMap<u32, FakeProgram>,
    buffers: HashSet<u32>,
    vertex_arrays: HashSet<u32>,
    current_program: Option<u32>,
    uniform_writes: Vec<(String, UniformValue)>,
    viewport: Option<Viewport>,
    clears: u32,
    draw_calls: u32,
    indices_drawn: i32,
}

impl FakeState {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug)]
pub(crate) struct FakeGpu {
    version: GlVersion,
    reported_sizes: HashMap<usize, i64>,
    fail_link: bool,
    state: RefCell<FakeState>,
}

impl Default for FakeGpu {
    fn default() -> Self {
        Self {
            version: GlVersion::new(3, 3),
            reported_sizes: HashMap::new(),
            fail_link: false,
            state: RefCell::new(FakeState::default()),
        }
    }
}

impl FakeGpu {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_version(mut self, major: u32, minor: u32) -> Self {
        self.version = GlVersion::new(major, minor);
        self
    }

    /// Makes uploads of `requested` bytes report `reported` bytes.
    pub(crate) fn with_reported_size(mut self, requested: usize, reported: i64) -> Self {
        self.reported_sizes.insert(requested, reported);
        self
    }

    pub(crate) fn with_failing_link(mut self) -> Self {
        self.fail_link = true;
        self
    }

    pub(crate) fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub(crate) fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub(crate) fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub(crate) fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub(crate) fn current_program(&self) -> Option<u32> {
        self.state.borrow().current_program
    }

    pub(crate) fn draw_calls(&self) -> u32 {
        self.state.borrow().draw_calls
    }

    pub(crate) fn clears(&self) -> u32 {
        self.state.borrow().clears
    }

    pub(crate) fn indices_drawn(&self) -> i32 {
        self.state.borrow().indices_drawn
    }

    pub(crate) fn viewport(&self) -> Option<Viewport> {
        self.state.borrow().viewport
    }

    /// Last value written to the uniform called `name`.
    pub(crate) fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .uniform_writes
            .iter()
            .rev()
            .find(|(written, _)| written == name)
            .map(|(_, value)| *value)
    }

    pub(crate) fn uniform_writes(&self) -> usize {
        self.state.borrow().uniform_writes.len()
    }

    /// Attribute bindings recorded on `program` before it was linked.
    pub(crate) fn attrib_bindings(&self, program: u32) -> Vec<(u32, String)> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.attribs.clone())
            .unwrap_or_default()
    }
}

fn simulate_compile(source: &str) -> (bool, String) {
    let mut depth_brace = 0i32;
    let mut depth_paren = 0i32;
    let mut line = 1;
    for ch in source.chars() {
        match ch {
            '{' => depth_brace += 1,
            '}' => depth_brace -= 1,
            '(' => depth_paren += 1,
            ')' => depth_paren -= 1,
            '\n' => line += 1,
            _ => {}
        }
        if depth_brace < 0 || depth_paren < 0 {
            return (false, format!("0:{line}(1): error: syntax error, unexpected '{ch}'"));
        }
    }
    if depth_brace != 0 || depth_paren != 0 {
        return (
            false,
            format!("0:{line}(1): error: syntax error, unexpected end of file"),
        );
    }
    if !source.contains("main") {
        return (false, "error: no function with name 'main'".to_owned());
    }
    (true, String::new())
}

fn declared_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source.lines().filter_map(|line| {
        let line = line.trim();
        let rest = line.strip_prefix("uniform ")?;
        let name = rest.trim_end_matches(';').split_whitespace().last()?;
        Some(name.to_owned())
    })
}

impl Gpu for FakeGpu {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type UniformLocation = FakeLocation;

    fn version(&self) -> GlVersion {
        self.version
    }

    fn create_shader(&self, _kind: ShaderKind) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.shaders.insert(
            id,
            FakeShader {
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            let (ok, log) = simulate_compile(&s.source);
            s.compiled = ok;
            s.log = log;
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.programs.insert(id, FakeProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|s| *s != shader);
        }
    }

    fn bind_attrib_location(&self, program: u32, index: u32, name: &str) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attribs.push((index, name.to_owned()));
        }
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let Some(attached) = state.programs.get(&program).map(|p| p.attached.clone()) else {
            return;
        };
        let all_compiled = attached
            .iter()
            .all(|s| state.shaders.get(s).is_some_and(|s| s.compiled));
        let uniforms: Vec<String> = attached
            .iter()
            .filter_map(|s| state.shaders.get(s))
            .flat_map(|s| declared_uniforms(&s.source).collect::<Vec<_>>())
            .collect();
        let fail_link = self.fail_link;
        if let Some(p) = state.programs.get_mut(&program) {
            if fail_link || !all_compiled {
                p.linked = false;
                p.log = "error: linking with uncompiled/unspecialized shader".to_owned();
            } else {
                p.linked = true;
                p.uniforms = uniforms;
            }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().current_program = program;
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current_program == Some(program) {
            state.current_program = None;
        }
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<FakeLocation> {
        let state = self.state.borrow();
        let p = state.programs.get(&program)?;
        p.uniforms.iter().any(|u| u == name).then(|| FakeLocation {
            program,
            name: name.to_owned(),
        })
    }

    fn set_uniform(&self, location: &FakeLocation, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        assert_eq!(
            state.current_program,
            Some(location.program),
            "uniform written while another program is current"
        );
        state.uniform_writes.push((location.name.clone(), value));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.buffers.insert(id);
        Ok(id)
    }

    fn upload_buffer(&self, _target: BufferTarget, _buffer: u32, data: &[u8]) -> i64 {
        self.reported_sizes
            .get(&data.len())
            .copied()
            .unwrap_or(data.len() as i64)
    }

    fn delete_buffer(&self, buffer: u32) {
        self.state.borrow_mut().buffers.remove(&buffer);
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.vertex_arrays.insert(id);
        Ok(id)
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.state.borrow_mut().vertex_arrays.remove(&vertex_array);
    }

    fn set_viewport(&self, viewport: Viewport) {
        self.state.borrow_mut().viewport = Some(viewport);
    }

    fn clear(&self, _color: [f32; 4]) {
        self.state.borrow_mut().clears += 1;
    }

    fn draw_indexed(
        &self,
        _vertex_array: u32,
        _attributes: &[VertexAttribute<u32>],
        _indices: u32,
        count: i32,
    ) {
        let mut state = self.state.borrow_mut();
        state.draw_calls += 1;
        state.indices_drawn += count;
    }
}

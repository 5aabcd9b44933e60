//! The update-then-render driver.
//!
//! ```text
//! Uninitialized --initialize--> Ready --start--> Running --exit--> ShuttingDown
//!       |                                                              |
//!       +---------- failure ----------> Terminated <----- shutdown ----+
//! ```

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info, trace, warn};

use crate::clock::SimClock;
use crate::error::RenderError;
use crate::geometry::{GeometryBuffer, Mesh, QUAD};
use crate::gpu::{GlVersion, Gpu, Viewport};
use crate::preprocess::fragment_source;
use crate::projection::Projection;
use crate::scene::{SceneCommand, SceneParameters};
use crate::shader::{
    fragment_prefix, required_gl_version, vertex_source, CompiledProgram, PrefixMode,
    ShaderSource,
};
use crate::uniforms::FrameUniforms;

pub type CommandSender = Sender<SceneCommand>;
pub type CommandReceiver = Receiver<SceneCommand>;

/// Queue carrying edits from input handling and the UI to the loop.
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    crossbeam_channel::unbounded()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Ready,
    Running,
    ShuttingDown,
    Terminated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    pub tick_rate_hz: f64,
    pub time_speed: f32,
    pub glsl_version: String,
    pub prefix: PrefixMode,
    /// Floor for the context version; raised further by `glsl_version`.
    pub min_gl_version: GlVersion,
    pub clear_color: [f32; 4],
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 30.0,
            time_speed: 1.0,
            glsl_version: "120".to_owned(),
            prefix: PrefixMode::Full,
            // Vertex array objects.
            min_gl_version: GlVersion::new(3, 0),
            // Midnight blue.
            clear_color: [25.0 / 255.0, 25.0 / 255.0, 112.0 / 255.0, 1.0],
        }
    }
}

impl LoopConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1.0))
    }
}

/// What one tick did.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub draw_calls: u32,
    pub uniforms_written: usize,
    pub menu_requested: bool,
    pub exit_requested: bool,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub draw_calls: u64,
}

/// Owns the compiled program, the quad buffers and the live parameters.
///
/// GPU resources are released only through [`RenderLoop::shutdown`], which
/// needs the context; dropping a loop that still holds them leaks them.
pub struct RenderLoop<G: Gpu> {
    config: LoopConfig,
    state: LoopState,
    mesh: Mesh<'static>,
    program: Option<CompiledProgram<G>>,
    geometry: Option<GeometryBuffer<G>>,
    params: SceneParameters,
    clock: SimClock,
    commands: CommandReceiver,
    projection: Projection,
    stats: FrameStats,
}

impl<G: Gpu> RenderLoop<G> {
    pub fn new(config: LoopConfig, commands: CommandReceiver) -> Self {
        Self::with_mesh(config, commands, QUAD)
    }

    pub fn with_mesh(config: LoopConfig, commands: CommandReceiver, mesh: Mesh<'static>) -> Self {
        let clock = SimClock::new(config.time_speed);
        Self {
            config,
            state: LoopState::Uninitialized,
            mesh,
            program: None,
            geometry: None,
            params: SceneParameters::default(),
            clock,
            commands,
            projection: Projection::default(),
            stats: FrameStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn params(&self) -> &SceneParameters {
        &self.params
    }

    pub fn global_time(&self) -> f32 {
        self.clock.global_time()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn viewport(&self) -> Viewport {
        self.projection.viewport
    }

    fn expect_state(&self, allowed: &[LoopState], operation: &'static str) -> Result<(), RenderError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(RenderError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn fragment_text(&self, source: &ShaderSource) -> String {
        let prefix = fragment_prefix(&self.config.glsl_version, self.config.prefix);
        fragment_source(&prefix, source.lines())
    }

    /// Checks the GL version, uploads the quad and compiles `source`.
    ///
    /// On failure every resource created so far is released and the loop
    /// is `Terminated`.
    pub fn initialize(&mut self, gpu: &G, source: &ShaderSource) -> Result<(), RenderError> {
        self.expect_state(&[LoopState::Uninitialized], "initialize")?;
        match self.try_initialize(gpu, source) {
            Ok(()) => {
                self.state = LoopState::Ready;
                info!("render loop ready");
                Ok(())
            }
            Err(err) => {
                error!("initialization failed: {err}");
                self.release(gpu);
                self.state = LoopState::Terminated;
                Err(err)
            }
        }
    }

    fn try_initialize(&mut self, gpu: &G, source: &ShaderSource) -> Result<(), RenderError> {
        let found = gpu.version();
        let required = self
            .config
            .min_gl_version
            .max(required_gl_version(&self.config.glsl_version));
        if found < required {
            return Err(RenderError::UnsupportedGraphicsVersion { required, found });
        }
        debug!("OpenGL {found} available");

        self.geometry = Some(GeometryBuffer::create(gpu, &self.mesh)?);

        let vertex = vertex_source(&self.config.glsl_version);
        let fragment = self.fragment_text(source);
        self.program = Some(CompiledProgram::compile(gpu, &vertex, &fragment)?);
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), RenderError> {
        self.expect_state(&[LoopState::Ready], "start")?;
        self.state = LoopState::Running;
        info!("render loop running at {} Hz", self.config.tick_rate_hz);
        Ok(())
    }

    /// Updates the projection for a new drawable size. Applied on the next tick.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.projection.viewport {
            debug!("viewport resized to {}x{}", viewport.width, viewport.height);
            self.projection = Projection::for_viewport(viewport);
        }
    }

    /// Applies queued commands, advances time and draws one frame.
    ///
    /// An exit request in the queue moves the loop to `ShuttingDown`
    /// and nothing is drawn.
    pub fn tick(&mut self, gpu: &G, frame_delta: f32) -> Result<TickReport, RenderError> {
        self.expect_state(&[LoopState::Running], "tick")?;
        let mut report = TickReport::default();

        for command in self.commands.try_iter() {
            match command {
                SceneCommand::RequestMenu => report.menu_requested = true,
                SceneCommand::RequestExit => report.exit_requested = true,
                edit => {
                    trace!("applying {edit:?}");
                    self.params.apply(edit);
                }
            }
        }
        if report.exit_requested {
            info!("exit requested");
            self.state = LoopState::ShuttingDown;
            return Ok(report);
        }

        self.clock.advance(frame_delta);
        report.uniforms_written = self.draw(gpu)?;
        report.draw_calls = 1;
        Ok(report)
    }

    /// Draws the current parameters and time again without draining the
    /// queue or advancing the clock.
    pub fn redraw(&mut self, gpu: &G) -> Result<(), RenderError> {
        self.expect_state(&[LoopState::Running], "redraw")?;
        self.draw(gpu).map(|_| ())
    }

    fn draw(&mut self, gpu: &G) -> Result<usize, RenderError> {
        let (Some(program), Some(geometry)) = (&self.program, &self.geometry) else {
            return Err(RenderError::InvalidState {
                operation: "draw without resources",
                state: self.state,
            });
        };

        gpu.use_program(Some(program.program()));
        let frame = FrameUniforms {
            params: &self.params,
            projection: &self.projection,
            global_time: self.clock.global_time(),
        };
        let written = program.bindings().upload(gpu, &frame);

        gpu.set_viewport(self.projection.viewport);
        gpu.clear(self.config.clear_color);
        geometry.draw(gpu);

        self.stats.frames += 1;
        self.stats.draw_calls += 1;
        Ok(written)
    }

    /// Asks a ready or running loop to stop.
    pub fn request_exit(&mut self) {
        if matches!(self.state, LoopState::Ready | LoopState::Running) {
            self.state = LoopState::ShuttingDown;
        }
    }

    /// Compiles `source` and swaps it in. On failure the current program
    /// stays in use and the error is returned.
    pub fn reload(&mut self, gpu: &G, source: &ShaderSource) -> Result<(), RenderError> {
        self.expect_state(&[LoopState::Ready, LoopState::Running], "reload")?;
        let vertex = vertex_source(&self.config.glsl_version);
        let fragment = self.fragment_text(source);
        let compiled = CompiledProgram::compile(gpu, &vertex, &fragment).map_err(|err| {
            error!("reload failed, keeping previous program: {err}");
            if let Some(previous) = &self.program {
                gpu.use_program(Some(previous.program()));
            }
            err
        })?;

        if let Some(previous) = self.program.take() {
            previous.release(gpu);
        }
        gpu.use_program(Some(compiled.program()));
        self.program = Some(compiled);
        info!("shader reloaded");
        Ok(())
    }

    /// Releases the program, then the quad buffers. Safe to call twice.
    pub fn shutdown(&mut self, gpu: &G) {
        if self.state == LoopState::Terminated && self.program.is_none() && self.geometry.is_none() {
            return;
        }
        self.release(gpu);
        self.state = LoopState::Terminated;
        info!(
            "render loop terminated after {} frames",
            self.stats.frames
        );
    }

    fn release(&mut self, gpu: &G) {
        if let Some(program) = self.program.take() {
            program.release(gpu);
        }
        if let Some(geometry) = self.geometry.take() {
            geometry.release(gpu);
        }
    }
}

impl<G: Gpu> Drop for RenderLoop<G> {
    fn drop(&mut self) {
        if self.program.is_some() || self.geometry.is_some() {
            warn!("render loop dropped without shutdown; GPU resources leaked");
        }
    }
}

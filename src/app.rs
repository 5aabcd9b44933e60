//! eframe shell around the render loop: source editor, parameter panel,
//! menu windows and the paint callback that ticks the loop.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::Arc;

use eframe::{egui, egui_glow, glow};
use egui::mutex::Mutex;
use egui_code_editor::{CodeEditor, ColorTheme, Syntax};
use log::{error, info, warn};

use crate::clock::{FrameClock, TickGate};
use crate::error::RenderError;
use crate::gpu::{Gpu, Viewport};
use crate::input::{self, HeldKeys, HOTKEY_HELP};
use crate::render_loop::{
    command_queue, CommandReceiver, CommandSender, LoopConfig, LoopState, RenderLoop, TickReport,
};
use crate::scene::{ParamField, SceneCommand};
use crate::shader::ShaderSource;

const FIELD_RANGE: RangeInclusive<f32> = -100.0..=100.0;

/// Everything the paint callback touches.
///
/// Paints arrive whenever egui repaints; ticks happen only once per
/// interval of the configured rate. Held keys are routed at tick time, so
/// a held key moves its parameter once per tick however often egui paints.
struct Preview<G: Gpu> {
    config: LoopConfig,
    render_loop: RenderLoop<G>,
    commands: CommandSender,
    receiver: CommandReceiver,
    held: HeldKeys,
    gate: TickGate,
    frame_clock: FrameClock,
    menu_requested: bool,
}

impl<G: Gpu> Preview<G> {
    fn new(config: LoopConfig) -> Self {
        let (commands, receiver) = command_queue();
        Self {
            render_loop: RenderLoop::new(config.clone(), receiver.clone()),
            gate: TickGate::new(config.tick_interval()),
            config,
            commands,
            receiver,
            held: HeldKeys::default(),
            frame_clock: FrameClock::new(),
            menu_requested: false,
        }
    }

    fn start(&mut self, gpu: &G, source: &ShaderSource) -> Result<(), RenderError> {
        self.render_loop.initialize(gpu, source)?;
        self.render_loop.start()?;
        self.gate.reset();
        self.frame_clock.reset();
        Ok(())
    }

    /// Swaps `source` into a live loop, or starts a fresh loop when the
    /// previous one never came up. Edits queued in the meantime apply on
    /// the fresh loop's first tick.
    fn recompile(&mut self, gpu: &G, source: &ShaderSource) -> Result<(), RenderError> {
        match self.render_loop.state() {
            LoopState::Ready | LoopState::Running => self.render_loop.reload(gpu, source),
            LoopState::Uninitialized => self.start(gpu, source),
            LoopState::Terminated => {
                self.render_loop.shutdown(gpu);
                self.render_loop = RenderLoop::new(self.config.clone(), self.receiver.clone());
                self.start(gpu, source)
            }
            LoopState::ShuttingDown => Ok(()),
        }
    }

    fn send(&self, command: SceneCommand) {
        if self.commands.send(command).is_err() {
            warn!("command queue closed, dropped {command:?}");
        }
    }

    fn hold(&mut self, held: HeldKeys) {
        self.held = held;
    }

    fn paint(&mut self, gpu: &G, viewport: Viewport) {
        let frame_delta = self.frame_clock.tick();
        if let Err(err) = self.advance(gpu, viewport, frame_delta) {
            error!("frame failed: {err}");
        }
    }

    /// Draws one frame. Returns the tick report when a tick was due;
    /// otherwise the current uniforms are drawn again.
    fn advance(
        &mut self,
        gpu: &G,
        viewport: Viewport,
        frame_delta: f32,
    ) -> Result<Option<TickReport>, RenderError> {
        if self.render_loop.state() != LoopState::Running {
            return Ok(None);
        }
        self.render_loop.resize(viewport);

        let Some(tick_delta) = self.gate.advance(frame_delta) else {
            self.render_loop.redraw(gpu)?;
            return Ok(None);
        };
        for command in input::route(&self.held) {
            self.send(command);
        }
        let report = self.render_loop.tick(gpu, tick_delta)?;
        self.menu_requested |= report.menu_requested;
        Ok(Some(report))
    }
}

fn canvas_viewport(info: &egui::PaintCallbackInfo) -> Viewport {
    let pixels = info.viewport_in_pixels();
    Viewport {
        x: pixels.left_px,
        y: pixels.from_bottom_px,
        width: pixels.width_px,
        height: pixels.height_px,
    }
}

pub struct FragviewApp {
    gl: Arc<glow::Context>,
    config: LoopConfig,
    preview: Arc<Mutex<Preview<glow::Context>>>,
    source_text: String,
    source_path: Option<PathBuf>,
    last_error: Option<String>,
    editor_open: bool,
    fields_open: bool,
    menu_open: bool,
    hotkeys_open: bool,
}

impl FragviewApp {
    /// Builds the render loop on eframe's GL context and compiles `source`.
    ///
    /// A shader that fails to compile keeps the window up with the log on
    /// screen. Any other failure is returned.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: LoopConfig,
        source: ShaderSource,
        source_path: Option<PathBuf>,
    ) -> Result<Self, RenderError> {
        let gl = cc.gl.clone().ok_or_else(|| RenderError::ResourceCreation {
            what: "OpenGL context",
            reason: "eframe must run with the glow renderer".to_owned(),
        })?;

        let mut preview: Preview<glow::Context> = Preview::new(config.clone());
        let last_error = match preview.start(&*gl, &source) {
            Ok(()) => None,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => Some(err.to_string()),
        };

        Ok(Self {
            gl,
            config,
            preview: Arc::new(Mutex::new(preview)),
            source_text: source.to_text(),
            source_path,
            editor_open: last_error.is_some(),
            last_error,
            fields_open: false,
            menu_open: false,
            hotkeys_open: false,
        })
    }

    fn recompile(&mut self) {
        let source = ShaderSource::from_text(&self.source_text);
        let result = self.preview.lock().recompile(&self.gl, &source);
        match result {
            Ok(()) => self.last_error = None,
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }

    fn open_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Open fragment shader")
            .add_filter("GLSL", &["glsl", "frag", "fs", "txt"])
            .pick_file()
        else {
            return;
        };

        match ShaderSource::load(&path) {
            Ok(source) => {
                info!("loaded {}", path.display());
                self.source_text = source.to_text();
                self.source_path = Some(path);
                self.recompile();
            }
            Err(err) => {
                warn!("cannot read {}: {err}", path.display());
                self.last_error = Some(format!("cannot read {}: {err}", path.display()));
            }
        }
    }
}

fn glsl_syntax() -> Syntax {
    Syntax::new("glsl")
        .with_comment("//")
        .with_comment_multiline(["/*", "*/"])
        .with_keywords(BTreeSet::from([
            "attribute", "break", "const", "continue", "discard", "do", "else", "for", "if",
            "in", "inout", "out", "return", "uniform", "varying", "while",
        ]))
        .with_types(BTreeSet::from([
            "bool", "float", "int", "mat2", "mat3", "mat4", "sampler2D", "vec2", "vec3", "vec4",
            "void",
        ]))
        .with_special(BTreeSet::from([
            "gl_FragColor", "gl_FragCoord", "iCameraPosition", "iGlobalTime",
            "iResolution", "BallSize", "DepthPool", "HalfSizePool", "LightPos", "WaterNumber",
            "main",
        ]))
}

impl eframe::App for FragviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (state, menu_requested, params, global_time, stats) = {
            let mut preview = self.preview.lock();
            let menu_requested = std::mem::take(&mut preview.menu_requested);
            let render_loop = &preview.render_loop;
            (
                render_loop.state(),
                menu_requested,
                render_loop.params().clone(),
                render_loop.global_time(),
                render_loop.stats(),
            )
        };

        if state == LoopState::ShuttingDown {
            self.preview.lock().render_loop.shutdown(&self.gl);
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }
        if menu_requested {
            self.menu_open = true;
        }

        let held = if state == LoopState::Running && !ctx.wants_keyboard_input() {
            ctx.input(HeldKeys::from_egui)
        } else {
            HeldKeys::default()
        };
        self.preview.lock().hold(held);

        // Drawn first on the background layer so the panels cover it. The
        // preview spans the whole window, keeping gl_FragCoord in step with
        // iResolution.
        let screen = ctx.screen_rect();
        let background = ctx.layer_painter(egui::LayerId::background());
        if state == LoopState::Running {
            let preview = self.preview.clone();
            background.add(egui::PaintCallback {
                rect: screen,
                callback: Arc::new(egui_glow::CallbackFn::new(move |info, painter| {
                    preview.lock().paint(painter.gl(), canvas_viewport(&info));
                })),
            });
        } else {
            background.rect_filled(screen, 0.0, egui::Color32::BLACK);
        }

        let mut open_clicked = false;
        let mut compile_clicked = false;
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("fragview");
                if ui.button("Open…").clicked() {
                    open_clicked = true;
                }
                if ui.button("Compile").clicked() {
                    compile_clicked = true;
                }
                ui.toggle_value(&mut self.editor_open, "Source");
                ui.toggle_value(&mut self.fields_open, "Fields");
                ui.toggle_value(&mut self.menu_open, "Menu");
                ui.separator();
                ui.label(format!("t = {global_time:.2}s  frames {}", stats.frames));
            });

            if let Some(path) = &self.source_path {
                ui.label(path.display().to_string());
            }
            if let Some(err) = &self.last_error {
                egui::ScrollArea::vertical()
                    .max_height(160.0)
                    .show(ui, |ui| {
                        ui.colored_label(egui::Color32::RED, err);
                    });
            }
        });
        if open_clicked {
            self.open_file();
        }
        if compile_clicked {
            self.recompile();
        }

        if self.fields_open {
            let mut edits = Vec::new();
            egui::SidePanel::left("fields").resizable(false).show(ctx, |ui| {
                ui.heading("Scene");
                egui::Grid::new("field grid").num_columns(2).show(ui, |ui| {
                    for field in ParamField::ALL {
                        let mut value = params.get(field);
                        ui.label(field.label());
                        let response = ui.add(
                            egui::DragValue::new(&mut value)
                                .speed(0.01)
                                .range(FIELD_RANGE)
                                .fixed_decimals(2),
                        );
                        if response.changed() {
                            edits.push(SceneCommand::Set(field, value));
                        }
                        ui.end_row();
                    }
                });
            });
            let preview = self.preview.lock();
            for edit in edits {
                preview.send(edit);
            }
        }

        if self.editor_open {
            egui::SidePanel::right("source")
                .resizable(true)
                .default_width(420.0)
                .show(ctx, |ui| {
                    CodeEditor::default()
                        .id_source("fragment source")
                        .with_rows(32)
                        .with_fontsize(13.0)
                        .with_theme(ColorTheme::GRUVBOX)
                        .with_syntax(glsl_syntax())
                        .with_numlines(true)
                        .show(ui, &mut self.source_text);
                });
        }

        let mut menu_open = self.menu_open;
        let mut close_menu = false;
        let mut exit_clicked = false;
        egui::Window::new("Menu")
            .open(&mut menu_open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.vertical_centered_justified(|ui| {
                    if ui.button("Close menu").clicked() {
                        close_menu = true;
                    }
                    if ui.button("Hotkeys").clicked() {
                        self.hotkeys_open = true;
                    }
                    if ui.button("Edit fields").clicked() {
                        self.fields_open = true;
                        close_menu = true;
                    }
                    if ui.button("Exit").clicked() {
                        exit_clicked = true;
                    }
                });
            });
        self.menu_open = menu_open && !close_menu;

        egui::Window::new("Hotkeys")
            .open(&mut self.hotkeys_open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("hotkey grid").striped(true).show(ui, |ui| {
                    for (keys, action) in HOTKEY_HELP {
                        ui.monospace(*keys);
                        ui.label(*action);
                        ui.end_row();
                    }
                });
            });

        if exit_clicked {
            if state == LoopState::Running {
                self.preview.lock().send(SceneCommand::RequestExit);
            } else {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |_ui| {});

        // Paint faster than the tick rate so timer jitter never skips a tick.
        ctx.request_repaint_after(self.config.tick_interval() / 4);
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        let gl = gl.unwrap_or(self.gl.as_ref());
        self.preview.lock().render_loop.shutdown(gl);
    }
}

use anyhow::{anyhow, Context as _};
use clap::Parser;
use eframe::egui;

use fragview::app::FragviewApp;
use fragview::config::Args;
use fragview::logging::{self, LoggingConfig};
use fragview::shader::{ShaderSource, DEFAULT_FRAGMENT};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(LoggingConfig {
        env_filter: args.log_filter.clone(),
        ..LoggingConfig::default()
    });

    let source = match &args.shader {
        Some(path) => ShaderSource::load(path)
            .with_context(|| format!("cannot read shader {}", path.display()))?,
        None => ShaderSource::from_text(DEFAULT_FRAGMENT),
    };
    let config = args.loop_config();

    let native_options = eframe::NativeOptions {
        renderer: eframe::Renderer::Glow,
        depth_buffer: 24,
        viewport: egui::ViewportBuilder::default()
            .with_title("fragview")
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };
    let source_path = args.shader.clone();
    eframe::run_native(
        "fragview",
        native_options,
        Box::new(move |cc| Ok(Box::new(FragviewApp::new(cc, config, source, source_path)?))),
    )
    .map_err(|err| anyhow!("{err}"))
    .context("preview window failed")
}

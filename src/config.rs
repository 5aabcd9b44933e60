use std::path::PathBuf;

use clap::Parser;

use crate::render_loop::LoopConfig;
use crate::shader::PrefixMode;

/// Live preview for GLSL fragment shaders with editable scene uniforms.
#[derive(Debug, Parser)]
#[command(name = "fragview", version, about)]
pub struct Args {
    /// Fragment shader body to load. The built-in pool scene is used when omitted.
    pub shader: Option<PathBuf>,

    /// Target frame rate of the render loop.
    #[arg(long, default_value_t = 30.0)]
    pub tick_rate: f64,

    /// Declare only iResolution and iGlobalTime in the prefix, for shaders
    /// that declare the scene uniforms themselves.
    #[arg(long)]
    pub legacy_prefix: bool,

    /// Value of the `#version` line put in front of both stages.
    #[arg(long, default_value = "120")]
    pub glsl_version: String,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 512.0)]
    pub width: f32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 288.0)]
    pub height: f32,

    /// Log filter in env_logger syntax; overrides RUST_LOG.
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl Args {
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            tick_rate_hz: self.tick_rate,
            glsl_version: self.glsl_version.clone(),
            prefix: if self.legacy_prefix {
                PrefixMode::Legacy
            } else {
                PrefixMode::Full
            },
            ..LoopConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_loop_defaults() {
        let args = Args::parse_from(["fragview"]);
        assert!(args.shader.is_none());
        assert_eq!(args.loop_config(), LoopConfig::default());
    }

    #[test]
    fn flags_reach_loop_config() {
        let args = Args::parse_from([
            "fragview",
            "pool.glsl",
            "--tick-rate",
            "60",
            "--legacy-prefix",
            "--glsl-version",
            "330 core",
        ]);
        let config = args.loop_config();
        assert_eq!(args.shader, Some(PathBuf::from("pool.glsl")));
        assert_eq!(config.tick_rate_hz, 60.0);
        assert_eq!(config.prefix, PrefixMode::Legacy);
        assert_eq!(config.glsl_version, "330 core");
    }
}

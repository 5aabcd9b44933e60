//! Uniforms the host writes every frame, bound by name.
//!
//! A static table maps each uniform name to its GLSL type and a reader
//! over the frame state. Locations are looked up once per linked program
//! and reused until the next recompile.

use std::fmt;

use log::debug;

use crate::gpu::{Gpu, UniformValue};
use crate::projection::Projection;
use crate::scene::SceneParameters;

/// Everything a uniform value can be read from during one tick.
#[derive(Debug, Copy, Clone)]
pub struct FrameUniforms<'a> {
    pub params: &'a SceneParameters,
    pub projection: &'a Projection,
    pub global_time: f32,
}

pub struct UniformDecl {
    pub name: &'static str,
    pub glsl_type: &'static str,
    read: fn(&FrameUniforms<'_>) -> UniformValue,
}

impl fmt::Debug for UniformDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformDecl")
            .field("name", &self.name)
            .field("glsl_type", &self.glsl_type)
            .finish()
    }
}

impl UniformDecl {
    pub fn read(&self, frame: &FrameUniforms<'_>) -> UniformValue {
        (self.read)(frame)
    }

    /// `uniform <type> <name>;`
    pub fn declaration(&self) -> String {
        format!("uniform {} {};", self.glsl_type, self.name)
    }
}

fn resolution(f: &FrameUniforms<'_>) -> UniformValue {
    UniformValue::Vec3(f.projection.resolution())
}

fn global_time(f: &FrameUniforms<'_>) -> UniformValue {
    UniformValue::Float(f.global_time)
}

fn camera_position(f: &FrameUniforms<'_>) -> UniformValue {
    UniformValue::Vec3(f.params.camera_position)
}

fn half_size_pool(f: &FrameUniforms<'_>) -> UniformValue {
    UniformValue::Float(f.params.half_size_pool)
}

fn depth_pool(f: &FrameUniforms<'_>) -> UniformValue {
    UniformValue::Float(f.params.depth_pool)
}

fn ball_size(f: &FrameUniforms<'_>) -> UniformValue {
    UniformValue::Float(f.params.ball_size)
}

fn light_pos(f: &FrameUniforms<'_>) -> UniformValue {
    UniformValue::Vec3(f.params.light_pos)
}

fn water_number(f: &FrameUniforms<'_>) -> UniformValue {
    UniformValue::Vec3(f.params.water_number)
}

fn projection_matrix(f: &FrameUniforms<'_>) -> UniformValue {
    UniformValue::Mat4(f.projection.projection.to_cols_array())
}

fn modelview_matrix(f: &FrameUniforms<'_>) -> UniformValue {
    UniformValue::Mat4(f.projection.modelview.to_cols_array())
}

/// Shadertoy-style inputs every fragment body can rely on.
pub static HOST_UNIFORMS: [UniformDecl; 2] = [
    UniformDecl { name: "iResolution", glsl_type: "vec3", read: resolution },
    UniformDecl { name: "iGlobalTime", glsl_type: "float", read: global_time },
];

/// Scene parameters exposed to the fragment body.
pub static SCENE_UNIFORMS: [UniformDecl; 6] = [
    UniformDecl { name: "iCameraPosition", glsl_type: "vec3", read: camera_position },
    UniformDecl { name: "HalfSizePool", glsl_type: "float", read: half_size_pool },
    UniformDecl { name: "DepthPool", glsl_type: "float", read: depth_pool },
    UniformDecl { name: "BallSize", glsl_type: "float", read: ball_size },
    UniformDecl { name: "LightPos", glsl_type: "vec3", read: light_pos },
    UniformDecl { name: "WaterNumber", glsl_type: "vec3", read: water_number },
];

/// Declared by the built-in vertex stage.
pub static VERTEX_UNIFORMS: [UniformDecl; 2] = [
    UniformDecl { name: "u_projection", glsl_type: "mat4", read: projection_matrix },
    UniformDecl { name: "u_modelview", glsl_type: "mat4", read: modelview_matrix },
];

pub fn all() -> impl Iterator<Item = &'static UniformDecl> {
    HOST_UNIFORMS
        .iter()
        .chain(SCENE_UNIFORMS.iter())
        .chain(VERTEX_UNIFORMS.iter())
}

/// Resolved locations of every table entry for one linked program.
pub struct UniformBindings<G: Gpu> {
    slots: Vec<(&'static UniformDecl, Option<G::UniformLocation>)>,
}

impl<G: Gpu> UniformBindings<G> {
    /// Looks up every table entry. A name the program does not use is
    /// kept with no location and skipped on upload.
    pub fn resolve(gpu: &G, program: G::Program) -> Self {
        let slots = all()
            .map(|decl| {
                let location = gpu.uniform_location(program, decl.name);
                if location.is_none() {
                    debug!("uniform {} is not used by the program", decl.name);
                }
                (decl, location)
            })
            .collect();
        Self { slots }
    }

    /// Writes every located uniform; the program must be current.
    /// Returns how many were written.
    pub fn upload(&self, gpu: &G, frame: &FrameUniforms<'_>) -> usize {
        let mut written = 0;
        for (decl, location) in &self.slots {
            if let Some(location) = location {
                gpu.set_uniform(location, decl.read(frame));
                written += 1;
            }
        }
        written
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.slots
            .iter()
            .any(|(decl, location)| decl.name == name && location.is_some())
    }
}

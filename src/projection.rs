//! Fixed camera for the full-screen quad.

use glam::{Mat4, Vec3};

use crate::gpu::Viewport;

pub const ORTHO_WIDTH: f32 = 2.0;
pub const ORTHO_HEIGHT: f32 = 2.0;
pub const Z_NEAR: f32 = 1.0;
pub const Z_FAR: f32 = 64.0;

/// Viewport plus the matrices fed to the built-in vertex stage.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub viewport: Viewport,
    pub projection: Mat4,
    pub modelview: Mat4,
}

impl Projection {
    /// Re-evaluated on every resize. The extent stays 2x2 whatever the
    /// window aspect, so the quad always fills the viewport exactly.
    pub fn for_viewport(viewport: Viewport) -> Self {
        let (hw, hh) = (ORTHO_WIDTH / 2.0, ORTHO_HEIGHT / 2.0);
        Self {
            viewport,
            projection: Mat4::orthographic_rh_gl(-hw, hw, -hh, hh, Z_NEAR, Z_FAR),
            modelview: Mat4::look_at_rh(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::Y),
        }
    }

    /// `iResolution`: viewport size in pixels, z unused.
    pub fn resolution(&self) -> [f32; 3] {
        [
            self.viewport.width as f32,
            self.viewport.height as f32,
            0.0,
        ]
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::for_viewport(Viewport::default())
    }
}

//! Held-key polling into scene commands.
//!
//! Every tick the set of currently held keys is turned into `Adjust`
//! commands, so holding a key keeps moving its parameter.

use std::collections::HashSet;

use eframe::egui::{self, Key};

use crate::scene::{ParamField, SceneCommand};

pub const CAMERA_STEP: f32 = 0.1;
pub const POOL_STEP: f32 = 0.1;
pub const BALL_STEP: f32 = 0.05;
pub const TINT_STEP: f32 = 0.1;

/// Snapshot of the keyboard taken once per tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub keys: HashSet<Key>,
    pub alt: bool,
    pub ctrl: bool,
}

impl HeldKeys {
    pub fn from_egui(input: &egui::InputState) -> Self {
        Self {
            keys: input.keys_down.iter().copied().collect(),
            alt: input.modifiers.alt,
            ctrl: input.modifiers.ctrl,
        }
    }

    pub fn with(keys: &[Key]) -> Self {
        Self {
            keys: keys.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }
}

// Plain key pairs: (increase, decrease, field, step).
const PAIRED: [(Key, Key, ParamField, f32); 5] = [
    (Key::S, Key::W, ParamField::CameraZ, CAMERA_STEP),
    (Key::D, Key::A, ParamField::CameraX, CAMERA_STEP),
    (Key::Q, Key::E, ParamField::HalfSizePool, POOL_STEP),
    (Key::F, Key::R, ParamField::DepthPool, POOL_STEP),
    (Key::Z, Key::X, ParamField::BallSize, BALL_STEP),
];

// Keys that increase their field, or decrease it while Alt is held.
const ALT_REVERSED: [(Key, ParamField); 6] = [
    (Key::T, ParamField::LightX),
    (Key::Y, ParamField::LightY),
    (Key::U, ParamField::LightZ),
    (Key::G, ParamField::WaterX),
    (Key::H, ParamField::WaterY),
    (Key::J, ParamField::WaterZ),
];

/// Maps held keys to the commands for this tick.
///
/// Opposing keys held together both fire and cancel out, as they did when
/// each key was polled on its own.
pub fn route(held: &HeldKeys) -> Vec<SceneCommand> {
    let mut commands = Vec::new();

    if held.down(Key::Escape) {
        commands.push(SceneCommand::RequestMenu);
    }
    if held.down(Key::C) {
        commands.push(SceneCommand::RequestExit);
    }

    for (up, down, field, step) in PAIRED {
        if held.down(up) {
            commands.push(SceneCommand::Adjust(field, step));
        }
        if held.down(down) {
            commands.push(SceneCommand::Adjust(field, -step));
        }
    }

    if held.ctrl {
        commands.push(SceneCommand::Adjust(ParamField::CameraY, -CAMERA_STEP));
    }
    if held.down(Key::Space) {
        commands.push(SceneCommand::Adjust(ParamField::CameraY, CAMERA_STEP));
    }

    let sign = if held.alt { -1.0 } else { 1.0 };
    for (key, field) in ALT_REVERSED {
        if held.down(key) {
            commands.push(SceneCommand::Adjust(field, sign * TINT_STEP));
        }
    }

    commands
}

/// Rows for the hotkey help window.
pub const HOTKEY_HELP: &[(&str, &str)] = &[
    ("W, A, S, D, Ctrl, Space", "Move camera"),
    ("Escape", "Open menu"),
    ("Q / E", "Widen / narrow pool"),
    ("F / R", "Deepen / shallow pool"),
    ("Z / X", "Grow / shrink ball"),
    ("T, Y, U", "Move light along x y z"),
    ("Alt + (T, Y, U)", "Move light back along x y z"),
    ("G, H, J", "Raise water tint x y z"),
    ("Alt + (G, H, J)", "Lower water tint x y z"),
    ("C", "Exit"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keys_no_commands() {
        assert!(route(&HeldKeys::default()).is_empty());
    }

    #[test]
    fn w_moves_camera_forward() {
        let commands = route(&HeldKeys::with(&[Key::W]));
        assert_eq!(
            commands,
            vec![SceneCommand::Adjust(ParamField::CameraZ, -CAMERA_STEP)]
        );
    }

    #[test]
    fn space_and_ctrl_move_camera_vertically() {
        let mut held = HeldKeys::with(&[Key::Space]);
        assert_eq!(
            route(&held),
            vec![SceneCommand::Adjust(ParamField::CameraY, CAMERA_STEP)]
        );
        held.keys.clear();
        held.ctrl = true;
        assert_eq!(
            route(&held),
            vec![SceneCommand::Adjust(ParamField::CameraY, -CAMERA_STEP)]
        );
    }

    #[test]
    fn ball_keys_use_finer_step() {
        let commands = route(&HeldKeys::with(&[Key::X]));
        assert_eq!(
            commands,
            vec![SceneCommand::Adjust(ParamField::BallSize, -BALL_STEP)]
        );
    }

    #[test]
    fn alt_reverses_light_and_water_keys() {
        let mut held = HeldKeys::with(&[Key::T, Key::J]);
        assert_eq!(
            route(&held),
            vec![
                SceneCommand::Adjust(ParamField::LightX, TINT_STEP),
                SceneCommand::Adjust(ParamField::WaterZ, TINT_STEP),
            ]
        );
        held.alt = true;
        assert_eq!(
            route(&held),
            vec![
                SceneCommand::Adjust(ParamField::LightX, -TINT_STEP),
                SceneCommand::Adjust(ParamField::WaterZ, -TINT_STEP),
            ]
        );
    }

    #[test]
    fn alt_does_not_reverse_pool_keys() {
        let mut held = HeldKeys::with(&[Key::Q]);
        held.alt = true;
        assert_eq!(
            route(&held),
            vec![SceneCommand::Adjust(ParamField::HalfSizePool, POOL_STEP)]
        );
    }

    #[test]
    fn escape_and_c_are_control_requests() {
        let commands = route(&HeldKeys::with(&[Key::Escape, Key::C]));
        assert_eq!(
            commands,
            vec![SceneCommand::RequestMenu, SceneCommand::RequestExit]
        );
    }

    #[test]
    fn opposing_keys_both_fire() {
        let commands = route(&HeldKeys::with(&[Key::F, Key::R]));
        assert_eq!(commands.len(), 2);
        assert!(commands.contains(&SceneCommand::Adjust(ParamField::DepthPool, POOL_STEP)));
        assert!(commands.contains(&SceneCommand::Adjust(ParamField::DepthPool, -POOL_STEP)));
    }
}

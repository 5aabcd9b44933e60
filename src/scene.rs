//! Live scene parameters and the commands that edit them.

/// One editable scalar of [`SceneParameters`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ParamField {
    CameraX,
    CameraY,
    CameraZ,
    HalfSizePool,
    DepthPool,
    BallSize,
    LightX,
    LightY,
    LightZ,
    WaterX,
    WaterY,
    WaterZ,
}

impl ParamField {
    /// Editor order.
    pub const ALL: [ParamField; 12] = [
        ParamField::CameraX,
        ParamField::CameraY,
        ParamField::CameraZ,
        ParamField::HalfSizePool,
        ParamField::DepthPool,
        ParamField::BallSize,
        ParamField::LightX,
        ParamField::LightY,
        ParamField::LightZ,
        ParamField::WaterX,
        ParamField::WaterY,
        ParamField::WaterZ,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ParamField::CameraX => "Camera.X",
            ParamField::CameraY => "Camera.Y",
            ParamField::CameraZ => "Camera.Z",
            ParamField::HalfSizePool => "HalfSizePool",
            ParamField::DepthPool => "DepthPool",
            ParamField::BallSize => "BallSize",
            ParamField::LightX => "LightPos.X",
            ParamField::LightY => "LightPos.Y",
            ParamField::LightZ => "LightPos.Z",
            ParamField::WaterX => "WaterNumber.X",
            ParamField::WaterY => "WaterNumber.Y",
            ParamField::WaterZ => "WaterNumber.Z",
        }
    }

    /// Lowest value the field may take, if it has one.
    pub fn floor(self) -> Option<f32> {
        match self {
            ParamField::HalfSizePool | ParamField::DepthPool => Some(1.0),
            ParamField::BallSize => Some(0.2),
            _ => None,
        }
    }
}

/// Discrete command delivered to the render loop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SceneCommand {
    Adjust(ParamField, f32),
    Set(ParamField, f32),
    RequestMenu,
    RequestExit,
}

/// The uniforms a pool scene reads, owned by the render loop.
///
/// Floors are enforced when a value is edited, never when it is read.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneParameters {
    pub camera_position: [f32; 3],
    pub half_size_pool: f32,
    pub depth_pool: f32,
    pub ball_size: f32,
    pub light_pos: [f32; 3],
    pub water_number: [f32; 3],
}

impl Default for SceneParameters {
    fn default() -> Self {
        Self {
            camera_position: [3.5, 1.7, 6.0],
            half_size_pool: 2.0,
            depth_pool: 2.0,
            ball_size: 0.75,
            light_pos: [2.0, 1.5, 0.0],
            water_number: [0.4, 0.9, 1.0],
        }
    }
}

impl SceneParameters {
    pub fn get(&self, field: ParamField) -> f32 {
        match field {
            ParamField::CameraX => self.camera_position[0],
            ParamField::CameraY => self.camera_position[1],
            ParamField::CameraZ => self.camera_position[2],
            ParamField::HalfSizePool => self.half_size_pool,
            ParamField::DepthPool => self.depth_pool,
            ParamField::BallSize => self.ball_size,
            ParamField::LightX => self.light_pos[0],
            ParamField::LightY => self.light_pos[1],
            ParamField::LightZ => self.light_pos[2],
            ParamField::WaterX => self.water_number[0],
            ParamField::WaterY => self.water_number[1],
            ParamField::WaterZ => self.water_number[2],
        }
    }

    fn slot(&mut self, field: ParamField) -> &mut f32 {
        match field {
            ParamField::CameraX => &mut self.camera_position[0],
            ParamField::CameraY => &mut self.camera_position[1],
            ParamField::CameraZ => &mut self.camera_position[2],
            ParamField::HalfSizePool => &mut self.half_size_pool,
            ParamField::DepthPool => &mut self.depth_pool,
            ParamField::BallSize => &mut self.ball_size,
            ParamField::LightX => &mut self.light_pos[0],
            ParamField::LightY => &mut self.light_pos[1],
            ParamField::LightZ => &mut self.light_pos[2],
            ParamField::WaterX => &mut self.water_number[0],
            ParamField::WaterY => &mut self.water_number[1],
            ParamField::WaterZ => &mut self.water_number[2],
        }
    }

    /// Moves `field` by `delta` and returns the delta actually applied.
    ///
    /// A decrement that would cross the field's floor stops exactly on it.
    pub fn adjust(&mut self, field: ParamField, delta: f32) -> f32 {
        if delta == 0.0 {
            return 0.0;
        }
        let slot = self.slot(field);
        let old = *slot;
        let mut new = old + delta;
        if let Some(floor) = field.floor() {
            if new < floor {
                // Never push a value that already sits below the floor further down.
                new = if delta < 0.0 { floor.min(old) } else { new };
            }
        }
        *slot = new;
        new - old
    }

    /// Assigns `field`, raising the value to the field floor if needed.
    pub fn set(&mut self, field: ParamField, value: f32) {
        let value = match field.floor() {
            Some(floor) => value.max(floor),
            None => value,
        };
        *self.slot(field) = value;
    }

    /// Applies an edit command. Menu and exit requests are not edits and
    /// are ignored here.
    pub fn apply(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::Adjust(field, delta) => {
                self.adjust(field, delta);
            }
            SceneCommand::Set(field, value) => self.set(field, value),
            SceneCommand::RequestMenu | SceneCommand::RequestExit => {}
        }
    }
}

use blockworld_common::{BlockPos, PhysicsConfig};
use blockworld_input::{Rotation, Strafe};
use glam::Vec3;

/// The observer the world streams and collides around.
///
/// `position` is the actor's top cell; the body extends `height` cells down
/// from the cell it rounds to.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub position: Vec3,
    pub rotation: Rotation,
    pub strafe: Strafe,
    pub vertical_velocity: f32,
    pub flying: bool,
    pub jumping: bool,
}

impl Actor {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Rotation::default(),
            strafe: Strafe::default(),
            vertical_velocity: 0.0,
            flying: false,
            jumping: false,
        }
    }

    /// Body height in whole blocks.
    pub fn height(&self, physics: &PhysicsConfig) -> u32 {
        if self.flying {
            physics.flying_height
        } else {
            physics.actor_height
        }
    }

    /// Cells the body occupies, top first.
    pub fn body_cells(&self, height: u32) -> impl Iterator<Item = BlockPos> {
        let top = BlockPos::containing(self.position);
        (0..height as i32).map(move |dy| BlockPos::new(top.x, top.y - dy, top.z))
    }

    pub fn speed(&self, physics: &PhysicsConfig) -> f32 {
        if self.flying {
            physics.flying_speed
        } else {
            physics.walking_speed
        }
    }
}

use blockworld_common::{BlockPos, Face, PhysicsConfig};
use glam::Vec3;

use crate::store::BlockStore;

/// Vertical velocity applied after bumping a ceiling so the actor does not stick.
pub const CEILING_BOUNCE: f32 = -0.1;

/// Per-axis push-out of an actor from solid blocks.
///
/// The actor's position is its top cell; a height of `h` occupies the `h`
/// cells from there downward. Each face is tested independently against the
/// cell the candidate position rounds to, so this is an approximate sweep and
/// never a continuous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResolver {
    padding: f32,
}

/// Outcome of [`CollisionResolver::collide`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub position: Vec3,
    /// Pushed up out of the block below.
    pub floor: bool,
    /// Pushed down out of the block above.
    pub ceiling: bool,
}

impl Resolved {
    /// Vertical velocity after contact. Floor contact wins over ceiling.
    pub fn vertical_velocity(&self, current: f32) -> f32 {
        if self.floor {
            0.0
        } else if self.ceiling {
            CEILING_BOUNCE
        } else {
            current
        }
    }
}

impl CollisionResolver {
    pub fn new(padding: f32) -> Self {
        Self { padding }
    }

    pub fn from_config(physics: &PhysicsConfig) -> Self {
        Self::new(physics.collision_padding)
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Push `candidate` out of every solid face neighbour it overlaps by more
    /// than the padding.
    pub fn collide(&self, blocks: &BlockStore, candidate: Vec3, height: u32) -> Resolved {
        let cell = BlockPos::containing(candidate);
        let cell_f = cell.center();
        let mut resolved = Resolved {
            position: candidate,
            floor: false,
            ceiling: false,
        };

        for face in Face::ALL {
            let normal = face.normal();
            for axis in 0..3 {
                let sign = normal[axis];
                if sign == 0 {
                    continue;
                }
                let overlap = (resolved.position[axis] - cell_f[axis]) * sign as f32;
                if overlap < self.padding {
                    continue;
                }
                let blocked = (0..height as i32).any(|dy| {
                    let below = BlockPos::new(cell.x, cell.y - dy, cell.z);
                    blocks.contains(below.neighbor(face))
                });
                if !blocked {
                    continue;
                }
                resolved.position[axis] -= (overlap - self.padding) * sign as f32;
                match face {
                    Face::Down => resolved.floor = true,
                    Face::Up => resolved.ceiling = true,
                    _ => {}
                }
            }
        }
        if resolved.floor || resolved.ceiling {
            tracing::trace!(
                floor = resolved.floor,
                ceiling = resolved.ceiling,
                "vertical contact"
            );
        }
        resolved
    }
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::from_config(&PhysicsConfig::default())
    }
}

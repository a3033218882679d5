use glam::Vec3;

/// Mouse look sensitivity in degrees per pixel.
pub const LOOK_SENSITIVITY: f32 = 0.15;

/// View orientation in degrees.
///
/// `yaw` turns around the vertical axis and is unbounded. `pitch` is clamped
/// to `[-90, 90]`, where 0 looks level with the ground.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Rotation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch: pitch.clamp(-90.0, 90.0),
        }
    }

    /// Apply a mouse motion of `(dx, dy)` pixels.
    pub fn turn(self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.yaw + dx * LOOK_SENSITIVITY,
            self.pitch + dy * LOOK_SENSITIVITY,
        )
    }

    /// Unit vector the view looks along.
    pub fn sight_vector(self) -> Vec3 {
        let pitch = self.pitch.to_radians();
        let yaw = (self.yaw - 90.0).to_radians();
        let m = pitch.cos();
        Vec3::new(yaw.cos() * m, pitch.sin(), yaw.sin() * m)
    }
}

/// Held movement keys: `forward` is -1 while moving forward and 1 while
/// moving back, `sideways` is -1 for left and 1 for right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Strafe {
    pub forward: i8,
    pub sideways: i8,
}

impl Strafe {
    pub fn is_idle(self) -> bool {
        self.forward == 0 && self.sideways == 0
    }

    /// Heading offset from the view yaw, in degrees.
    fn heading(self) -> f32 {
        (self.forward as f32).atan2(self.sideways as f32).to_degrees()
    }
}

/// Direction of travel for the held keys. Zero when idle.
///
/// Walking moves on the ground plane only. Flying forward or back follows the
/// pitch, while strafing sideways stays level.
pub fn motion_vector(rotation: Rotation, strafe: Strafe, flying: bool) -> Vec3 {
    if strafe.is_idle() {
        return Vec3::ZERO;
    }
    let heading = (rotation.yaw + strafe.heading()).to_radians();
    let mut m = 1.0;
    let mut dy = 0.0;
    if flying && strafe.sideways == 0 {
        let pitch = rotation.pitch.to_radians();
        m = pitch.cos();
        dy = pitch.sin();
        if strafe.forward > 0 {
            dy = -dy;
        }
    }
    Vec3::new(heading.cos() * m, dy, heading.sin() * m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn level_sight_looks_along_negative_z() {
        let v = Rotation::new(0.0, 0.0).sight_vector();
        assert!(close(v, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn straight_down_sight() {
        let v = Rotation::new(37.0, -90.0).sight_vector();
        assert!(close(v, Vec3::NEG_Y));
    }

    #[test]
    fn sight_is_unit_length() {
        for (yaw, pitch) in [(0.0, 0.0), (123.0, 45.0), (-30.0, -60.0)] {
            let v = Rotation::new(yaw, pitch).sight_vector();
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn pitch_is_clamped() {
        let r = Rotation::new(0.0, 80.0).turn(10.0, 1000.0);
        assert_eq!(r.pitch, 90.0);
        assert!((r.yaw - 1.5).abs() < 1e-5);
    }

    #[test]
    fn idle_has_no_motion() {
        let v = motion_vector(Rotation::default(), Strafe::default(), true);
        assert_eq!(v, Vec3::ZERO);
    }

    #[test]
    fn walking_forward_follows_sight_on_the_ground() {
        let forward = Strafe {
            forward: -1,
            sideways: 0,
        };
        let rotation = Rotation::new(0.0, 45.0);
        let v = motion_vector(rotation, forward, false);
        assert!(close(v, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn flying_forward_climbs_with_pitch() {
        let forward = Strafe {
            forward: -1,
            sideways: 0,
        };
        let v = motion_vector(Rotation::new(0.0, 90.0), forward, true);
        assert!(close(v, Vec3::Y));

        let back = Strafe {
            forward: 1,
            sideways: 0,
        };
        let v = motion_vector(Rotation::new(0.0, 90.0), back, true);
        assert!(close(v, Vec3::NEG_Y));
    }

    #[test]
    fn flying_sideways_stays_level() {
        let right = Strafe {
            forward: 0,
            sideways: 1,
        };
        let v = motion_vector(Rotation::new(0.0, 60.0), right, true);
        assert!(close(v, Vec3::X));
    }
}

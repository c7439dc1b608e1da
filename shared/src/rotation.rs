//! Doll head turning at a fixed angular rate.
use bevy_math::Quat;

use crate::constants::doll_constants::ROTATION_SNAP_EPSILON_DEG;

/// Yaw orientation of the doll head for an angle in degrees.
pub fn yaw(degrees: f32) -> Quat {
    Quat::from_rotation_y(degrees.to_radians())
}

#[derive(Clone, Debug)]
pub struct RotationAnimator {
    current: Quat,
    target: Quat,
    rotating: bool,
    /// Degrees per second
    rate: f32,
}

impl RotationAnimator {
    pub fn new(initial: Quat, rate: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            rotating: false,
            rate,
        }
    }

    pub fn current(&self) -> Quat {
        self.current
    }

    pub fn target(&self) -> Quat {
        self.target
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    /// Starts turning toward `target` unless a turn is already in flight.
    /// Returns false when the request was dropped.
    pub fn request_rotation(&mut self, target: Quat) -> bool {
        if self.rotating {
            return false;
        }
        self.retarget(target);
        true
    }

    /// Points the animation at `target` whether or not a turn is in flight.
    pub fn retarget(&mut self, target: Quat) {
        self.target = target;
        self.rotating = true;
    }

    /// Jumps to `orientation` and stops any turn.
    pub fn reset(&mut self, orientation: Quat) {
        self.current = orientation;
        self.target = orientation;
        self.rotating = false;
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.rotating {
            return;
        }

        let max_step = self.rate.to_radians() * dt;
        let gap = self.current.angle_between(self.target);
        self.current = if gap <= max_step {
            self.target
        } else {
            self.current.slerp(self.target, max_step / gap)
        };

        if self.current.angle_between(self.target) < ROTATION_SNAP_EPSILON_DEG.to_radians() {
            self.current = self.target;
            self.rotating = false;
        }
    }
}

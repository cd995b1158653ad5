#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for click-to-move avatar motion."]
#![doc = ""]
#![doc = "This crate provides the vector and transform types, the Idle/Run animation table,"]
#![doc = "and the per-tick player state machine that walks an avatar toward a target tile."]

extern crate alloc;

use core::fmt;
use core::ops::{Add, Mul, Sub};
use libm::{atan2f, sqrtf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod animation;
pub mod entity;
pub mod error;
pub mod player;

pub use animation::{Action, AnimationTable, Animator, clip_label};
pub use entity::{Avatar, Entity};
pub use error::MotionError;
pub use player::{ChatBubble, Player, Step};

/// Distance (world units) at which a walking avatar counts as having arrived.
pub const ARRIVAL_THRESHOLD: f32 = 5.0;

/// Default step length per tick (world units).
pub const DEFAULT_VELOCITY: f32 = 5.0;

/// A 3‑D vector in world units. `y` is up; the floor lies in the `x`/`z` plane.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    /// World‑frame x coordinate.
    pub x: f32,
    /// World‑frame y coordinate (up).
    pub y: f32,
    /// World‑frame z coordinate.
    pub z: f32,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    /// Construct a new vector.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Vec3) -> f32 {
        (other - self).length()
    }

    /// Returns the unit vector in the same direction, or `None` when the
    /// length is zero or not finite.
    pub fn normalize(self) -> Option<Vec3> {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }

    /// Whether every component is finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// World position plus heading of an entity.
///
/// `yaw` is the rotation about the up axis in radians, measured so that a yaw
/// of zero faces `+z` and `PI/2` faces `+x` (`atan2(dx, dz)`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    /// World position.
    pub position: Vec3,
    /// Heading about the up axis (rad).
    pub yaw: f32,
}

impl Transform {
    /// Construct a transform.
    ///
    /// # Arguments
    ///
    /// * `position`: World position.
    /// * `yaw`: Heading in radians.
    pub const fn new(position: Vec3, yaw: f32) -> Self {
        Transform { position, yaw }
    }

    /// Heading that faces along `direction`, ignoring its vertical component.
    pub fn yaw_towards(direction: Vec3) -> f32 {
        atan2f(direction.x, direction.z)
    }

    /// Turn to face along `direction`.
    pub fn face(&mut self, direction: Vec3) {
        self.yaw = Self::yaw_towards(direction);
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(pos: {}, yaw: {:.2} rad)", self.position, self.yaw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::{FRAC_PI_2, PI};
    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_vec3_length_and_distance() {
        assert!((Vec3::new(3.0, 0.0, 4.0).length() - 5.0).abs() < EPSILON);
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 6.0, 3.0);
        assert!((a.distance(b) - 5.0).abs() < EPSILON);
        assert!((b.distance(a) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_vec3_normalize() {
        let n = Vec3::new(0.0, 0.0, 10.0).normalize().unwrap();
        assert_eq!(n, Vec3::new(0.0, 0.0, 1.0));
        assert!(Vec3::ZERO.normalize().is_none());
        assert!(Vec3::new(f32::NAN, 0.0, 0.0).normalize().is_none());
    }

    #[test]
    fn test_yaw_towards_axes() {
        assert!((Transform::yaw_towards(Vec3::new(0.0, 0.0, 1.0)) - 0.0).abs() < EPSILON);
        assert!((Transform::yaw_towards(Vec3::new(1.0, 0.0, 0.0)) - FRAC_PI_2).abs() < EPSILON);
        assert!((Transform::yaw_towards(Vec3::new(0.0, 0.0, -1.0)) - PI).abs() < EPSILON);
        // Vertical component does not affect heading
        assert!((Transform::yaw_towards(Vec3::new(-1.0, 7.0, 0.0)) + FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn test_transform_face() {
        let mut t = Transform::default();
        t.face(Vec3::new(1.0, 0.0, 1.0));
        assert!((t.yaw - PI / 4.0).abs() < EPSILON);
        assert_eq!(t.position, Vec3::ZERO);
    }
}

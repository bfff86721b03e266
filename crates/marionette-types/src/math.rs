//! Rigid-body math primitives shared by every Marionette crate.
//!
//! Poses are expressed in world space: a translation, a unit quaternion
//! rotation (w, x, y, z convention), and a per-axis scale.  The types are
//! deliberately small `Copy` values so that solvers can pass them around
//! without touching the heap.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D vector (positions, offsets, scales).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Create a new vector.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// `(1, 1, 1)`, the neutral scale.
    pub const fn one() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    /// Multiply every component by `s`.
    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Linear interpolation: `t = 0` yields `self`, `t = 1` yields `to`.
    pub fn lerp(self, to: Self, t: f32) -> Self {
        self.add(to.sub(self).scale(t))
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Self) -> f32 {
        self.sub(other).length()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// A unit quaternion representing a 3-D rotation (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    /// Create a quaternion.  The caller is responsible for providing a unit
    /// quaternion (|q| = 1).
    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `angle_rad` radians around the +Y (up) axis.
    pub fn from_yaw(angle_rad: f32) -> Self {
        let half = angle_rad * 0.5;
        Self::new(half.cos(), 0.0, half.sin(), 0.0)
    }

    /// Hamilton product: compose two rotations.
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.w * rhs.w + self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Rescale to unit length.  A degenerate (zero-length) quaternion
    /// collapses to the identity rotation.
    pub fn normalized(self) -> Self {
        let len = self.dot(self).sqrt();
        if len <= f32::EPSILON {
            return Self::identity();
        }
        Self::new(self.w / len, self.x / len, self.y / len, self.z / len)
    }

    /// Normalised linear interpolation along the shorter arc.
    pub fn nlerp(self, to: Self, t: f32) -> Self {
        // q and -q encode the same rotation; flip to stay on the short arc.
        let to = if self.dot(to) < 0.0 {
            Self::new(-to.w, -to.x, -to.y, -to.z)
        } else {
            to
        };
        Self::new(
            self.w + (to.w - self.w) * t,
            self.x + (to.x - self.x) * t,
            self.y + (to.y - self.y) * t,
            self.z + (to.z - self.z) * t,
        )
        .normalized()
    }

    /// Rotate a vector by this quaternion: p' = q * p * q*.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self.mul(p).mul(self.conjugate());
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }

    /// `true` when both quaternions describe the same rotation within `eps`.
    pub fn approx_eq(self, other: Self, eps: f32) -> bool {
        (self.dot(other).abs() - 1.0).abs() <= eps
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pose
// ────────────────────────────────────────────────────────────────────────────

/// World-space pose of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quaternion,
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub const fn new(position: Vec3, rotation: Quaternion) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::one(),
        }
    }

    /// Origin, no rotation, unit scale.
    pub const fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }

    /// Identity rotation placed at `position`.
    pub const fn at(position: Vec3) -> Self {
        Self::new(position, Quaternion::identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

    #[test]
    fn vec3_lerp_midpoint() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(2.0, 4.0, -2.0);
        assert_eq!(a.lerp(b, 0.5), Vec3::new(1.0, 2.0, -1.0));
    }

    #[test]
    fn quaternion_90deg_yaw_rotates_x_to_minus_z() {
        let q = Quaternion::from_yaw(FRAC_PI_2);
        let r = q.rotate(Vec3::new(1.0, 0.0, 0.0));
        assert!(r.x.abs() < 1e-5, "x={}", r.x);
        assert!(r.y.abs() < 1e-5);
        assert!((r.z + 1.0).abs() < 1e-5, "z={}", r.z);
    }

    #[test]
    fn quaternion_conjugate_is_inverse() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let prod = q.mul(q.conjugate());
        assert!((prod.w - 1.0).abs() < 1e-5);
        assert!(prod.x.abs() < 1e-5);
        assert!(prod.y.abs() < 1e-5);
        assert!(prod.z.abs() < 1e-5);
    }

    #[test]
    fn normalized_zero_quaternion_is_identity() {
        let q = Quaternion::new(0.0, 0.0, 0.0, 0.0).normalized();
        assert_eq!(q, Quaternion::identity());
    }

    #[test]
    fn nlerp_endpoints_and_short_arc() {
        let a = Quaternion::identity();
        let b = Quaternion::from_yaw(FRAC_PI_2);
        assert!(a.nlerp(b, 0.0).approx_eq(a, 1e-5));
        assert!(a.nlerp(b, 1.0).approx_eq(b, 1e-5));

        // -b is the same rotation as b; nlerp must not swing the long way.
        let neg_b = Quaternion::new(-b.w, -b.x, -b.y, -b.z);
        let mid = a.nlerp(neg_b, 0.5);
        assert!(mid.approx_eq(Quaternion::from_yaw(FRAC_PI_2 * 0.5), 1e-4));
    }

    #[test]
    fn pose_default_has_unit_scale() {
        let p = Pose::default();
        assert_eq!(p.scale, Vec3::one());
        assert_eq!(p.rotation, Quaternion::identity());
    }
}

//! Geometry and velocity records
//!
//! Small `Copy` values passed by value between the solvers, the resolver
//! and body implementations. Nothing here allocates.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A point in world space
pub type Point = DVec2;

/// A disk (ball) primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub center: Point,
    /// Radius, >= 0. Zero makes the ball point-like.
    pub radius: f64,
}

impl Ball {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Zero-radius ball at `p` (used for segment endpoints)
    pub fn point(p: Point) -> Self {
        Self {
            center: p,
            radius: 0.0,
        }
    }
}

/// A directed line segment `start -> end`
///
/// Direction matters: the positive side of the segment is to its left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn direction(&self) -> DVec2 {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    /// Distance along the segment of `p` projected onto its line, measured from `start`
    ///
    /// Returns `None` for a zero-length segment.
    pub fn project(&self, p: Point) -> Option<f64> {
        let len = self.length();
        if len > 0.0 {
            Some(self.direction().dot(p - self.start) / len)
        } else {
            None
        }
    }

    /// Point at distance `s` along the segment from `start`
    pub fn point_at(&self, s: f64) -> Point {
        let len = self.length();
        if len > 0.0 {
            self.start + self.direction() * (s / len)
        } else {
            self.start
        }
    }

    /// Normal pointing to the right of the direction (away from the positive side)
    #[inline]
    pub fn normal(&self) -> DVec2 {
        -self.direction().perp()
    }
}

/// Mass of a body at a contact point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Mass {
    /// Finite positive mass
    Movable(f64),
    /// Cannot be moved by impacts (walls, kinematic obstacles)
    Immovable,
}

/// Velocity and mass of a primitive at a contact point
///
/// Not a delta-momentum; the resolver replaces `velocity` wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impulse {
    pub velocity: DVec2,
    pub mass: Mass,
}

impl Impulse {
    pub fn new(velocity: DVec2, mass: Mass) -> Self {
        Self { velocity, mass }
    }

    /// Zero velocity, infinite mass
    pub fn immovable() -> Self {
        Self {
            velocity: DVec2::ZERO,
            mass: Mass::Immovable,
        }
    }

    /// Same impulse with velocity expressed in a rotated frame
    #[inline]
    pub fn rotated(self, rotation: &Rotation) -> Self {
        Self {
            velocity: rotation.apply(self.velocity),
            mass: self.mass,
        }
    }
}

/// Row-major 2x2 rotation matrix
///
/// ```text
/// | m11 m12 |
/// | m21 m22 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
}

impl Rotation {
    /// Rotation mapping `axis` onto +x. `None` if `axis` has zero or non-finite length.
    pub fn aligning(axis: DVec2) -> Option<Self> {
        let len = axis.length();
        if !(len > 0.0 && len.is_finite()) {
            return None;
        }
        let cos = axis.x / len;
        let sin = axis.y / len;
        Some(Self {
            m11: cos,
            m12: sin,
            m21: -sin,
            m22: cos,
        })
    }

    #[inline]
    pub fn apply(&self, v: DVec2) -> DVec2 {
        DVec2::new(
            self.m11 * v.x + self.m12 * v.y,
            self.m21 * v.x + self.m22 * v.y,
        )
    }

    /// Inverse rotation (transpose)
    #[inline]
    pub fn inverse(&self) -> Self {
        Self {
            m11: self.m11,
            m12: self.m21,
            m21: self.m12,
            m22: self.m22,
        }
    }
}

//! Body contract
//!
//! A body exposes a fixed number of primitives (segments or balls). The engine
//! only ever looks ahead through `primitive_at`, and commits time through
//! `move_by`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Ball, Impulse, Point, Segment};
use super::group::{CollisionGroups, DEFAULT_COLLISION_GROUPS};

/// Kind of a body primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Segment,
    Ball,
}

/// Geometry of one primitive at some time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Segment(Segment),
    Ball(Ball),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Segment(_) => PrimitiveKind::Segment,
            Primitive::Ball(_) => PrimitiveKind::Ball,
        }
    }

    pub fn as_segment(&self) -> Option<Segment> {
        match *self {
            Primitive::Segment(s) => Some(s),
            Primitive::Ball(_) => None,
        }
    }

    pub fn as_ball(&self) -> Option<Ball> {
        match *self {
            Primitive::Ball(b) => Some(b),
            Primitive::Segment(_) => None,
        }
    }
}

/// Something the engine can collide
///
/// Primitive ids are dense (`0..primitive_count()`) and must stay stable
/// between `move_by` calls.
pub trait Body {
    /// Number of primitives
    fn primitive_count(&self) -> usize;

    /// Kind of primitive `id`
    fn primitive_kind(&self, id: usize) -> PrimitiveKind;

    /// Geometry of primitive `id`, `t` seconds after the current state
    ///
    /// Must not mutate the body. `primitive_at(id, 0.0)` is the state last
    /// committed by `move_by`.
    fn primitive_at(&self, id: usize, t: f64) -> Primitive;

    /// Current velocity and mass of primitive `id` at world point `at`
    fn impulse_at(&self, id: usize, at: Point) -> Impulse;

    /// Replace the velocity of primitive `id` after an impact at `at`
    fn apply_velocity(&mut self, id: usize, at: Point, velocity: DVec2);

    /// Commit `t` seconds of motion
    fn move_by(&mut self, t: f64);

    /// Collision groups; default-group bodies collide with each other
    fn groups(&self) -> &CollisionGroups {
        &DEFAULT_COLLISION_GROUPS
    }

    /// Side-effect hook, called with the other body of a resolved impact
    /// when `EngineSettings::notify_impacts` is set
    fn handle_impact(&mut self, _other: &dyn Body) {}
}

impl<T: Body + ?Sized> Body for Box<T> {
    fn primitive_count(&self) -> usize {
        (**self).primitive_count()
    }

    fn primitive_kind(&self, id: usize) -> PrimitiveKind {
        (**self).primitive_kind(id)
    }

    fn primitive_at(&self, id: usize, t: f64) -> Primitive {
        (**self).primitive_at(id, t)
    }

    fn impulse_at(&self, id: usize, at: Point) -> Impulse {
        (**self).impulse_at(id, at)
    }

    fn apply_velocity(&mut self, id: usize, at: Point, velocity: DVec2) {
        (**self).apply_velocity(id, at, velocity)
    }

    fn move_by(&mut self, t: f64) {
        (**self).move_by(t)
    }

    fn groups(&self) -> &CollisionGroups {
        (**self).groups()
    }

    fn handle_impact(&mut self, other: &dyn Body) {
        (**self).handle_impact(other)
    }
}

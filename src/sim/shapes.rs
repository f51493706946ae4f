//! Demonstration bodies
//!
//! Concrete shapes for scenes and tests: a static table, a rotating fence,
//! a free ball and a single wall segment.

use std::f64::consts::FRAC_PI_2;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, Primitive, PrimitiveKind};
use super::geometry::{Ball, Impulse, Mass, Point, Segment};
use super::group::CollisionGroups;
use crate::polar_to_cartesian;

/// Static rectangle; its four edges wind so the interior is on their positive side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub min: DVec2,
    pub max: DVec2,
}

impl Table {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Edge `id`: 0 bottom, 1 right, 2 top, 3 left
    pub fn edge(&self, id: usize) -> Segment {
        debug_assert!(id < 4, "table edge {id} out of range");
        let (min, max) = (self.min, self.max);
        match id {
            0 => Segment::new(min, DVec2::new(max.x, min.y)),
            1 => Segment::new(DVec2::new(max.x, min.y), max),
            2 => Segment::new(max, DVec2::new(min.x, max.y)),
            _ => Segment::new(DVec2::new(min.x, max.y), min),
        }
    }

    /// True if a ball of `radius` at `center` is fully inside
    pub fn contains(&self, center: Point, radius: f64) -> bool {
        center.x - radius >= self.min.x
            && center.x + radius <= self.max.x
            && center.y - radius >= self.min.y
            && center.y + radius <= self.max.y
    }
}

impl Body for Table {
    fn primitive_count(&self) -> usize {
        4
    }

    fn primitive_kind(&self, _id: usize) -> PrimitiveKind {
        PrimitiveKind::Segment
    }

    fn primitive_at(&self, id: usize, _t: f64) -> Primitive {
        Primitive::Segment(self.edge(id))
    }

    fn impulse_at(&self, _id: usize, _at: Point) -> Impulse {
        Impulse::immovable()
    }

    fn apply_velocity(&mut self, _id: usize, _at: Point, _velocity: DVec2) {
        // Table does not move
    }

    fn move_by(&mut self, _t: f64) {}
}

/// Rotating quadrilateral obstacle
///
/// Four corners at quarter turns around `center`, radii alternating `r1`,
/// `r2`. Edges wind so the outside is on their positive side. Immovable:
/// it turns at `angular_speed` regardless of impacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fence {
    pub center: DVec2,
    pub r1: f64,
    pub r2: f64,
    /// Radians per second, counter-clockwise positive
    pub angular_speed: f64,
    /// Current angle of corner 0 (radians)
    pub angle: f64,
}

impl Fence {
    pub fn new(center: DVec2, r1: f64, r2: f64, angular_speed: f64, angle: f64) -> Self {
        Self {
            center,
            r1,
            r2,
            angular_speed,
            angle,
        }
    }

    fn corner(&self, k: usize, t: f64) -> Point {
        let theta = self.angle + self.angular_speed * t + FRAC_PI_2 * k as f64;
        let r = if k % 2 == 0 { self.r1 } else { self.r2 };
        self.center + polar_to_cartesian(r, theta)
    }

    /// Edge `id` at lookahead `t`, running from corner `id + 1` back to corner `id`
    pub fn edge(&self, id: usize, t: f64) -> Segment {
        debug_assert!(id < 4, "fence edge {id} out of range");
        Segment::new(self.corner(id + 1, t), self.corner(id, t))
    }
}

impl Body for Fence {
    fn primitive_count(&self) -> usize {
        4
    }

    fn primitive_kind(&self, _id: usize) -> PrimitiveKind {
        PrimitiveKind::Segment
    }

    fn primitive_at(&self, id: usize, t: f64) -> Primitive {
        Primitive::Segment(self.edge(id, t))
    }

    fn impulse_at(&self, _id: usize, at: Point) -> Impulse {
        // Rigid rotation: velocity is the radius vector turned a quarter, scaled
        let velocity = (at - self.center).perp() * self.angular_speed;
        Impulse::new(velocity, Mass::Immovable)
    }

    fn apply_velocity(&mut self, _id: usize, _at: Point, _velocity: DVec2) {}

    fn move_by(&mut self, t: f64) {
        self.angle += self.angular_speed * t;
    }
}

/// A ball moving in a straight line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeBall {
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub mass: f64,
    /// Impacts reported through `handle_impact`
    #[serde(default)]
    pub impacts: u32,
    #[serde(skip)]
    pub groups: CollisionGroups,
}

impl FreeBall {
    pub fn new(pos: DVec2, radius: f64, vel: DVec2) -> Self {
        Self {
            pos,
            vel,
            radius,
            mass: 1.0,
            impacts: 0,
            groups: CollisionGroups::default(),
        }
    }

    /// Set the mass; must be finite and positive
    pub fn with_mass(mut self, mass: f64) -> Self {
        debug_assert!(mass > 0.0 && mass.is_finite(), "ball mass must be finite and positive (got {mass})");
        self.mass = mass;
        self
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = groups;
        self
    }
}

impl Body for FreeBall {
    fn primitive_count(&self) -> usize {
        1
    }

    fn primitive_kind(&self, _id: usize) -> PrimitiveKind {
        PrimitiveKind::Ball
    }

    fn primitive_at(&self, id: usize, t: f64) -> Primitive {
        debug_assert_eq!(id, 0);
        Primitive::Ball(Ball::new(self.pos + self.vel * t, self.radius))
    }

    fn impulse_at(&self, _id: usize, _at: Point) -> Impulse {
        Impulse::new(self.vel, Mass::Movable(self.mass))
    }

    fn apply_velocity(&mut self, _id: usize, _at: Point, velocity: DVec2) {
        self.vel = velocity;
    }

    fn move_by(&mut self, t: f64) {
        self.pos += self.vel * t;
    }

    fn groups(&self) -> &CollisionGroups {
        &self.groups
    }

    fn handle_impact(&mut self, _other: &dyn Body) {
        self.impacts += 1;
    }
}

/// A single static segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub segment: Segment,
    #[serde(skip)]
    pub groups: CollisionGroups,
}

impl Wall {
    pub fn new(start: DVec2, end: DVec2) -> Self {
        Self {
            segment: Segment::new(start, end),
            groups: CollisionGroups::default(),
        }
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = groups;
        self
    }
}

impl Body for Wall {
    fn primitive_count(&self) -> usize {
        1
    }

    fn primitive_kind(&self, _id: usize) -> PrimitiveKind {
        PrimitiveKind::Segment
    }

    fn primitive_at(&self, _id: usize, _t: f64) -> Primitive {
        Primitive::Segment(self.segment)
    }

    fn impulse_at(&self, _id: usize, _at: Point) -> Impulse {
        Impulse::immovable()
    }

    fn apply_velocity(&mut self, _id: usize, _at: Point, _velocity: DVec2) {}

    fn move_by(&mut self, _t: f64) {}

    fn groups(&self) -> &CollisionGroups {
        &self.groups
    }
}

/// Any of the demonstration bodies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Table(Table),
    Fence(Fence),
    Ball(FreeBall),
    Wall(Wall),
}

impl Shape {
    pub fn as_ball(&self) -> Option<&FreeBall> {
        match self {
            Shape::Ball(ball) => Some(ball),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Body {
        match self {
            Shape::Table(table) => table,
            Shape::Fence(fence) => fence,
            Shape::Ball(ball) => ball,
            Shape::Wall(wall) => wall,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Body {
        match self {
            Shape::Table(table) => table,
            Shape::Fence(fence) => fence,
            Shape::Ball(ball) => ball,
            Shape::Wall(wall) => wall,
        }
    }
}

impl From<Table> for Shape {
    fn from(table: Table) -> Self {
        Shape::Table(table)
    }
}

impl From<Fence> for Shape {
    fn from(fence: Fence) -> Self {
        Shape::Fence(fence)
    }
}

impl From<FreeBall> for Shape {
    fn from(ball: FreeBall) -> Self {
        Shape::Ball(ball)
    }
}

impl From<Wall> for Shape {
    fn from(wall: Wall) -> Self {
        Shape::Wall(wall)
    }
}

impl Body for Shape {
    fn primitive_count(&self) -> usize {
        self.inner().primitive_count()
    }

    fn primitive_kind(&self, id: usize) -> PrimitiveKind {
        self.inner().primitive_kind(id)
    }

    fn primitive_at(&self, id: usize, t: f64) -> Primitive {
        self.inner().primitive_at(id, t)
    }

    fn impulse_at(&self, id: usize, at: Point) -> Impulse {
        self.inner().impulse_at(id, at)
    }

    fn apply_velocity(&mut self, id: usize, at: Point, velocity: DVec2) {
        self.inner_mut().apply_velocity(id, at, velocity)
    }

    fn move_by(&mut self, t: f64) {
        self.inner_mut().move_by(t)
    }

    fn groups(&self) -> &CollisionGroups {
        self.inner().groups()
    }

    fn handle_impact(&mut self, other: &dyn Body) {
        self.inner_mut().handle_impact(other)
    }
}

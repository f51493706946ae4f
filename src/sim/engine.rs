//! Frame-stepped collision engine
//!
//! `advance(frame_time)` repeatedly finds the earliest impact among all body
//! pairs, moves every body to it, resolves it, and continues with the rest
//! of the frame until no impact remains.

use std::fmt;

use glam::DVec2;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use super::body::{Body, Primitive};
use super::collision::{
    SegmentFeature, ball_ball_time_of_impact, segment_ball_time_of_impact,
    segment_segment_time_of_impact,
};
use super::geometry::{Ball, Point, Segment};
use super::resolve::exchange;
use crate::error::EngineError;
use crate::settings::EngineSettings;

/// Stable reference to a registered body
///
/// Slots are reused after `unregister`; the generation makes stale handles
/// resolve to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Primitive combination of an impact, selecting the resolution routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactKind {
    /// `first` is the segment, `second` the ball
    SegmentBall(SegmentFeature),
    BallBall,
    SegmentSegment,
}

/// One side of an impact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImpactSide {
    pub body: BodyHandle,
    pub primitive: usize,
}

/// The earliest impact of a search pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub first: ImpactSide,
    pub second: ImpactSide,
    pub point: Point,
    /// Seconds after the state the search started from
    pub time: f64,
    pub kind: ImpactKind,
}

/// Summary of one `advance` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Impacts resolved
    pub impacts: usize,
    /// Impacts resolved without advancing time
    pub zero_time_impacts: usize,
    /// Total time every body was moved by; equals the frame time
    pub time_advanced: f64,
    /// The impact cap was reached and the rest of the frame ran without collisions
    pub saturated: bool,
}

struct Slot<B> {
    generation: u32,
    body: Option<B>,
}

/// Pairing order of registered bodies
enum Registry {
    /// Occupied slot indices, ascending
    Clean { order: Vec<usize> },
    /// Membership changed since the last snapshot
    Dirty,
}

/// Brute-force all-pairs continuous collision engine
pub struct Engine<B: Body = Box<dyn Body>> {
    settings: EngineSettings,
    slots: Vec<Slot<B>>,
    free: Vec<usize>,
    registry: Registry,
    last_impact: Option<Impact>,
}

impl<B: Body> Default for Engine<B> {
    fn default() -> Self {
        Self {
            settings: EngineSettings::default(),
            slots: Vec::new(),
            free: Vec::new(),
            registry: Registry::Clean { order: Vec::new() },
            last_impact: None,
        }
    }
}

impl<B: Body> Engine<B> {
    /// Create an engine with validated settings
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Add a body; it takes part from the next `advance`
    pub fn register(&mut self, body: B) -> BodyHandle {
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index].body = Some(body);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    body: Some(body),
                });
                self.slots.len() - 1
            }
        };
        self.registry = Registry::Dirty;
        let handle = BodyHandle::new(index as u32, self.slots[index].generation);
        debug!("Registered body {handle}");
        handle
    }

    /// Remove a body, returning it. Stale or repeated handles return `None`
    /// and leave the registry untouched.
    pub fn unregister(&mut self, handle: BodyHandle) -> Option<B> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.registry = Registry::Dirty;
        debug!("Unregistered body {handle}");
        Some(body)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&B> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_ref()
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut B> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_mut()
    }

    /// Registered bodies in slot order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &B)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body
                .as_ref()
                .map(|body| (BodyHandle::new(index as u32, slot.generation), body))
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.body.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if membership changed since the last snapshot
    pub fn is_dirty(&self) -> bool {
        matches!(self.registry, Registry::Dirty)
    }

    /// Most recently resolved impact
    pub fn last_impact(&self) -> Option<&Impact> {
        self.last_impact.as_ref()
    }

    /// Snapshot current membership into the pairing order
    pub fn rebuild(&mut self) {
        let order: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.body.is_some())
            .map(|(index, _)| index)
            .collect();
        debug!("Rebuilt registry: {} bodies", order.len());
        self.registry = Registry::Clean { order };
    }

    /// Simulate `frame_time` seconds, resolving every impact on the way
    pub fn advance(&mut self, frame_time: f64) -> Result<FrameReport, EngineError> {
        if !frame_time.is_finite() || frame_time <= 0.0 {
            return Err(EngineError::InvalidFrameTime { frame_time });
        }
        if self.is_dirty() {
            self.rebuild();
        }
        let order: &[usize] = match &self.registry {
            Registry::Clean { order } => order,
            Registry::Dirty => &[],
        };

        check_primitive_kinds(&self.slots, order)?;

        let eps = self.settings.epsilon;
        let mut report = FrameReport::default();
        let mut remaining = frame_time;

        loop {
            let Some(impact) = find_first_impact(&self.slots, order, remaining, eps) else {
                move_all(&mut self.slots, order, remaining);
                report.time_advanced += remaining;
                break;
            };

            trace!(
                "Impact {:?} {}[{}] x {}[{}] at t={} ({:.3}, {:.3})",
                impact.kind,
                impact.first.body,
                impact.first.primitive,
                impact.second.body,
                impact.second.primitive,
                impact.time,
                impact.point.x,
                impact.point.y
            );

            if impact.time > 0.0 {
                move_all(&mut self.slots, order, impact.time);
                report.time_advanced += impact.time;
                remaining -= impact.time;
            } else {
                report.zero_time_impacts += 1;
            }

            resolve_impact(&mut self.slots, &impact);
            if self.settings.notify_impacts {
                notify_impact(&mut self.slots, &impact);
            }
            report.impacts += 1;
            self.last_impact = Some(impact);

            if remaining <= 0.0 {
                break;
            }
            if report.impacts >= self.settings.max_impacts_per_advance {
                warn!(
                    "Impact cap {} reached with {remaining}s left; finishing frame without collisions",
                    self.settings.max_impacts_per_advance
                );
                move_all(&mut self.slots, order, remaining);
                report.time_advanced += remaining;
                report.saturated = true;
                break;
            }
        }

        debug!(
            "Advanced {frame_time}s: {} impacts ({} at zero time)",
            report.impacts, report.zero_time_impacts
        );
        Ok(report)
    }
}

const UNDEFINED_SEGMENT: Segment = Segment {
    start: DVec2::NAN,
    end: DVec2::NAN,
};

const UNDEFINED_BALL: Ball = Ball {
    center: DVec2::NAN,
    radius: f64::NAN,
};

fn handle_of<B>(slots: &[Slot<B>], index: usize) -> BodyHandle {
    BodyHandle::new(index as u32, slots[index].generation)
}

/// Every primitive must report the kind it declares
fn check_primitive_kinds<B: Body>(slots: &[Slot<B>], order: &[usize]) -> Result<(), EngineError> {
    for &index in order {
        let Some(body) = slots[index].body.as_ref() else {
            continue;
        };
        for id in 0..body.primitive_count() {
            let declared = body.primitive_kind(id);
            let reported = body.primitive_at(id, 0.0).kind();
            if declared != reported {
                return Err(EngineError::PrimitiveMismatch {
                    body: handle_of(slots, index),
                    primitive: id,
                    declared,
                    reported,
                });
            }
        }
    }
    Ok(())
}

/// Segment track of a primitive; NaN geometry (never colliding) on a kind mismatch
fn segment_track<B: Body>(body: &B, id: usize) -> impl Fn(f64) -> Segment + '_ {
    move |t| match body.primitive_at(id, t) {
        Primitive::Segment(segment) => segment,
        Primitive::Ball(_) => UNDEFINED_SEGMENT,
    }
}

fn ball_track<B: Body>(body: &B, id: usize) -> impl Fn(f64) -> Ball + '_ {
    move |t| match body.primitive_at(id, t) {
        Primitive::Ball(ball) => ball,
        Primitive::Segment(_) => UNDEFINED_BALL,
    }
}

/// Earliest impact among all group-sharing pairs within `frame_time`
fn find_first_impact<B: Body>(
    slots: &[Slot<B>],
    order: &[usize],
    frame_time: f64,
    eps: f64,
) -> Option<Impact> {
    let mut best = f64::INFINITY;
    let mut first = None;

    for (n, &i) in order.iter().enumerate() {
        let Some(a) = slots[i].body.as_ref() else {
            continue;
        };
        for &j in &order[n + 1..] {
            let Some(b) = slots[j].body.as_ref() else {
                continue;
            };
            if !a.groups().same_group(b.groups()) {
                continue;
            }

            let a_handle = handle_of(slots, i);
            let b_handle = handle_of(slots, j);
            if let Some(impact) = pair_first_impact(a_handle, a, b_handle, b, frame_time, best, eps) {
                best = impact.time;
                first = Some(impact);
                if best == 0.0 {
                    // Nothing can come earlier
                    return first;
                }
            }
        }
    }

    first
}

/// Earliest impact between any primitive of `a` and any primitive of `b`
fn pair_first_impact<B: Body>(
    a_handle: BodyHandle,
    a: &B,
    b_handle: BodyHandle,
    b: &B,
    frame_time: f64,
    best: f64,
    eps: f64,
) -> Option<Impact> {
    use super::body::PrimitiveKind::{Ball as BallKind, Segment as SegmentKind};

    let mut best = best;
    let mut first = None;

    for p in 0..a.primitive_count() {
        for q in 0..b.primitive_count() {
            let side_a = ImpactSide {
                body: a_handle,
                primitive: p,
            };
            let side_b = ImpactSide {
                body: b_handle,
                primitive: q,
            };

            let found = match (a.primitive_kind(p), b.primitive_kind(q)) {
                (SegmentKind, SegmentKind) => segment_segment_time_of_impact(
                    segment_track(a, p),
                    segment_track(b, q),
                    frame_time,
                    best,
                    eps,
                )
                .map(|toi| Impact {
                    first: side_a,
                    second: side_b,
                    point: toi.point,
                    time: toi.time,
                    kind: ImpactKind::SegmentSegment,
                }),
                (SegmentKind, BallKind) => segment_ball_time_of_impact(
                    segment_track(a, p),
                    ball_track(b, q),
                    frame_time,
                    best,
                    eps,
                )
                .map(|hit| Impact {
                    first: side_a,
                    second: side_b,
                    point: hit.point,
                    time: hit.time,
                    kind: ImpactKind::SegmentBall(hit.feature),
                }),
                (BallKind, SegmentKind) => segment_ball_time_of_impact(
                    segment_track(b, q),
                    ball_track(a, p),
                    frame_time,
                    best,
                    eps,
                )
                .map(|hit| Impact {
                    first: side_b,
                    second: side_a,
                    point: hit.point,
                    time: hit.time,
                    kind: ImpactKind::SegmentBall(hit.feature),
                }),
                (BallKind, BallKind) => ball_ball_time_of_impact(
                    ball_track(a, p),
                    ball_track(b, q),
                    frame_time,
                    best,
                    eps,
                )
                .map(|toi| Impact {
                    first: side_a,
                    second: side_b,
                    point: toi.point,
                    time: toi.time,
                    kind: ImpactKind::BallBall,
                }),
            };

            if let Some(impact) = found {
                best = impact.time;
                first = Some(impact);
                if best == 0.0 {
                    return first;
                }
            }
        }
    }

    first
}

fn move_all<B: Body>(slots: &mut [Slot<B>], order: &[usize], t: f64) {
    for &index in order {
        if let Some(body) = slots[index].body.as_mut() {
            body.move_by(t);
        }
    }
}

/// Impact line of a resolved impact, from the bodies' current geometry
fn impact_line<B: Body>(first: &B, second: &B, impact: &Impact) -> Option<DVec2> {
    let p = impact.first.primitive;
    let q = impact.second.primitive;
    match impact.kind {
        ImpactKind::SegmentSegment => None,
        ImpactKind::BallBall => {
            let a = first.primitive_at(p, 0.0).as_ball()?;
            let b = second.primitive_at(q, 0.0).as_ball()?;
            Some(b.center - a.center)
        }
        ImpactKind::SegmentBall(feature) => {
            let segment = first.primitive_at(p, 0.0).as_segment()?;
            let ball = second.primitive_at(q, 0.0).as_ball()?;
            match feature {
                SegmentFeature::Body => Some(segment.normal()),
                SegmentFeature::Start => Some(ball.center - segment.start),
                SegmentFeature::End => Some(ball.center - segment.end),
            }
        }
    }
}

/// Exchange momentum along the impact line and hand the new velocities back
fn resolve_impact<B: Body>(slots: &mut [Slot<B>], impact: &Impact) {
    if impact.kind == ImpactKind::SegmentSegment {
        return;
    }

    let i = impact.first.body.index();
    let j = impact.second.body.index();
    let (Some(first), Some(second)) = (slots[i].body.as_ref(), slots[j].body.as_ref()) else {
        return;
    };

    let Some(line) = impact_line(first, second, impact) else {
        return;
    };
    let impulse_a = first.impulse_at(impact.first.primitive, impact.point);
    let impulse_b = second.impulse_at(impact.second.primitive, impact.point);

    let Some((va, vb)) = exchange(impulse_a, impulse_b, line) else {
        warn!(
            "Degenerate impact line between {} and {}; velocities unchanged",
            impact.first.body, impact.second.body
        );
        return;
    };

    if let Some(body) = slots[i].body.as_mut() {
        body.apply_velocity(impact.first.primitive, impact.point, va);
    }
    if let Some(body) = slots[j].body.as_mut() {
        body.apply_velocity(impact.second.primitive, impact.point, vb);
    }
}

fn notify_impact<B: Body>(slots: &mut [Slot<B>], impact: &Impact) {
    let i = impact.first.body.index();
    let j = impact.second.body.index();
    if i == j {
        return;
    }
    let (first, second) = pair_mut(slots, i, j);
    if let (Some(a), Some(b)) = (first.body.as_mut(), second.body.as_mut()) {
        a.handle_impact(&*b);
        b.handle_impact(&*a);
    }
}

/// Two distinct elements mutably
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Impulse;
    use crate::sim::group::CollisionGroups;
    use crate::sim::shapes::{Fence, FreeBall, Shape, Table, Wall};
    use crate::sim::PrimitiveKind;
    use proptest::prelude::*;

    fn ball(engine: &Engine<Shape>, handle: BodyHandle) -> &FreeBall {
        engine.body(handle).and_then(Shape::as_ball).unwrap()
    }

    fn head_on_pair(engine: &mut Engine<Shape>, ga: CollisionGroups, gb: CollisionGroups) -> (BodyHandle, BodyHandle) {
        let a = engine.register(
            FreeBall::new(DVec2::new(0.0, 0.0), 1.0, DVec2::new(3.0, 0.0))
                .with_groups(ga)
                .into(),
        );
        let b = engine.register(
            FreeBall::new(DVec2::new(10.0, 0.0), 1.0, DVec2::new(-3.0, 0.0))
                .with_groups(gb)
                .into(),
        );
        (a, b)
    }

    #[test]
    fn test_ball_reflects_off_static_wall() {
        let mut engine = Engine::<Shape>::default();
        engine.register(Wall::new(DVec2::new(0.0, 10.0), DVec2::new(0.0, -10.0)).into());
        let b = engine.register(FreeBall::new(DVec2::new(5.0, 0.0), 1.0, DVec2::new(-5.0, 0.0)).into());

        let report = engine.advance(1.0).unwrap();
        assert_eq!(report.impacts, 1);

        let ball = ball(&engine, b);
        assert!((ball.vel - DVec2::new(5.0, 0.0)).length() < 1e-9);
        assert!((ball.pos.x - 2.0).abs() < 1e-4);

        let impact = engine.last_impact().unwrap();
        assert_eq!(impact.kind, ImpactKind::SegmentBall(SegmentFeature::Body));
        assert!((impact.time - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_tangential_velocity_survives_wall() {
        let mut engine = Engine::<Shape>::default();
        engine.register(Wall::new(DVec2::new(0.0, 100.0), DVec2::new(0.0, -100.0)).into());
        let b = engine.register(FreeBall::new(DVec2::new(5.0, 0.0), 1.0, DVec2::new(-5.0, 3.0)).into());

        engine.advance(1.0).unwrap();
        assert!((ball(&engine, b).vel - DVec2::new(5.0, 3.0)).length() < 1e-9);
    }

    #[test]
    fn test_ball_reflects_off_segment_end() {
        let mut engine = Engine::<Shape>::default();
        engine.register(Wall::new(DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)).into());
        let b = engine.register(FreeBall::new(DVec2::new(15.0, 0.5), 1.0, DVec2::new(-1.0, 0.0)).into());

        let report = engine.advance(6.0).unwrap();
        assert_eq!(report.impacts, 1);
        let impact = engine.last_impact().unwrap();
        assert_eq!(impact.kind, ImpactKind::SegmentBall(SegmentFeature::End));
        assert_eq!(impact.point, DVec2::new(10.0, 0.0));

        // Impact line runs from the corner to the center at 30 degrees
        let expected = DVec2::new(0.5, 0.75_f64.sqrt());
        assert!((ball(&engine, b).vel - expected).length() < 1e-4);
    }

    #[test]
    fn test_ball_reflects_off_segment_start() {
        let mut engine = Engine::<Shape>::default();
        engine.register(Wall::new(DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)).into());
        let b = engine.register(FreeBall::new(DVec2::new(-5.0, 0.5), 1.0, DVec2::new(1.0, 0.0)).into());

        let report = engine.advance(6.0).unwrap();
        assert_eq!(report.impacts, 1);
        let impact = engine.last_impact().unwrap();
        assert_eq!(impact.kind, ImpactKind::SegmentBall(SegmentFeature::Start));
        assert_eq!(impact.point, DVec2::ZERO);

        let expected = DVec2::new(-0.5, 0.75_f64.sqrt());
        assert!((ball(&engine, b).vel - expected).length() < 1e-4);
    }

    #[test]
    fn test_overlapping_balls_moving_apart_are_left_alone() {
        let mut engine = Engine::<Shape>::default();
        let a = engine.register(FreeBall::new(DVec2::new(0.0, 0.0), 1.0, DVec2::new(-1.0, 0.0)).into());
        let b = engine.register(FreeBall::new(DVec2::new(1.5, 0.0), 1.0, DVec2::new(1.0, 0.0)).into());

        let report = engine.advance(0.05).unwrap();
        assert_eq!(report.impacts, 0);
        assert!(!report.saturated);
        assert_eq!(ball(&engine, a).vel, DVec2::new(-1.0, 0.0));
        assert_eq!(ball(&engine, b).vel, DVec2::new(1.0, 0.0));
    }

    #[test]
    fn test_equal_balls_swap_velocities() {
        let mut engine = Engine::<Shape>::default();
        let (a, b) = head_on_pair(&mut engine, CollisionGroups::default(), CollisionGroups::default());

        let report = engine.advance(2.0).unwrap();
        assert_eq!(report.impacts, 1);
        assert!((ball(&engine, a).vel - DVec2::new(-3.0, 0.0)).length() < 1e-6);
        assert!((ball(&engine, b).vel - DVec2::new(3.0, 0.0)).length() < 1e-6);
        assert!((ball(&engine, a).pos.x - 2.0).abs() < 1e-4);
        assert!((ball(&engine, b).pos.x - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_head_on_impact_time_and_point() {
        let mut engine = Engine::<Shape>::default();
        engine.register(FreeBall::new(DVec2::new(0.0, 0.0), 1.0, DVec2::new(1.0, 0.0)).into());
        engine.register(FreeBall::new(DVec2::new(10.0, 0.0), 1.0, DVec2::new(-1.0, 0.0)).into());

        engine.advance(4.5).unwrap();
        let impact = engine.last_impact().unwrap();
        assert_eq!(impact.kind, ImpactKind::BallBall);
        assert!((impact.time - 4.0).abs() < 1e-4);
        assert!((impact.point - DVec2::new(5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_disjoint_groups_never_collide() {
        let mut engine = Engine::<Shape>::default();
        let (a, b) = head_on_pair(&mut engine, CollisionGroups::new([1]), CollisionGroups::new([2]));

        let report = engine.advance(2.0).unwrap();
        assert_eq!(report.impacts, 0);
        assert_eq!(ball(&engine, a).vel, DVec2::new(3.0, 0.0));
        assert_eq!(ball(&engine, b).vel, DVec2::new(-3.0, 0.0));
        assert!(engine.last_impact().is_none());
    }

    #[test]
    fn test_overlapping_groups_collide() {
        let mut engine = Engine::<Shape>::default();
        head_on_pair(&mut engine, CollisionGroups::new([1, 2]), CollisionGroups::new([2, 3]));
        assert_eq!(engine.advance(2.0).unwrap().impacts, 1);
    }

    #[test]
    fn test_zero_time_impact_resolves_without_moving() {
        let mut engine = Engine::<Shape>::default();
        let a = engine.register(FreeBall::new(DVec2::new(0.0, 0.0), 1.0, DVec2::new(1.0, 0.0)).into());
        let b = engine.register(FreeBall::new(DVec2::new(2.0, 0.0), 1.0, DVec2::new(-1.0, 0.0)).into());

        let report = engine.advance(1.0).unwrap();
        assert_eq!(report.impacts, 1);
        assert_eq!(report.zero_time_impacts, 1);
        assert!((report.time_advanced - 1.0).abs() < 1e-12);
        assert!((ball(&engine, a).vel - DVec2::new(-1.0, 0.0)).length() < 1e-9);
        assert!((ball(&engine, b).vel - DVec2::new(1.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_segments_never_collide_with_segments() {
        let mut engine = Engine::<Shape>::default();
        engine.register(Table::new(DVec2::ZERO, DVec2::splat(100.0)).into());
        engine.register(Wall::new(DVec2::new(-10.0, 50.0), DVec2::new(110.0, 50.0)).into());
        engine.register(Fence::new(DVec2::splat(50.0), 80.0, 10.0, 3.0, 0.0).into());

        let report = engine.advance(5.0).unwrap();
        assert_eq!(report.impacts, 0);
    }

    #[test]
    fn test_rotating_fence_pushes_ball() {
        let mut engine = Engine::<Shape>::default();
        engine.register(Fence::new(DVec2::ZERO, 10.0, 2.0, 1.0, 0.0).into());
        let b = engine.register(FreeBall::new(DVec2::new(0.0, 6.0), 0.5, DVec2::ZERO).into());

        let report = engine.advance(std::f64::consts::PI).unwrap();
        assert!(report.impacts >= 1);
        assert!(ball(&engine, b).vel.length() > 0.0);
    }

    #[test]
    fn test_ball_stays_in_table() {
        let mut engine = Engine::<Shape>::default();
        let table = Table::new(DVec2::new(20.0, 20.0), DVec2::new(380.0, 580.0));
        engine.register(table.clone().into());
        let b = engine.register(FreeBall::new(DVec2::new(50.0, 50.0), 10.0, DVec2::new(300.0, 400.0)).into());

        for _ in 0..200 {
            engine.advance(1.0 / 20.0).unwrap();
            let ball = ball(&engine, b);
            assert!(table.contains(ball.pos, ball.radius - 1e-6));
        }
        assert!((ball(&engine, b).vel.length() - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut engine = Engine::<Shape>::default();
        let h = engine.register(FreeBall::new(DVec2::ZERO, 1.0, DVec2::ZERO).into());
        assert_eq!(engine.len(), 1);
        assert!(engine.unregister(h).is_some());
        assert!(engine.unregister(h).is_none());
        assert!(engine.is_empty());

        // Slot reuse leaves the old handle stale
        let h2 = engine.register(FreeBall::new(DVec2::ONE, 1.0, DVec2::ZERO).into());
        assert_eq!(h2.index(), h.index());
        assert!(engine.body(h).is_none());
        assert!(engine.body(h2).is_some());
    }

    #[test]
    fn test_membership_changes_apply_on_next_advance() {
        let mut engine = Engine::<Shape>::default();
        assert!(!engine.is_dirty());
        let (a, b) = head_on_pair(&mut engine, CollisionGroups::default(), CollisionGroups::default());
        assert!(engine.is_dirty());

        engine.unregister(b);
        engine.advance(2.0).unwrap();
        assert!(!engine.is_dirty());
        assert_eq!(ball(&engine, a).vel, DVec2::new(3.0, 0.0));
        assert_eq!(engine.bodies().count(), 1);
    }

    #[test]
    fn test_rejects_bad_frame_time() {
        let mut engine = Engine::<Shape>::default();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                engine.advance(bad),
                Err(EngineError::InvalidFrameTime { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let settings = EngineSettings {
            epsilon: 0.0,
            ..EngineSettings::default()
        };
        assert!(Engine::<Shape>::new(settings).is_err());
    }

    /// Declares a segment but reports a ball
    struct Liar;

    impl Body for Liar {
        fn primitive_count(&self) -> usize {
            1
        }
        fn primitive_kind(&self, _id: usize) -> PrimitiveKind {
            PrimitiveKind::Segment
        }
        fn primitive_at(&self, _id: usize, _t: f64) -> Primitive {
            Primitive::Ball(Ball::new(DVec2::ZERO, 1.0))
        }
        fn impulse_at(&self, _id: usize, _at: Point) -> Impulse {
            Impulse::immovable()
        }
        fn apply_velocity(&mut self, _id: usize, _at: Point, _velocity: DVec2) {}
        fn move_by(&mut self, _t: f64) {}
    }

    #[test]
    fn test_primitive_kind_mismatch_is_fatal() {
        let mut engine: Engine = Engine::default();
        let liar = engine.register(Box::new(Liar));
        let err = engine.advance(0.1).unwrap_err();
        assert_eq!(
            err,
            EngineError::PrimitiveMismatch {
                body: liar,
                primitive: 0,
                declared: PrimitiveKind::Segment,
                reported: PrimitiveKind::Ball,
            }
        );
    }

    #[test]
    fn test_boxed_bodies() {
        let mut engine: Engine = Engine::default();
        engine.register(Box::new(Wall::new(DVec2::new(0.0, 10.0), DVec2::new(0.0, -10.0))));
        engine.register(Box::new(FreeBall::new(DVec2::new(5.0, 0.0), 1.0, DVec2::new(-5.0, 0.0))));
        assert_eq!(engine.advance(1.0).unwrap().impacts, 1);
    }

    #[test]
    fn test_impact_cap_saturates() {
        let settings = EngineSettings {
            max_impacts_per_advance: 1,
            ..EngineSettings::default()
        };
        let mut engine = Engine::<Shape>::new(settings).unwrap();
        engine.register(Table::new(DVec2::ZERO, DVec2::splat(100.0)).into());
        engine.register(FreeBall::new(DVec2::splat(50.0), 1.0, DVec2::new(100.0, 0.0)).into());

        let report = engine.advance(2.0).unwrap();
        assert_eq!(report.impacts, 1);
        assert!(report.saturated);
        assert!((report.time_advanced - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_notify_impacts() {
        let settings = EngineSettings {
            notify_impacts: true,
            ..EngineSettings::default()
        };
        let mut engine = Engine::<Shape>::new(settings).unwrap();
        let (a, b) = head_on_pair(&mut engine, CollisionGroups::default(), CollisionGroups::default());
        engine.advance(2.0).unwrap();
        assert_eq!(ball(&engine, a).impacts, 1);
        assert_eq!(ball(&engine, b).impacts, 1);

        let mut quiet = Engine::<Shape>::default();
        let (a, _) = head_on_pair(&mut quiet, CollisionGroups::default(), CollisionGroups::default());
        quiet.advance(2.0).unwrap();
        assert_eq!(ball(&quiet, a).impacts, 0);
    }

    proptest! {
        #[test]
        fn prop_frame_time_is_conserved(
            x1 in 30.0f64..90.0,
            y1 in 30.0f64..270.0,
            x2 in 110.0f64..170.0,
            y2 in 30.0f64..270.0,
            v1 in prop::array::uniform2(-60.0f64..60.0),
            v2 in prop::array::uniform2(-60.0f64..60.0),
            frame_time in 0.01f64..3.0,
        ) {
            let mut engine = Engine::<Shape>::default();
            let table = Table::new(DVec2::ZERO, DVec2::new(200.0, 300.0));
            engine.register(table.clone().into());
            let a = engine.register(FreeBall::new(DVec2::new(x1, y1), 5.0, DVec2::from_array(v1)).into());
            let b = engine.register(FreeBall::new(DVec2::new(x2, y2), 5.0, DVec2::from_array(v2)).into());

            let report = engine.advance(frame_time).unwrap();
            prop_assert!((report.time_advanced - frame_time).abs() < 1e-9);
            prop_assert!(!report.saturated);
            for handle in [a, b] {
                let ball = ball(&engine, handle);
                prop_assert!(table.contains(ball.pos, ball.radius - 1e-3));
            }
        }

        #[test]
        fn prop_position_query_is_pure(t in 0.0f64..10.0, id in 0usize..4) {
            let fence = Fence::new(DVec2::new(3.0, -2.0), 12.0, 4.0, 0.7, 1.1);
            prop_assert_eq!(fence.primitive_at(id, t), fence.primitive_at(id, t));
            let ball = FreeBall::new(DVec2::ZERO, 1.0, DVec2::new(2.0, 1.0));
            prop_assert_eq!(ball.primitive_at(0, t), ball.primitive_at(0, t));
        }
    }
}

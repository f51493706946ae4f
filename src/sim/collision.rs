//! Impact-time solvers
//!
//! Each solver looks ahead through position functions `t -> geometry`
//! (relative to the bodies' current state) and reports the first time in
//! `[0, frame_time]` the two surfaces touch, but only if that time beats
//! `best`, the earliest impact already found this pass.

use super::distance::{distance_ball_to_ball, distance_segment_to_ball};
use super::geometry::{Ball, Point, Segment};
use super::search::{bisect_first_root, golden_section_min};

/// First contact of two primitives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeOfImpact {
    /// Seconds from the current state
    pub time: f64,
    /// World-space contact point
    pub point: Point,
}

/// Which part of a segment was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentFeature {
    /// Interior of the segment; the impact line is the segment normal
    Body,
    /// The `start` endpoint
    Start,
    /// The `end` endpoint
    End,
}

/// First contact of a segment and a ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    pub time: f64,
    pub point: Point,
    pub feature: SegmentFeature,
}

/// Earliest contact of two moving balls
///
/// The surface distance of two balls is not monotone (they may approach and
/// separate within the frame), so the time of closest approach is located
/// first; only if the balls overlap there is the first root bisected on
/// `[0, closest]`. Balls already overlapping at `t = 0` count only while
/// they are still closing.
pub fn ball_ball_time_of_impact<A, B>(
    a: A,
    b: B,
    frame_time: f64,
    best: f64,
    eps: f64,
) -> Option<TimeOfImpact>
where
    A: Fn(f64) -> Ball,
    B: Fn(f64) -> Ball,
{
    let distance = |t: f64| distance_ball_to_ball(&a(t), &b(t));

    let d0 = distance(0.0);
    if d0 <= 0.0 && distance(eps.min(frame_time)) >= d0 {
        return None;
    }

    let (closest, d_min) = golden_section_min(&distance, 0.0, frame_time, eps);
    if !(d_min <= 0.0) {
        return None;
    }

    let time = bisect_first_root(&distance, 0.0, closest, eps);
    if time >= best {
        return None;
    }

    let ball_a = a(time);
    let ball_b = b(time);
    let point = if ball_a.radius == 0.0 {
        ball_a.center
    } else if ball_b.radius == 0.0 {
        ball_b.center
    } else {
        let ratio = ball_a.radius / (ball_a.radius + ball_b.radius);
        ball_a.center + (ball_b.center - ball_a.center) * ratio
    };

    Some(TimeOfImpact { time, point })
}

/// Earliest contact of a moving segment and a moving ball
///
/// Three candidates are tried in order, each only replacing the previous if
/// strictly earlier: the `start` endpoint (as a zero-radius ball), the
/// segment interior, then the `end` endpoint.
pub fn segment_ball_time_of_impact<S, B>(
    segment: S,
    ball: B,
    frame_time: f64,
    best: f64,
    eps: f64,
) -> Option<SegmentHit>
where
    S: Fn(f64) -> Segment,
    B: Fn(f64) -> Ball,
{
    let mut best = best;
    let mut hit = None;

    let start = |t: f64| Ball::point(segment(t).start);
    if let Some(toi) = ball_ball_time_of_impact(start, &ball, frame_time, best, eps) {
        best = toi.time;
        hit = Some(SegmentHit {
            time: toi.time,
            point: toi.point,
            feature: SegmentFeature::Start,
        });
    }

    if let Some(body_hit) = segment_body_time_of_impact(&segment, &ball, frame_time, best, eps) {
        best = body_hit.time;
        hit = Some(body_hit);
    }

    let end = |t: f64| Ball::point(segment(t).end);
    if let Some(toi) = ball_ball_time_of_impact(end, &ball, frame_time, best, eps) {
        hit = Some(SegmentHit {
            time: toi.time,
            point: toi.point,
            feature: SegmentFeature::End,
        });
    }

    hit
}

/// Segment x segment contact is not detected: always `None`
pub fn segment_segment_time_of_impact<S1, S2>(
    _a: S1,
    _b: S2,
    _frame_time: f64,
    _best: f64,
    _eps: f64,
) -> Option<TimeOfImpact>
where
    S1: Fn(f64) -> Segment,
    S2: Fn(f64) -> Segment,
{
    None
}

/// Contact against the segment interior only
///
/// A ball already touching the line (or on its negative side) at `t = 0` is
/// never reported; only new crossings count.
fn segment_body_time_of_impact<S, B>(
    segment: &S,
    ball: &B,
    frame_time: f64,
    best: f64,
    eps: f64,
) -> Option<SegmentHit>
where
    S: Fn(f64) -> Segment,
    B: Fn(f64) -> Ball,
{
    let distance = |t: f64| distance_segment_to_ball(&segment(t), &ball(t));

    if !(distance(0.0) > 0.0) {
        return None;
    }

    let mut upper = frame_time;
    if distance(upper) > 0.0 {
        // Still apart at the frame end; the ball may have dipped through the
        // line and come back (rotating segments), so look for the minimum.
        let (closest, d_min) = golden_section_min(&distance, 0.0, frame_time, eps);
        if !(d_min <= 0.0) {
            return None;
        }
        upper = closest;
    }

    let time = bisect_first_root(&distance, 0.0, upper, eps);
    if time >= best {
        return None;
    }

    let seg = segment(time);
    let along = seg.project(ball(time).center)?;
    if !(0.0..=seg.length()).contains(&along) {
        // Past an end: the endpoint candidates own corner contacts.
        return None;
    }

    Some(SegmentHit {
        time,
        point: seg.point_at(along),
        feature: SegmentFeature::Body,
    })
}

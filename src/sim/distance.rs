//! Signed distance functions
//!
//! The root functions of every impact search: zero at first contact,
//! positive while apart.

use super::geometry::{Ball, Point, Segment};

/// Signed distance from `p` to the infinite line through `line`
///
/// Positive when `p` is left of the directed segment. A zero-length segment
/// falls back to the (unsigned) distance from its endpoint.
#[inline]
pub fn distance_point_to_line(line: &Segment, p: Point) -> f64 {
    let d = line.direction();
    let rel = p - line.start;
    let len = d.length();
    if len > 0.0 {
        d.perp_dot(rel) / len
    } else {
        rel.length()
    }
}

/// Signed distance from a ball's surface to the segment's line
#[inline]
pub fn distance_segment_to_ball(segment: &Segment, ball: &Ball) -> f64 {
    distance_point_to_line(segment, ball.center) - ball.radius
}

/// Distance between two ball surfaces (negative when overlapping)
#[inline]
pub fn distance_ball_to_ball(a: &Ball, b: &Ball) -> f64 {
    a.center.distance(b.center) - (a.radius + b.radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn test_point_line_sign() {
        let seg = Segment::new(DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0));
        assert!((distance_point_to_line(&seg, DVec2::new(5.0, 1.0)) - 1.0).abs() < 1e-12);
        assert!((distance_point_to_line(&seg, DVec2::new(5.0, -1.0)) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_reversed_segment_flips_sign() {
        let seg = Segment::new(DVec2::new(10.0, 0.0), DVec2::new(0.0, 0.0));
        assert!(distance_point_to_line(&seg, DVec2::new(5.0, 1.0)) < 0.0);
    }

    #[test]
    fn test_line_is_infinite() {
        let seg = Segment::new(DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0));
        assert!((distance_point_to_line(&seg, DVec2::new(50.0, 2.0)) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_segment() {
        let seg = Segment::new(DVec2::new(1.0, 1.0), DVec2::new(1.0, 1.0));
        let d = distance_point_to_line(&seg, DVec2::new(4.0, 5.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_segment_to_ball() {
        let seg = Segment::new(DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0));
        let ball = Ball::new(DVec2::new(3.0, 4.0), 1.5);
        assert!((distance_segment_to_ball(&seg, &ball) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_ball_to_ball() {
        let a = Ball::new(DVec2::new(0.0, 0.0), 1.0);
        let b = Ball::new(DVec2::new(3.0, 4.0), 2.0);
        assert!((distance_ball_to_ball(&a, &b) - 2.0).abs() < 1e-12);

        let c = Ball::new(DVec2::new(1.0, 0.0), 1.0);
        assert!(distance_ball_to_ball(&a, &c) < 0.0);
    }
}

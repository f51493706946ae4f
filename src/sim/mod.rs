//! Collision simulation module
//!
//! Everything that decides when bodies touch and how their velocities change:
//! - Geometry records are plain `Copy` values, no shared scratch memory
//! - Searches are continuous in time (golden-section + bisection)
//! - Bodies are brute-force paired, in stable registration order

pub mod body;
pub mod collision;
pub mod distance;
pub mod engine;
pub mod geometry;
pub mod group;
pub mod resolve;
pub mod search;
pub mod shapes;

pub use body::{Body, Primitive, PrimitiveKind};
pub use collision::{
    SegmentFeature, SegmentHit, TimeOfImpact, ball_ball_time_of_impact,
    segment_ball_time_of_impact, segment_segment_time_of_impact,
};
pub use distance::{distance_ball_to_ball, distance_point_to_line, distance_segment_to_ball};
pub use engine::{BodyHandle, Engine, FrameReport, Impact, ImpactKind};
pub use geometry::{Ball, Impulse, Mass, Point, Rotation, Segment};
pub use group::CollisionGroups;
pub use resolve::{exchange, resolve_along_axis};
pub use shapes::{Fence, FreeBall, Shape, Table, Wall};

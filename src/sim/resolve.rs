//! Impulse resolution
//!
//! Velocities are rotated so the impact line is the x-axis, the x components
//! are exchanged as a 1-D elastic collision, and the result is rotated back.
//! The tangential (y) component never changes: there is no friction.

use glam::DVec2;

use super::geometry::{Impulse, Mass, Rotation};

/// 1-D elastic collision of velocities `u1`, `u2` along the impact line
///
/// Returns the new `(v1, v2)`. An immovable side keeps its velocity and the
/// other side is reflected in its frame.
pub fn resolve_along_axis(u1: f64, m1: Mass, u2: f64, m2: Mass) -> (f64, f64) {
    match (m1, m2) {
        (Mass::Immovable, Mass::Immovable) => (u1, u2),
        (Mass::Immovable, Mass::Movable(_)) => (u1, 2.0 * u1 - u2),
        (Mass::Movable(_), Mass::Immovable) => (2.0 * u2 - u1, u2),
        (Mass::Movable(m1), Mass::Movable(m2)) => {
            debug_assert!(
                m1 > 0.0 && m2 > 0.0 && m1.is_finite() && m2.is_finite(),
                "movable masses must be finite and positive (got {m1}, {m2})"
            );
            let total = m1 + m2;
            let v1 = ((m1 - m2) * u1 + 2.0 * m2 * u2) / total;
            let v2 = ((m2 - m1) * u2 + 2.0 * m1 * u1) / total;
            (v1, v2)
        }
    }
}

/// Exchange momentum between two impulses along `impact_line`
///
/// Returns the new world-space velocities, or `None` if the impact line is
/// degenerate (zero length).
pub fn exchange(a: Impulse, b: Impulse, impact_line: DVec2) -> Option<(DVec2, DVec2)> {
    let to_local = Rotation::aligning(impact_line)?;
    let local_a = a.rotated(&to_local);
    let local_b = b.rotated(&to_local);

    let (va, vb) = resolve_along_axis(
        local_a.velocity.x,
        local_a.mass,
        local_b.velocity.x,
        local_b.mass,
    );

    let to_world = to_local.inverse();
    let new_a = to_world.apply(DVec2::new(va, local_a.velocity.y));
    let new_b = to_world.apply(DVec2::new(vb, local_b.velocity.y));
    Some((new_a, new_b))
}

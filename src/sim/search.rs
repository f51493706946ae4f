//! One-dimensional time searches
//!
//! Both searches stop once the bracket is narrower than `eps`, so they
//! terminate for any finite interval.

use crate::consts::GOLDEN_RATIO;

/// Hard stop for brackets that cannot shrink below `eps` at f64 precision
const MAX_STEPS: usize = 256;

/// Locate the minimum of `f` on `[lo, hi]` by golden-section search
///
/// Returns `(t, f(t))`. Assumes `f` is unimodal on the bracket; otherwise a
/// local minimum is returned.
pub fn golden_section_min<F>(f: F, lo: f64, hi: f64, eps: f64) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let mut t1 = lo;
    let mut t2 = hi;
    let mut t11 = t2 - (t2 - t1) / GOLDEN_RATIO;
    let mut t22 = t1 + (t2 - t1) / GOLDEN_RATIO;
    let mut d11 = f(t11);
    let mut d22 = f(t22);

    for _ in 0..MAX_STEPS {
        if t2 - t1 < eps {
            break;
        }
        if d11 >= d22 {
            t1 = t11;
            t11 = t22;
            d11 = d22;
            t22 = t1 + (t2 - t1) / GOLDEN_RATIO;
            d22 = f(t22);
        } else {
            t2 = t22;
            t22 = t11;
            d22 = d11;
            t11 = t2 - (t2 - t1) / GOLDEN_RATIO;
            d11 = f(t11);
        }
    }

    let t = (t1 + t2) / 2.0;
    (t, f(t))
}

/// Bisect toward the first sign change of `f` on `[lo, hi]`
///
/// Expects `f(lo) > 0` and `f(hi) <= 0`. Returns the lower bracket end, which
/// is always on the positive side (or `lo` itself).
pub fn bisect_first_root<F>(f: F, lo: f64, hi: f64, eps: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    let mut t1 = lo;
    let mut t2 = hi;
    while t2 - t1 >= eps {
        let mid = t1 + (t2 - t1) / 2.0;
        if mid <= t1 || mid >= t2 {
            break;
        }
        if f(mid) > 0.0 {
            t1 = mid;
        } else {
            t2 = mid;
        }
    }
    t1
}

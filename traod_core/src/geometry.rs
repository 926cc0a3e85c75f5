//! Planar geometric primitives shared by the partitioner and the distance
//! metric. Pure functions, no state.

use crate::types::Point;

/// Euclidean distance between two points.
pub fn length(a: Point, b: Point) -> f64 {
    (b.coords() - a.coords()).norm()
}

/// Parameter `t` of the orthogonal projection of `p` onto the infinite line
/// through `a` and `b`, via the dot-product parametrization
/// `t = ((p − a)·d) / (d·d)` with `d = b − a`.
///
/// For a degenerate line (`a == b`) the parametrization is undefined; the
/// projection collapses to `a` (`t = 0`) instead of dividing by zero.
pub fn projection_parameter(p: Point, a: Point, b: Point) -> f64 {
    let d = b.coords() - a.coords();
    let dd = d.dot(&d);
    if dd == 0.0 {
        return 0.0;
    }
    (p.coords() - a.coords()).dot(&d) / dd
}

/// Orthogonal projection of `p` onto the infinite line through `a` and `b`.
pub fn project(p: Point, a: Point, b: Point) -> Point {
    let t = projection_parameter(p, a, b);
    let q = a.coords() + (b.coords() - a.coords()) * t;
    Point::new(q.x, q.y)
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
/// Callers must not pass a degenerate line (`a == b`).
pub fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let d = b.coords() - a.coords();
    let r = p.coords() - a.coords();
    (d.x * r.y - d.y * r.x).abs() / d.norm()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
